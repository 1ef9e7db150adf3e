//! The form controller: field registration, validation orchestration,
//! validity aggregation and external-error reconciliation.

use std::sync::{Arc, RwLock};

use log::debug;

use crate::error::FormError;
use crate::field::Field;
use crate::model;
use crate::validation::run_rules;
use crate::value::{ErrorMap, Value, ValueMap};

type Callback = Box<dyn Fn() + Send + Sync>;
type ChangeCallback = Box<dyn Fn(&Value, bool) + Send + Sync>;
type SubmitCallback = Box<dyn Fn(&Value, &Form) + Send + Sync>;
type MappingFn = Box<dyn Fn(&ValueMap) -> Value + Send + Sync>;

/// Notification handlers, fixed at build time.
#[derive(Default)]
struct Handlers {
    on_valid: Option<Callback>,
    on_invalid: Option<Callback>,
    on_change: Option<ChangeCallback>,
    on_submit: Option<SubmitCallback>,
    on_valid_submit: Option<SubmitCallback>,
    on_invalid_submit: Option<SubmitCallback>,
    on_reset: Option<Callback>,
}

/// Form-level state flags.
struct FormFlags {
    /// AND-aggregate over field validity, starts true.
    is_valid: bool,
    /// One-way latch enabling change notifications; set by the first
    /// completed revalidation pass and never cleared.
    can_notify_change: bool,
    /// Whether submit has been called.
    form_submitted: bool,
    /// Whether the form is disabled.
    disabled: bool,
}

/// Shared form state behind the cloneable handle.
struct FormInner {
    /// Attached fields, in attachment order.
    fields: RwLock<Vec<Field>>,
    flags: RwLock<FormFlags>,
    /// Controlled external errors, consulted on every validation.
    injected_errors: RwLock<ErrorMap>,
    handlers: Handlers,
    /// Caller-supplied model mapping; dotted-name expansion otherwise.
    mapping: Option<MappingFn>,
    /// When set, external errors leave per-field validity untouched.
    prevent_external_invalidation: bool,
}

/// Result of running one field's rules.
struct Validation {
    is_valid: bool,
    is_required: bool,
    errors: Vec<String>,
}

/// A form controller tracking a dynamic set of [`Field`]s.
///
/// The form owns the computed side of every attached field: it runs the
/// field's rules against the current value and the sibling-value snapshot,
/// aggregates per-field validity into form validity, and reconciles
/// externally supplied errors with locally computed ones. `Form` is a
/// cheap-to-clone handle; submit handlers receive it back as the capability
/// for server-error injection and resets.
///
/// # Example
///
/// ```ignore
/// let form = Form::builder()
///     .on_valid(|| println!("ready"))
///     .on_valid_submit(|model, _form| send(model))
///     .build();
///
/// form.attach(&field)?;
/// field.set_value("hello".into());
/// form.validate(&field)?;
/// ```
#[derive(Clone)]
pub struct Form {
    inner: Arc<FormInner>,
}

impl Form {
    /// Start building a form.
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    // -------------------------------------------------------------------------
    // Field registration
    // -------------------------------------------------------------------------

    /// Attach a field to the form.
    ///
    /// Attaching is idempotent per field identity. The field is validated
    /// immediately, followed by a full-form revalidation pass, so a newly
    /// mounted field participates in form validity right away.
    pub fn attach(&self, field: &Field) -> Result<(), FormError> {
        if field.name().is_empty() {
            return Err(FormError::MissingName);
        }
        if let Ok(mut fields) = self.inner.fields.write() {
            if !fields.iter().any(|f| f.id() == field.id()) {
                debug!("attaching field {} ({})", field.id(), field.name());
                fields.push(field.clone());
            }
        }
        self.validate(field)
    }

    /// Detach a field from the form. No-op if the field is not attached.
    ///
    /// Removing a field can change the validity aggregate, so the whole
    /// form is revalidated.
    pub fn detach(&self, field: &Field) -> Result<(), FormError> {
        if let Ok(mut fields) = self.inner.fields.write() {
            fields.retain(|f| f.id() != field.id());
        }
        debug!("detached field {} ({})", field.id(), field.name());
        self.validate_form()
    }

    /// Get handles to the attached fields, in attachment order.
    pub fn fields(&self) -> Vec<Field> {
        self.fields_snapshot()
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Validate one field after a value change, then revalidate the form.
    ///
    /// Cross-field rules may depend on the changed value, so every other
    /// attached field is re-run as well. Fires the change notification
    /// first, once the initial revalidation pass has latched it open.
    pub fn validate(&self, field: &Field) -> Result<(), FormError> {
        let can_notify = self
            .inner
            .flags
            .read()
            .map(|flags| flags.can_notify_change)
            .unwrap_or(false);
        if can_notify {
            if let Some(on_change) = &self.inner.handlers.on_change {
                on_change(&self.get_model(), self.is_changed());
            }
        }

        let validation = self.run_validation(field, None)?;
        // A direct validation clears any external error overlay; the full
        // pass below re-applies it where it is still sticky.
        field.commit_validation(
            validation.is_valid,
            validation.is_required,
            validation.errors,
            None,
        );
        self.validate_form()
    }

    /// Dry-run a candidate value against a field's rules.
    ///
    /// Nothing is committed: neither the field's value nor its computed
    /// validity changes.
    pub fn is_valid_value(&self, field: &Field, value: &Value) -> Result<bool, FormError> {
        self.run_validation(field, Some(value))
            .map(|validation| validation.is_valid)
    }

    /// Run one field's rule sets against a value and resolve the outcome.
    fn run_validation(
        &self,
        field: &Field,
        candidate: Option<&Value>,
    ) -> Result<Validation, FormError> {
        let siblings = model::current_values(&self.fields_snapshot());
        let value = match candidate {
            Some(value) => value.clone(),
            None => field.value(),
        };
        let (rules, required_rules) = field.rule_sets();

        let general = run_rules(&value, &siblings, &rules)?;
        let required = run_rules(&value, &siblings, &required_rules)?;

        // A required rule's success means the required constraint is unmet.
        let is_required = !required_rules.is_empty() && !required.passed.is_empty();

        let name = field.name();
        let injected = self
            .inner
            .injected_errors
            .read()
            .map(|errors| errors.get(&name).cloned())
            .unwrap_or_default();

        let baseline_valid = general.failed.is_empty() && injected.is_none();
        // Required-ness overrides validity rather than joining the general
        // rules; the message resolution below depends on that split.
        let is_valid = if is_required { false } else { baseline_valid };

        let errors = if is_valid && !is_required {
            Vec::new()
        } else if !general.messages.is_empty() {
            general.messages.clone()
        } else if let Some(injected) = injected {
            injected.to_vec()
        } else if is_required {
            let (fallback, by_rule) = field.message_overrides();
            required
                .passed
                .first()
                .and_then(|rule| by_rule.get(rule).cloned())
                .or(fallback)
                .map(|message| vec![message])
                .unwrap_or_default()
        } else if !general.failed.is_empty() {
            let (fallback, by_rule) = field.message_overrides();
            let mut messages: Vec<String> = Vec::new();
            for rule in &general.failed {
                if let Some(message) = by_rule.get(rule).cloned().or_else(|| fallback.clone()) {
                    if !messages.contains(&message) {
                        messages.push(message);
                    }
                }
            }
            messages
        } else {
            Vec::new()
        };

        Ok(Validation {
            is_valid,
            is_required,
            errors,
        })
    }

    /// Revalidate every attached field and re-aggregate form validity.
    ///
    /// The field list is snapshotted at pass start; fields attached mid-pass
    /// are recomputed only in the next pass. A pending-count barrier makes
    /// the final field update trigger the aggregation and the valid/invalid
    /// notification exactly once.
    fn validate_form(&self) -> Result<(), FormError> {
        let snapshot = self.fields_snapshot();
        if snapshot.is_empty() {
            // Trivially valid; open the change-notification latch so fields
            // added later notify normally.
            if let Ok(mut flags) = self.inner.flags.write() {
                flags.can_notify_change = true;
            }
            return Ok(());
        }

        let mut pending = snapshot.len();
        for field in &snapshot {
            let mut validation = self.run_validation(field, None)?;
            let previous_external = field.external_error();
            // External errors are sticky: they keep forcing the field
            // invalid until a value change clears them.
            if validation.is_valid && previous_external.is_some() {
                validation.is_valid = false;
            }
            let external = if validation.is_valid {
                None
            } else {
                previous_external
            };
            field.commit_validation(
                validation.is_valid,
                validation.is_required,
                validation.errors,
                external,
            );

            pending -= 1;
            if pending == 0 {
                let all_valid = self.fields_snapshot().iter().all(Field::is_valid);
                self.set_form_valid_state(all_valid);
                if let Ok(mut flags) = self.inner.flags.write() {
                    flags.can_notify_change = true;
                }
                debug!("revalidation pass complete, form valid: {all_valid}");
            }
        }
        Ok(())
    }

    /// Store the aggregate and fire the matching notification.
    fn set_form_valid_state(&self, all_valid: bool) {
        if let Ok(mut flags) = self.inner.flags.write() {
            flags.is_valid = all_valid;
        }
        let handler = if all_valid {
            &self.inner.handlers.on_valid
        } else {
            &self.inner.handlers.on_invalid
        };
        if let Some(handler) = handler {
            handler();
        }
    }

    // -------------------------------------------------------------------------
    // External errors
    // -------------------------------------------------------------------------

    /// Apply a controlled external-errors map.
    ///
    /// The map is kept and consulted by every subsequent validation. When it
    /// is non-empty, every attached field is overlaid immediately: named
    /// fields become invalid with the mapped messages, unnamed fields are
    /// marked valid with no overlay. A previously valid form flips invalid
    /// right away unless the form was built with
    /// [`prevent_external_invalidation`](FormBuilder::prevent_external_invalidation).
    ///
    /// A new map ends the stickiness of overlays it no longer names; in
    /// particular an empty map lifts every overlay and revalidates the form,
    /// restoring rule-driven validity.
    pub fn set_injected_errors(&self, errors: ErrorMap) -> Result<(), FormError> {
        if let Ok(mut injected) = self.inner.injected_errors.write() {
            *injected = errors.clone();
        }
        if errors.is_empty() {
            debug!("injected errors cleared");
            for field in self.fields_snapshot() {
                field.clear_external_error();
            }
            return self.validate_form();
        }
        debug!("overlaying injected errors for {} name(s)", errors.len());

        for field in self.fields_snapshot() {
            match errors.get(&field.name()) {
                Some(messages) => field.set_external_state(false, Some(messages.to_vec())),
                None => field.set_external_state(true, None),
            }
        }

        let was_valid = self
            .inner
            .flags
            .read()
            .map(|flags| flags.is_valid)
            .unwrap_or(false);
        if !self.inner.prevent_external_invalidation && was_valid {
            self.set_form_valid_state(false);
        }
        Ok(())
    }

    /// Apply server-side errors from a submission callback.
    ///
    /// Every name in the map must match an attached field; otherwise the
    /// call fails with [`FormError::MissingField`] and no field is mutated.
    /// With `invalidate` set, a currently valid form flips invalid.
    pub fn apply_server_errors(&self, errors: &ErrorMap, invalidate: bool) -> Result<(), FormError> {
        let snapshot = self.fields_snapshot();

        // Resolve every name before mutating anything.
        let mut targets = Vec::with_capacity(errors.len());
        for (name, messages) in errors {
            let field = snapshot
                .iter()
                .find(|field| field.name() == *name)
                .ok_or_else(|| FormError::MissingField {
                    name: name.clone(),
                    errors: errors.clone(),
                })?;
            targets.push((field.clone(), messages.to_vec()));
        }

        for (field, messages) in targets {
            field.set_external_state(self.inner.prevent_external_invalidation, Some(messages));
        }
        debug!("applied server errors for {} name(s)", errors.len());

        let was_valid = self
            .inner
            .flags
            .read()
            .map(|flags| flags.is_valid)
            .unwrap_or(false);
        if invalidate && was_valid {
            self.set_form_valid_state(false);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Submission and reset
    // -------------------------------------------------------------------------

    /// Submit the form.
    ///
    /// Marks the form and every field as submitted (and dirty, so
    /// pristine-gated error display becomes visible), then fires
    /// `on_submit` followed by exactly one of `on_valid_submit` or
    /// `on_invalid_submit`, routed on the validity snapshot taken before
    /// `on_submit` ran.
    pub fn submit(&self) {
        self.set_form_pristine(false);
        let model = self.get_model();
        let was_valid = self
            .inner
            .flags
            .read()
            .map(|flags| flags.is_valid)
            .unwrap_or(false);

        if let Some(on_submit) = &self.inner.handlers.on_submit {
            on_submit(&model, self);
        }
        let handler = if was_valid {
            &self.inner.handlers.on_valid_submit
        } else {
            &self.inner.handlers.on_invalid_submit
        };
        if let Some(handler) = handler {
            handler(&model, self);
        }
    }

    /// Reset every field to its pristine value, or to `data[name]` where
    /// present, then revalidate the form and fire `on_reset`.
    ///
    /// An override value leaves its field dirty, exactly as if the host had
    /// set the value itself.
    pub fn reset(&self, data: Option<&ValueMap>) -> Result<(), FormError> {
        self.set_form_pristine(true);
        for field in self.fields_snapshot() {
            match data.and_then(|data| data.get(&field.name())) {
                Some(value) => field.set_value(value.clone()),
                None => field.reset_value(),
            }
        }
        self.validate_form()?;
        if let Some(on_reset) = &self.inner.handlers.on_reset {
            on_reset();
        }
        Ok(())
    }

    /// Mark the form and all fields as pristine or dirty.
    fn set_form_pristine(&self, is_pristine: bool) {
        if let Ok(mut flags) = self.inner.flags.write() {
            flags.form_submitted = !is_pristine;
        }
        for field in self.fields_snapshot() {
            field.set_pristine_state(is_pristine, !is_pristine);
        }
    }

    // -------------------------------------------------------------------------
    // Model and change detection
    // -------------------------------------------------------------------------

    /// Snapshot of each field's current value, keyed by name.
    pub fn get_current_values(&self) -> ValueMap {
        model::current_values(&self.fields_snapshot())
    }

    /// Snapshot of each field's pristine value, keyed by name.
    pub fn get_pristine_values(&self) -> ValueMap {
        model::pristine_values(&self.fields_snapshot())
    }

    /// Build the form model from the current values.
    ///
    /// Applies the caller-supplied mapping function if one was configured,
    /// otherwise expands dotted names into a nested object.
    pub fn get_model(&self) -> Value {
        let fields = self.fields_snapshot();
        match &self.inner.mapping {
            Some(mapping) => mapping(&model::current_values(&fields)),
            None => model::expand_dotted(&model::ordered_values(&fields)),
        }
    }

    /// Check whether any field's value diverges from its pristine value.
    pub fn is_changed(&self) -> bool {
        model::is_changed(&self.fields_snapshot())
    }

    // -------------------------------------------------------------------------
    // State accessors
    // -------------------------------------------------------------------------

    /// Check the form-level validity aggregate.
    pub fn is_form_valid(&self) -> bool {
        self.inner
            .flags
            .read()
            .map(|flags| flags.is_valid)
            .unwrap_or(false)
    }

    /// Check whether the form is disabled.
    pub fn is_form_disabled(&self) -> bool {
        self.inner
            .flags
            .read()
            .map(|flags| flags.disabled)
            .unwrap_or(false)
    }

    /// Enable or disable the form.
    pub fn set_disabled(&self, disabled: bool) {
        if let Ok(mut flags) = self.inner.flags.write() {
            flags.disabled = disabled;
        }
    }

    /// Check whether submit has been called.
    pub fn is_form_submitted(&self) -> bool {
        self.inner
            .flags
            .read()
            .map(|flags| flags.form_submitted)
            .unwrap_or(false)
    }

    /// Check whether every attached field is pristine.
    pub fn is_pristine(&self) -> bool {
        self.fields_snapshot().iter().all(Field::is_pristine)
    }

    /// Check whether the change-notification latch is open.
    pub fn can_notify_change(&self) -> bool {
        self.inner
            .flags
            .read()
            .map(|flags| flags.can_notify_change)
            .unwrap_or(false)
    }

    fn fields_snapshot(&self) -> Vec<Field> {
        self.inner
            .fields
            .read()
            .map(|fields| fields.clone())
            .unwrap_or_default()
    }
}

/// Builder for [`Form`] handles.
#[derive(Default)]
pub struct FormBuilder {
    handlers: Handlers,
    mapping: Option<MappingFn>,
    disabled: bool,
    prevent_external_invalidation: bool,
}

impl FormBuilder {
    /// Notify when a revalidation pass leaves the form valid.
    pub fn on_valid<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_valid = Some(Box::new(handler));
        self
    }

    /// Notify when a revalidation pass leaves the form invalid.
    pub fn on_invalid<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_invalid = Some(Box::new(handler));
        self
    }

    /// Notify on every value change once the form has settled, with the
    /// current model and whether it diverges from the pristine values.
    pub fn on_change<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, bool) + Send + Sync + 'static,
    {
        self.handlers.on_change = Some(Box::new(handler));
        self
    }

    /// Handle every submit, before the valid/invalid routing.
    pub fn on_submit<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &Form) + Send + Sync + 'static,
    {
        self.handlers.on_submit = Some(Box::new(handler));
        self
    }

    /// Handle submits of a valid form.
    pub fn on_valid_submit<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &Form) + Send + Sync + 'static,
    {
        self.handlers.on_valid_submit = Some(Box::new(handler));
        self
    }

    /// Handle submits of an invalid form.
    pub fn on_invalid_submit<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &Form) + Send + Sync + 'static,
    {
        self.handlers.on_invalid_submit = Some(Box::new(handler));
        self
    }

    /// Notify after a reset has completed.
    pub fn on_reset<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.on_reset = Some(Box::new(handler));
        self
    }

    /// Replace the dotted-name model expansion with a custom mapping.
    pub fn mapping<F>(mut self, mapping: F) -> Self
    where
        F: Fn(&ValueMap) -> Value + Send + Sync + 'static,
    {
        self.mapping = Some(Box::new(mapping));
        self
    }

    /// Start the form disabled.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Keep per-field validity untouched when external errors arrive.
    ///
    /// Form-level invalidation driven by `apply_server_errors` with
    /// `invalidate` set still applies.
    pub fn prevent_external_invalidation(mut self, prevent: bool) -> Self {
        self.prevent_external_invalidation = prevent;
        self
    }

    /// Build the form handle.
    pub fn build(self) -> Form {
        Form {
            inner: Arc::new(FormInner {
                fields: RwLock::new(Vec::new()),
                flags: RwLock::new(FormFlags {
                    is_valid: true,
                    can_notify_change: false,
                    form_submitted: false,
                    disabled: self.disabled,
                }),
                injected_errors: RwLock::new(ErrorMap::new()),
                handlers: self.handlers,
                mapping: self.mapping,
                prevent_external_invalidation: self.prevent_external_invalidation,
            }),
        }
    }
}
