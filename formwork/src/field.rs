//! Field records: the engine's view of one registered input.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::validation::RuleSet;
use crate::value::Value;

/// Unique identifier for a field instance.
///
/// Identity is distinct from `name`: the form sequence dedups and detaches
/// by id, while value snapshots and external error maps key by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

impl FieldId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__field_{}", self.0)
    }
}

/// Internal state for a field.
#[derive(Debug, Default)]
struct FieldInner {
    /// Name used for value snapshots and error maps.
    name: String,
    /// Current value.
    value: Value,
    /// Value at attach time / last reset.
    pristine_value: Value,
    /// General validation rules.
    rules: RuleSet,
    /// Required-ness rules; their success means the constraint is unmet.
    required_rules: RuleSet,
    /// Fallback error message for failed rules.
    error_message: Option<String>,
    /// Per-rule error message overrides.
    error_messages_by_rule: HashMap<String, String>,
    /// Computed validity (owned by the form).
    is_valid: bool,
    /// Computed required-ness (owned by the form).
    is_required: bool,
    /// Computed error messages (owned by the form).
    validation_errors: Vec<String>,
    /// Externally supplied errors, sticky until a value change clears them.
    external_error: Option<Vec<String>>,
    /// Whether the value still equals the pristine value.
    is_pristine: bool,
    /// Whether the owning form has been submitted.
    form_submitted: bool,
}

/// A field registered (or about to be registered) on a [`Form`].
///
/// `Field` is a cheap-to-clone handle around shared state. The host UI layer
/// owns the value side (`set_value`, `reset_value`); the form owns the
/// computed side (validity, required-ness, error messages) and overwrites it
/// on every validation pass.
///
/// # Example
///
/// ```ignore
/// let email = Field::builder("email")
///     .validations("isEmail".parse()?)
///     .required()
///     .error_message("a valid email address is required")
///     .build();
/// form.attach(&email)?;
/// ```
///
/// [`Form`]: crate::form::Form
#[derive(Debug, Clone)]
pub struct Field {
    /// Unique identifier for this field instance.
    id: FieldId,
    /// Internal state.
    inner: Arc<RwLock<FieldInner>>,
}

impl Field {
    /// Start building a field with the given name.
    pub fn builder(name: impl Into<String>) -> FieldBuilder {
        FieldBuilder {
            name: name.into(),
            value: Value::Null,
            rules: RuleSet::new(),
            required_rules: RuleSet::new(),
            error_message: None,
            error_messages_by_rule: HashMap::new(),
        }
    }

    /// Get the unique ID for this field.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Get the field name.
    pub fn name(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.name.clone())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Value side (host UI layer)
    // -------------------------------------------------------------------------

    /// Get the current value.
    pub fn value(&self) -> Value {
        self.inner
            .read()
            .map(|guard| guard.value.clone())
            .unwrap_or_default()
    }

    /// Get the value the field had at attach time or last reset.
    pub fn pristine_value(&self) -> Value {
        self.inner
            .read()
            .map(|guard| guard.pristine_value.clone())
            .unwrap_or_default()
    }

    /// Check whether the field holds a usable value.
    pub fn has_value(&self) -> bool {
        self.inner
            .read()
            .map(|guard| !guard.value.is_null() && !guard.value.is_empty_string())
            .unwrap_or(false)
    }

    /// Set a new value and mark the field dirty.
    ///
    /// The host is expected to follow up with [`Form::validate`] so the
    /// new value takes effect on validity.
    ///
    /// [`Form::validate`]: crate::form::Form::validate
    pub fn set_value(&self, value: Value) {
        if let Ok(mut guard) = self.inner.write() {
            guard.value = value;
            guard.is_pristine = false;
        }
    }

    /// Restore the pristine value and mark the field pristine again.
    pub fn reset_value(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.value = guard.pristine_value.clone();
            guard.is_pristine = true;
        }
    }

    /// Replace the field's rule sets.
    pub fn set_validations(&self, rules: RuleSet, required_rules: RuleSet) {
        if let Ok(mut guard) = self.inner.write() {
            guard.rules = rules;
            guard.required_rules = required_rules;
        }
    }

    // -------------------------------------------------------------------------
    // Computed side
    // -------------------------------------------------------------------------

    /// Check whether the field passed its last validation.
    pub fn is_valid(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_valid)
            .unwrap_or(false)
    }

    /// Check whether a required constraint is currently unmet.
    pub fn is_required(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_required)
            .unwrap_or(false)
    }

    /// Check whether the value still equals the pristine value.
    pub fn is_pristine(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_pristine)
            .unwrap_or(true)
    }

    /// Check whether the owning form has been submitted.
    pub fn is_form_submitted(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.form_submitted)
            .unwrap_or(false)
    }

    /// Get the first error message, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error_messages().into_iter().next()
    }

    /// Get the error messages for this field.
    ///
    /// An external error overlay wins over locally computed messages. A
    /// field that is valid and not required has no messages.
    pub fn error_messages(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|guard| {
                if guard.is_valid && !guard.is_required {
                    Vec::new()
                } else {
                    guard
                        .external_error
                        .clone()
                        .unwrap_or_else(|| guard.validation_errors.clone())
                }
            })
            .unwrap_or_default()
    }

    /// Whether the host should surface the field as missing required input.
    pub fn show_required(&self) -> bool {
        self.is_required()
    }

    /// Whether the host should surface the field as erroneous.
    pub fn show_error(&self) -> bool {
        !self.show_required() && !self.is_valid()
    }

    // -------------------------------------------------------------------------
    // Engine internals
    // -------------------------------------------------------------------------

    /// Clone the general and required rule sets.
    pub(crate) fn rule_sets(&self) -> (RuleSet, RuleSet) {
        self.inner
            .read()
            .map(|guard| (guard.rules.clone(), guard.required_rules.clone()))
            .unwrap_or_default()
    }

    /// Clone the caller-declared message overrides.
    pub(crate) fn message_overrides(&self) -> (Option<String>, HashMap<String, String>) {
        self.inner
            .read()
            .map(|guard| {
                (
                    guard.error_message.clone(),
                    guard.error_messages_by_rule.clone(),
                )
            })
            .unwrap_or_default()
    }

    /// Get the current external error overlay.
    pub(crate) fn external_error(&self) -> Option<Vec<String>> {
        self.inner
            .read()
            .map(|guard| guard.external_error.clone())
            .unwrap_or_default()
    }

    /// Commit the computed block of a validation pass.
    pub(crate) fn commit_validation(
        &self,
        is_valid: bool,
        is_required: bool,
        validation_errors: Vec<String>,
        external_error: Option<Vec<String>>,
    ) {
        if let Ok(mut guard) = self.inner.write() {
            guard.is_valid = is_valid;
            guard.is_required = is_required;
            guard.validation_errors = validation_errors;
            guard.external_error = external_error;
        }
    }

    /// Overlay an external error without touching rule results.
    pub(crate) fn set_external_state(&self, is_valid: bool, external_error: Option<Vec<String>>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.is_valid = is_valid;
            guard.external_error = external_error;
        }
    }

    /// Lift the external error overlay, leaving computed validity alone.
    pub(crate) fn clear_external_error(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.external_error = None;
        }
    }

    /// Set the pristine/submitted pair, driven by the form.
    pub(crate) fn set_pristine_state(&self, is_pristine: bool, form_submitted: bool) {
        if let Ok(mut guard) = self.inner.write() {
            guard.is_pristine = is_pristine;
            guard.form_submitted = form_submitted;
        }
    }
}

/// Builder for [`Field`] handles.
#[derive(Debug, Default)]
pub struct FieldBuilder {
    name: String,
    value: Value,
    rules: RuleSet,
    required_rules: RuleSet,
    error_message: Option<String>,
    error_messages_by_rule: HashMap<String, String>,
}

impl FieldBuilder {
    /// Set the initial (pristine) value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the general validation rules.
    pub fn validations(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Require the field to hold a non-empty value.
    pub fn required(mut self) -> Self {
        self.required_rules = RuleSet::new().rule("isDefaultRequiredValue");
        self
    }

    /// Make the field conditionally required.
    ///
    /// A required rule's success means the constraint is unmet, e.g.
    /// `isDefaultRequiredValue` succeeds on an unset or empty value.
    pub fn required_if(mut self, required_rules: RuleSet) -> Self {
        self.required_rules = required_rules;
        self
    }

    /// Set the fallback error message used for any failed rule.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set the error message for one specific rule.
    pub fn error_message_for(mut self, rule: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_messages_by_rule.insert(rule.into(), message.into());
        self
    }

    /// Build the field handle.
    pub fn build(self) -> Field {
        Field {
            id: FieldId::new(),
            inner: Arc::new(RwLock::new(FieldInner {
                name: self.name,
                pristine_value: self.value.clone(),
                value: self.value,
                rules: self.rules,
                required_rules: self.required_rules,
                error_message: self.error_message,
                error_messages_by_rule: self.error_messages_by_rule,
                is_valid: true,
                is_required: false,
                validation_errors: Vec::new(),
                external_error: None,
                is_pristine: true,
                form_submitted: false,
            })),
        }
    }
}
