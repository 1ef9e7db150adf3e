//! Tests for field registration, validation orchestration and validity
//! aggregation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use formwork::prelude::*;

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let clone = Arc::clone(&count);
    (count, move || {
        clone.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_field_without_rules_is_valid() {
    let form = Form::builder().build();
    let field = Field::builder("foo").build();
    form.attach(&field).unwrap();

    assert!(field.is_valid());
    assert!(!field.is_required());
    assert!(field.error_messages().is_empty());
    assert!(form.is_form_valid());
}

#[test]
fn test_required_field_without_value_is_invalid() {
    let form = Form::builder().build();
    let field = Field::builder("foo").required().build();
    form.attach(&field).unwrap();

    assert!(!field.is_valid());
    assert!(field.is_required());
    assert!(field.show_required());
    assert!(!field.show_error());
    assert!(!form.is_form_valid());

    field.set_value("something".into());
    form.validate(&field).unwrap();
    assert!(field.is_valid());
    assert!(!field.is_required());
    assert!(form.is_form_valid());
}

#[test]
fn test_required_overrides_passing_general_rules() {
    let form = Form::builder().build();
    // The general rules pass outright, but the required rule also fires:
    // required-ness must win.
    let field = Field::builder("flag")
        .value(true)
        .validations(RuleSet::new().rule("isTrue"))
        .required_if(RuleSet::new().rule("isTrue"))
        .build();
    form.attach(&field).unwrap();

    assert!(field.is_required());
    assert!(!field.is_valid());
    assert!(!form.is_form_valid());
}

#[test]
fn test_form_validity_is_and_over_all_fields() {
    let form = Form::builder().build();
    let good = Field::builder("good").value("fine").build();
    let bad = Field::builder("bad").required().build();
    form.attach(&good).unwrap();
    assert!(form.is_form_valid());
    form.attach(&bad).unwrap();
    assert!(!form.is_form_valid());

    bad.set_value("filled in".into());
    form.validate(&bad).unwrap();
    assert!(form.is_form_valid());
}

#[test]
fn test_attach_then_detach_leaves_form_validity_untouched() {
    let form = Form::builder().build();
    let stable = Field::builder("stable").build();
    form.attach(&stable).unwrap();
    assert!(form.is_form_valid());

    let transient = Field::builder("transient").required().build();
    form.attach(&transient).unwrap();
    assert!(!form.is_form_valid());
    form.detach(&transient).unwrap();
    assert!(form.is_form_valid());
}

#[test]
fn test_detaching_last_invalid_field_flips_form_valid() {
    let form = Form::builder().build();
    let valid = Field::builder("a").value("x").build();
    let invalid = Field::builder("b").required().build();
    form.attach(&valid).unwrap();
    form.attach(&invalid).unwrap();
    assert!(!form.is_form_valid());

    form.detach(&invalid).unwrap();
    assert!(form.is_form_valid());
}

#[test]
fn test_attach_is_idempotent_per_identity() {
    let form = Form::builder().build();
    let field = Field::builder("foo").build();
    form.attach(&field).unwrap();
    form.attach(&field).unwrap();
    assert_eq!(form.fields().len(), 1);
}

#[test]
fn test_detach_of_unattached_field_is_a_noop() {
    let form = Form::builder().build();
    let field = Field::builder("foo").build();
    form.detach(&field).unwrap();
    assert!(form.is_form_valid());
    assert!(form.can_notify_change());
}

#[test]
fn test_attach_requires_a_name() {
    let form = Form::builder().build();
    let field = Field::builder("").build();
    assert!(matches!(form.attach(&field), Err(FormError::MissingName)));
}

#[test]
fn test_unknown_rule_surfaces_from_attach() {
    let form = Form::builder().build();
    let field = Field::builder("foo")
        .validations(RuleSet::new().rule("noSuchRuleEither"))
        .build();
    let result = form.attach(&field);
    assert!(matches!(result, Err(FormError::RuleNotFound(name)) if name == "noSuchRuleEither"));
}

#[test]
fn test_cross_field_rules_revalidate_siblings() {
    let form = Form::builder().build();
    let password = Field::builder("password").value("hunter2").build();
    let confirm = Field::builder("confirm")
        .value("hunter2")
        .validations(RuleSet::new().rule_with("equalsField", "password"))
        .build();
    form.attach(&password).unwrap();
    form.attach(&confirm).unwrap();
    assert!(form.is_form_valid());

    // Changing the sibling must invalidate the confirmation field even
    // though its own value did not change.
    password.set_value("different".into());
    form.validate(&password).unwrap();
    assert!(!confirm.is_valid());
    assert!(!form.is_form_valid());
}

#[test]
fn test_valid_and_invalid_notifications_fire_per_pass() {
    let (valid_count, on_valid) = counter();
    let (invalid_count, on_invalid) = counter();
    let form = Form::builder().on_valid(on_valid).on_invalid(on_invalid).build();

    let field = Field::builder("foo").required().build();
    form.attach(&field).unwrap();
    assert_eq!(valid_count.load(Ordering::SeqCst), 0);
    assert_eq!(invalid_count.load(Ordering::SeqCst), 1);

    field.set_value("bar".into());
    form.validate(&field).unwrap();
    assert_eq!(valid_count.load(Ordering::SeqCst), 1);
    assert_eq!(invalid_count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_change_notifications_wait_for_first_pass() {
    let change_count = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&change_count);
    let form = Form::builder()
        .on_change(move |_model, _changed| {
            observed.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let field = Field::builder("foo").build();
    assert!(!form.can_notify_change());
    form.attach(&field).unwrap();
    // The attach pass latches the notification gate but does not itself
    // count as a change.
    assert!(form.can_notify_change());
    assert_eq!(change_count.load(Ordering::SeqCst), 0);

    field.set_value("bar".into());
    form.validate(&field).unwrap();
    assert_eq!(change_count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_is_valid_value_does_not_mutate_state() {
    let form = Form::builder().build();
    let field = Field::builder("email")
        .value("jane@example.com")
        .validations(RuleSet::new().rule("isEmail"))
        .build();
    form.attach(&field).unwrap();

    assert!(!form.is_valid_value(&field, &Value::from("nope")).unwrap());
    assert!(form.is_valid_value(&field, &Value::from("joe@example.com")).unwrap());
    assert_eq!(field.value(), Value::from("jane@example.com"));
    assert!(field.is_valid());
    assert!(form.is_form_valid());
}

#[test]
fn test_failed_rules_map_through_message_overrides() {
    let form = Form::builder().build();
    let field = Field::builder("email")
        .value("not-an-email")
        .validations(RuleSet::new().rule("isEmail").rule_with("minLength", 50))
        .error_message("something is off")
        .build();
    form.attach(&field).unwrap();

    // Both failed rules resolve to the same fallback; duplicates collapse.
    assert_eq!(field.error_messages(), ["something is off"]);

    let field_with_specific = Field::builder("email2")
        .value("not-an-email")
        .validations(RuleSet::new().rule("isEmail").rule_with("minLength", 50))
        .error_message("something is off")
        .error_message_for("isEmail", "that is not an email")
        .build();
    form.attach(&field_with_specific).unwrap();
    assert_eq!(
        field_with_specific.error_messages(),
        ["that is not an email", "something is off"]
    );
}

#[test]
fn test_required_message_prefers_rule_override() {
    let form = Form::builder().build();
    let field = Field::builder("name")
        .required()
        .error_message("fallback")
        .error_message_for("isDefaultRequiredValue", "name is required")
        .build();
    form.attach(&field).unwrap();
    assert_eq!(field.error_messages(), ["name is required"]);

    let bare = Field::builder("bare").required().build();
    form.attach(&bare).unwrap();
    // Invalid but without a derivable message.
    assert!(!bare.is_valid());
    assert!(bare.error_messages().is_empty());
}

#[test]
fn test_rule_message_outcome_is_used_directly() {
    register_rule("neverWithMessage", |_value, _siblings, _args| {
        RuleOutcome::Message {
            success: false,
            message: "custom rule message".to_string(),
        }
    });
    let form = Form::builder().build();
    let field = Field::builder("foo")
        .value("bar")
        .validations(RuleSet::new().rule("neverWithMessage"))
        .error_message("generic fallback")
        .build();
    form.attach(&field).unwrap();

    // The predicate's own message wins over the generic mapping.
    assert_eq!(field.error_messages(), ["custom rule message"]);
}

#[test]
fn test_set_validations_takes_effect_on_next_validation() {
    let form = Form::builder().build();
    let field = Field::builder("foo").value("abc").build();
    form.attach(&field).unwrap();
    assert!(field.is_valid());

    field.set_validations(RuleSet::new().rule_with("minLength", 10), RuleSet::new());
    form.validate(&field).unwrap();
    assert!(!field.is_valid());
}

#[test]
fn test_disabled_flag() {
    let form = Form::builder().disabled(true).build();
    assert!(form.is_form_disabled());
    form.set_disabled(false);
    assert!(!form.is_form_disabled());
}
