//! Tests for the built-in rule library and the rule registry.

use formwork::prelude::*;

fn run_one(rule: &str, value: Value) -> RuleReport {
    run_rules(&value, &ValueMap::new(), &RuleSet::new().rule(rule)).unwrap()
}

fn run_one_with(rule: &str, value: Value, args: impl Into<Value>) -> RuleReport {
    run_rules(&value, &ValueMap::new(), &RuleSet::new().rule_with(rule, args)).unwrap()
}

#[test]
fn test_unknown_rule_is_a_hard_error() {
    let result = run_rules(
        &Value::from("x"),
        &ValueMap::new(),
        &RuleSet::new().rule("noSuchRule"),
    );
    assert!(matches!(result, Err(FormError::RuleNotFound(name)) if name == "noSuchRule"));
}

#[test]
fn test_register_rule_is_visible_immediately() {
    register_rule("isEven", |value, _siblings, _args| match value {
        Value::Int(i) => (i % 2 == 0).into(),
        _ => RuleOutcome::Fail,
    });
    assert!(run_one("isEven", Value::Int(4)).all_passed());
    assert_eq!(run_one("isEven", Value::Int(3)).failed, ["isEven"]);
}

#[test]
fn test_register_rule_overwrites_existing() {
    register_rule("isTemporary", |_value, _siblings, _args| RuleOutcome::Pass);
    assert!(run_one("isTemporary", Value::Null).all_passed());
    register_rule("isTemporary", |_value, _siblings, _args| RuleOutcome::Fail);
    assert!(!run_one("isTemporary", Value::Null).all_passed());
}

#[test]
fn test_all_rules_run_without_short_circuit() {
    register_rule("alwaysMessage", |_value, _siblings, _args| {
        RuleOutcome::Message {
            success: false,
            message: "custom message".to_string(),
        }
    });
    let rules = RuleSet::new()
        .rule("alwaysMessage")
        .rule_with("minLength", 50)
        .rule("alwaysMessage");
    let report = run_rules(&Value::from("short"), &ValueMap::new(), &rules).unwrap();
    assert_eq!(report.failed, ["alwaysMessage", "minLength", "alwaysMessage"]);
    assert_eq!(report.messages, ["custom message", "custom message"]);
}

#[test]
fn test_is_default_required_value() {
    assert!(run_one("isDefaultRequiredValue", Value::Null).all_passed());
    assert!(run_one("isDefaultRequiredValue", Value::from("")).all_passed());
    assert!(!run_one("isDefaultRequiredValue", Value::from("x")).all_passed());
    assert!(!run_one("isDefaultRequiredValue", Value::Int(0)).all_passed());
}

#[test]
fn test_is_existy() {
    assert!(!run_one("isExisty", Value::Null).all_passed());
    assert!(run_one("isExisty", Value::from("")).all_passed());
    assert!(run_one("isExisty", Value::Bool(false)).all_passed());
}

#[test]
fn test_format_rules_pass_on_blank_input() {
    for rule in ["isEmail", "isUrl", "isNumeric", "isAlpha", "isInt"] {
        assert!(run_one(rule, Value::Null).all_passed(), "{rule} on null");
        assert!(run_one(rule, Value::from("")).all_passed(), "{rule} on empty");
    }
}

#[test]
fn test_is_email() {
    assert!(run_one("isEmail", Value::from("jane@example.com")).all_passed());
    assert!(!run_one("isEmail", Value::from("not-an-email")).all_passed());
    assert!(!run_one("isEmail", Value::Int(42)).all_passed());
}

#[test]
fn test_is_url() {
    assert!(run_one("isUrl", Value::from("https://example.com/path")).all_passed());
    assert!(run_one("isUrl", Value::from("http://example.com")).all_passed());
    assert!(!run_one("isUrl", Value::from("example.com")).all_passed());
}

#[test]
fn test_is_numeric_accepts_numbers_and_numeric_strings() {
    assert!(run_one("isNumeric", Value::Int(-3)).all_passed());
    assert!(run_one("isNumeric", Value::Float(2.5)).all_passed());
    assert!(run_one("isNumeric", Value::from("12.5")).all_passed());
    assert!(run_one("isNumeric", Value::from("+42")).all_passed());
    assert!(!run_one("isNumeric", Value::from("abc")).all_passed());
}

#[test]
fn test_int_and_float_formats() {
    assert!(run_one("isInt", Value::from("42")).all_passed());
    assert!(run_one("isInt", Value::from("-7")).all_passed());
    assert!(!run_one("isInt", Value::from("007")).all_passed());
    assert!(run_one("isFloat", Value::from("3.14")).all_passed());
    assert!(run_one("isFloat", Value::from("1e6")).all_passed());
    assert!(!run_one("isFloat", Value::from("abc")).all_passed());
}

#[test]
fn test_word_rules() {
    assert!(run_one("isAlpha", Value::from("abc")).all_passed());
    assert!(!run_one("isAlpha", Value::from("abc1")).all_passed());
    assert!(run_one("isAlphanumeric", Value::from("abc1")).all_passed());
    assert!(run_one("isWords", Value::from("two words")).all_passed());
    assert!(!run_one("isWords", Value::from("two words!")).all_passed());
    assert!(run_one("isSpecialWords", Value::from("fjärde ordet")).all_passed());
}

#[test]
fn test_is_true_and_is_false() {
    assert!(run_one("isTrue", Value::Bool(true)).all_passed());
    assert!(!run_one("isTrue", Value::Bool(false)).all_passed());
    assert!(!run_one("isTrue", Value::from("true")).all_passed());
    assert!(run_one("isFalse", Value::Bool(false)).all_passed());
    assert!(!run_one("isFalse", Value::Null).all_passed());
}

#[test]
fn test_match_regexp_uses_display_form() {
    assert!(run_one_with("matchRegexp", Value::from("abc"), "^[a-z]+$").all_passed());
    assert!(!run_one_with("matchRegexp", Value::from("ABC"), "^[a-z]+$").all_passed());
    assert!(run_one_with("matchRegexp", Value::Int(42), r"^\d+$").all_passed());
}

#[test]
fn test_pattern_rules_fail_on_containers() {
    let array = Value::Array(vec![Value::from("abc")]);
    assert!(!run_one("isAlpha", array.clone()).all_passed());
    assert!(!run_one_with("matchRegexp", array, ".*").all_passed());
}

#[test]
fn test_length_rules_on_strings_and_arrays() {
    assert!(run_one_with("isLength", Value::from("abc"), 3).all_passed());
    assert!(!run_one_with("isLength", Value::from("abc"), 2).all_passed());
    assert!(run_one_with("minLength", Value::from("abc"), 2).all_passed());
    assert!(!run_one_with("minLength", Value::from("a"), 2).all_passed());
    assert!(run_one_with("minLength", Value::from(""), 2).all_passed());
    assert!(run_one_with("maxLength", Value::from("abc"), 3).all_passed());
    assert!(!run_one_with("maxLength", Value::from("abcd"), 3).all_passed());

    let items = Value::Array(vec![Value::Int(1), Value::Int(2)]);
    assert!(run_one_with("isLength", items.clone(), 2).all_passed());
    assert!(!run_one_with("maxLength", items, 1).all_passed());
}

#[test]
fn test_length_counts_characters_not_bytes() {
    assert!(run_one_with("isLength", Value::from("åäö"), 3).all_passed());
}

#[test]
fn test_equals_deep_equality() {
    let expected = Value::Array(vec![Value::Int(1), Value::from("two")]);
    let same = Value::Array(vec![Value::Int(1), Value::from("two")]);
    assert!(run_one_with("equals", same, expected.clone()).all_passed());
    assert!(!run_one_with("equals", Value::Int(2), Value::Int(3)).all_passed());
    assert!(run_one_with("equals", Value::from(""), Value::Int(3)).all_passed());
}

#[test]
fn test_equals_field_compares_against_sibling() {
    let mut siblings = ValueMap::new();
    siblings.insert("password".to_string(), Value::from("hunter2"));

    let rules = RuleSet::new().rule_with("equalsField", "password");
    let report = run_rules(&Value::from("hunter2"), &siblings, &rules).unwrap();
    assert!(report.all_passed());

    let report = run_rules(&Value::from("other"), &siblings, &rules).unwrap();
    assert!(!report.all_passed());
}

#[test]
fn test_equals_field_missing_sibling_compares_as_null() {
    let rules = RuleSet::new().rule_with("equalsField", "missing");
    let report = run_rules(&Value::Null, &ValueMap::new(), &rules).unwrap();
    assert!(report.all_passed());

    let report = run_rules(&Value::from("x"), &ValueMap::new(), &rules).unwrap();
    assert!(!report.all_passed());
}
