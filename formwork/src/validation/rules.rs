//! Built-in rule library.
//!
//! Format rules pass on missing or empty input; required-ness is expressed
//! through the separate required rules on a field (`isDefaultRequiredValue`
//! and friends), whose success means the required constraint is unmet.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::validation::registry::RuleRegistration;
use crate::validation::runner::RuleOutcome;
use crate::value::{Value, ValueMap};

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:\d*\.)?\d+$").expect("numeric regex"));
static ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("alpha regex"));
static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z]+$").expect("alphanumeric regex"));
static INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:0|[1-9]\d*)$").expect("int regex"));
static FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-+]?\d+)?(?:\.\d*)?(?:[eE][+-]?\d+)?$").expect("float regex"));
static WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("words regex"));
static SPECIAL_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s\u{00C0}-\u{017F}]+$").expect("special words regex"));
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url regex"));

/// Format rules do not fire on unset or empty input.
fn blank(value: &Value) -> bool {
    value.is_null() || value.is_empty_string()
}

/// Test a value's display form against a pattern. Containers fail.
fn match_pattern(value: &Value, pattern: &Regex) -> RuleOutcome {
    if blank(value) {
        return RuleOutcome::Pass;
    }
    match value.coerce_str() {
        Some(text) => pattern.is_match(&text).into(),
        None => RuleOutcome::Fail,
    }
}

/// Non-negative integer argument, for the length rules.
fn arg_usize(args: Option<&Value>) -> Option<usize> {
    match args? {
        Value::Int(i) if *i >= 0 => Some(*i as usize),
        _ => None,
    }
}

fn is_default_required_value(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    blank(value).into()
}

fn is_existy(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    (!value.is_null()).into()
}

fn is_undefined(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    value.is_null().into()
}

fn is_empty_string(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    value.is_empty_string().into()
}

fn match_regexp(value: &Value, _values: &ValueMap, args: Option<&Value>) -> RuleOutcome {
    if blank(value) {
        return RuleOutcome::Pass;
    }
    let Some(pattern) = args.and_then(|a| a.as_str()) else {
        return RuleOutcome::Fail;
    };
    let Some(text) = value.coerce_str() else {
        return RuleOutcome::Fail;
    };
    match Regex::new(pattern) {
        Ok(re) => re.is_match(&text).into(),
        Err(_) => RuleOutcome::Fail,
    }
}

fn is_email(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    if blank(value) {
        return RuleOutcome::Pass;
    }
    match value.as_str() {
        Some(text) => email_address::EmailAddress::is_valid(text).into(),
        None => RuleOutcome::Fail,
    }
}

fn is_url(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    match_pattern(value, &URL)
}

fn is_true(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    matches!(value, Value::Bool(true)).into()
}

fn is_false(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    matches!(value, Value::Bool(false)).into()
}

fn is_numeric(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    if matches!(value, Value::Int(_) | Value::Float(_)) {
        return RuleOutcome::Pass;
    }
    match_pattern(value, &NUMERIC)
}

fn is_alpha(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    match_pattern(value, &ALPHA)
}

fn is_alphanumeric(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    match_pattern(value, &ALPHANUMERIC)
}

fn is_int(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    match_pattern(value, &INT)
}

fn is_float(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    match_pattern(value, &FLOAT)
}

fn is_words(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    match_pattern(value, &WORDS)
}

fn is_special_words(value: &Value, _values: &ValueMap, _args: Option<&Value>) -> RuleOutcome {
    match_pattern(value, &SPECIAL_WORDS)
}

fn is_length(value: &Value, _values: &ValueMap, args: Option<&Value>) -> RuleOutcome {
    if blank(value) {
        return RuleOutcome::Pass;
    }
    match (value.length(), arg_usize(args)) {
        (Some(len), Some(want)) => (len == want).into(),
        _ => RuleOutcome::Fail,
    }
}

fn min_length(value: &Value, _values: &ValueMap, args: Option<&Value>) -> RuleOutcome {
    if blank(value) {
        return RuleOutcome::Pass;
    }
    match (value.length(), arg_usize(args)) {
        (Some(len), Some(min)) => (len >= min).into(),
        _ => RuleOutcome::Fail,
    }
}

fn max_length(value: &Value, _values: &ValueMap, args: Option<&Value>) -> RuleOutcome {
    if blank(value) {
        return RuleOutcome::Pass;
    }
    match (value.length(), arg_usize(args)) {
        (Some(len), Some(max)) => (len <= max).into(),
        _ => RuleOutcome::Fail,
    }
}

fn equals(value: &Value, _values: &ValueMap, args: Option<&Value>) -> RuleOutcome {
    if blank(value) {
        return RuleOutcome::Pass;
    }
    match args {
        Some(expected) => (value == expected).into(),
        None => RuleOutcome::Fail,
    }
}

fn equals_field(value: &Value, values: &ValueMap, args: Option<&Value>) -> RuleOutcome {
    let Some(name) = args.and_then(|a| a.as_str()) else {
        return RuleOutcome::Fail;
    };
    let sibling = values.get(name).unwrap_or(&Value::Null);
    (value == sibling).into()
}

inventory::submit! { RuleRegistration::new("isDefaultRequiredValue", is_default_required_value) }
inventory::submit! { RuleRegistration::new("isExisty", is_existy) }
inventory::submit! { RuleRegistration::new("isUndefined", is_undefined) }
inventory::submit! { RuleRegistration::new("isEmptyString", is_empty_string) }
inventory::submit! { RuleRegistration::new("matchRegexp", match_regexp) }
inventory::submit! { RuleRegistration::new("isEmail", is_email) }
inventory::submit! { RuleRegistration::new("isUrl", is_url) }
inventory::submit! { RuleRegistration::new("isTrue", is_true) }
inventory::submit! { RuleRegistration::new("isFalse", is_false) }
inventory::submit! { RuleRegistration::new("isNumeric", is_numeric) }
inventory::submit! { RuleRegistration::new("isAlpha", is_alpha) }
inventory::submit! { RuleRegistration::new("isAlphanumeric", is_alphanumeric) }
inventory::submit! { RuleRegistration::new("isInt", is_int) }
inventory::submit! { RuleRegistration::new("isFloat", is_float) }
inventory::submit! { RuleRegistration::new("isWords", is_words) }
inventory::submit! { RuleRegistration::new("isSpecialWords", is_special_words) }
inventory::submit! { RuleRegistration::new("isLength", is_length) }
inventory::submit! { RuleRegistration::new("minLength", min_length) }
inventory::submit! { RuleRegistration::new("maxLength", max_length) }
inventory::submit! { RuleRegistration::new("equals", equals) }
inventory::submit! { RuleRegistration::new("equalsField", equals_field) }
