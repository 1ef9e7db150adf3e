//! Dynamic value and error-message types shared across the engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A dynamically typed field value.
///
/// Values arrive from the host UI layer and have no fixed shape, so the
/// engine moves them around as `Value` trees. Equality is structural and
/// recursive, which is what change detection relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value (unset field).
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Text.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// String-keyed mapping of values.
    Object(HashMap<String, Value>),
}

impl Value {
    /// Check for the null (unset) value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check for the empty string.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, Value::String(s) if s.is_empty())
    }

    /// Borrow the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Display-form coercion used by pattern rules.
    ///
    /// Scalars stringify; null and containers do not coerce.
    pub fn coerce_str(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Character count for strings, item count for arrays.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(value: HashMap<String, Value>) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => {
                serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Mapping from field name to value.
///
/// Used for sibling snapshots, pristine maps and the flat model.
pub type ValueMap = HashMap<String, Value>;

/// One or more error messages for a single field.
///
/// External error maps accept either a bare string or a list of strings per
/// field; a bare string is treated as a single-element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessages {
    /// A single message.
    Single(String),
    /// An ordered list of messages.
    Many(Vec<String>),
}

impl ErrorMessages {
    /// Flatten into an ordered list of messages.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            ErrorMessages::Single(message) => vec![message.clone()],
            ErrorMessages::Many(messages) => messages.clone(),
        }
    }
}

impl From<&str> for ErrorMessages {
    fn from(message: &str) -> Self {
        ErrorMessages::Single(message.to_string())
    }
}

impl From<String> for ErrorMessages {
    fn from(message: String) -> Self {
        ErrorMessages::Single(message)
    }
}

impl From<Vec<String>> for ErrorMessages {
    fn from(messages: Vec<String>) -> Self {
        ErrorMessages::Many(messages)
    }
}

/// Mapping from field name to external error messages.
pub type ErrorMap = HashMap<String, ErrorMessages>;
