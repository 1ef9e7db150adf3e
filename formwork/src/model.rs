//! Model shaping and change detection.

use std::collections::HashMap;

use crate::field::Field;
use crate::value::{Value, ValueMap};

/// Snapshot of each field's current value, keyed by name.
///
/// Fields are visited in attachment order, so a later field with a
/// duplicate name overwrites an earlier one. Duplicate names are a caller
/// contract, not an error.
pub(crate) fn current_values(fields: &[Field]) -> ValueMap {
    fields
        .iter()
        .map(|field| (field.name(), field.value()))
        .collect()
}

/// Snapshot of each field's pristine value, keyed by name.
pub(crate) fn pristine_values(fields: &[Field]) -> ValueMap {
    fields
        .iter()
        .map(|field| (field.name(), field.pristine_value()))
        .collect()
}

/// Deep comparison of current values against pristine values.
pub(crate) fn is_changed(fields: &[Field]) -> bool {
    current_values(fields) != pristine_values(fields)
}

/// Each field's current value paired with its name, in attachment order.
///
/// Model expansion works off this ordered sequence rather than the
/// name-keyed snapshot, so collisions resolve deterministically.
pub(crate) fn ordered_values(fields: &[Field]) -> Vec<(String, Value)> {
    fields
        .iter()
        .map(|field| (field.name(), field.value()))
        .collect()
}

/// Expand dotted names into a nested object.
///
/// `"a.b.c"` with value `1` becomes `{a: {b: {c: 1}}}`. Intermediate levels
/// are created as needed; a value already occupying a colliding level is
/// replaced, so between colliding names the later entry wins.
pub fn expand_dotted(entries: &[(String, Value)]) -> Value {
    let mut root: HashMap<String, Value> = HashMap::new();
    for (key, value) in entries {
        let mut level = &mut root;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                level.insert(part.to_string(), value.clone());
                break;
            }
            let entry = level
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(HashMap::new()));
            if !matches!(entry, Value::Object(_)) {
                *entry = Value::Object(HashMap::new());
            }
            let Value::Object(next) = entry else { break };
            level = next;
        }
    }
    Value::Object(root)
}
