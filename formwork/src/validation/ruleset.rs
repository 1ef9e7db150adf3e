//! Rule descriptors and ordered rule sets.

use std::str::FromStr;

use crate::error::FormError;
use crate::value::Value;

/// A reference to a registered rule plus its optional argument.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDescriptor {
    /// Name of the rule in the registry.
    pub name: String,
    /// Structured argument passed to the predicate.
    pub args: Option<Value>,
}

/// An ordered set of rule descriptors.
///
/// Sets are built programmatically or parsed from the string shorthand:
/// comma-separated entries of `name` or `name:arg`, where the argument
/// parses as JSON with a fallback to the raw string. Commas and colons
/// nested in brackets or quotes do not split.
///
/// ```ignore
/// let rules = RuleSet::new().rule("isEmail").rule_with("minLength", 2);
/// let same: RuleSet = "isEmail,minLength:2".parse()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<RuleDescriptor>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule without an argument.
    pub fn rule(mut self, name: impl Into<String>) -> Self {
        self.rules.push(RuleDescriptor {
            name: name.into(),
            args: None,
        });
        self
    }

    /// Add a rule with an argument.
    pub fn rule_with(mut self, name: impl Into<String>, args: impl Into<Value>) -> Self {
        self.rules.push(RuleDescriptor {
            name: name.into(),
            args: Some(args.into()),
        });
        self
    }

    /// Check whether the set holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of descriptors in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Iterate the descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.rules.iter()
    }
}

impl FromStr for RuleSet {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = RuleSet::new();
        for entry in split_top_level(s, ',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let parts = split_top_level(entry, ':');
            match parts.as_slice() {
                [name] => {
                    set.rules.push(RuleDescriptor {
                        name: name.trim().to_string(),
                        args: None,
                    });
                }
                [name, arg] => {
                    set.rules.push(RuleDescriptor {
                        name: name.trim().to_string(),
                        args: Some(parse_arg(arg.trim())),
                    });
                }
                _ => return Err(FormError::MultiArgStringRule(entry.to_string())),
            }
        }
        Ok(set)
    }
}

/// Split on `sep`, ignoring separators nested in brackets or quoted strings.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 && !in_string => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Arguments parse as JSON, falling back to the raw string.
fn parse_arg(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}
