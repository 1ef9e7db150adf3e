//! Rule execution against a field value.

use crate::error::FormError;
use crate::validation::registry;
use crate::validation::ruleset::RuleSet;
use crate::value::{Value, ValueMap};

/// What a predicate reports back for one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The rule passed.
    Pass,
    /// The rule failed; the generic error-message mapping applies.
    Fail,
    /// Pass or fail with a custom message attached.
    ///
    /// The message is collected into the report regardless of which branch
    /// later resolves the field's error text.
    Message {
        /// Whether the rule passed.
        success: bool,
        /// The custom message.
        message: String,
    },
}

impl From<bool> for RuleOutcome {
    fn from(success: bool) -> Self {
        if success { Self::Pass } else { Self::Fail }
    }
}

/// Partitions produced by one run over a rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleReport {
    /// Names of rules that passed, in evaluation order.
    pub passed: Vec<String>,
    /// Names of rules that failed, in evaluation order.
    pub failed: Vec<String>,
    /// Custom messages attached by predicates, in evaluation order.
    pub messages: Vec<String>,
}

impl RuleReport {
    /// Check that no rule failed.
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run every descriptor in `rules` against `value`.
///
/// Descriptors are evaluated in order with no short-circuit, so every
/// triggered custom message is collected. An unregistered rule name is a
/// hard error, never a silent pass.
pub fn run_rules(
    value: &Value,
    siblings: &ValueMap,
    rules: &RuleSet,
) -> Result<RuleReport, FormError> {
    let mut report = RuleReport::default();
    for descriptor in rules.iter() {
        let rule = registry::lookup(&descriptor.name)?;
        match rule(value, siblings, descriptor.args.as_ref()) {
            RuleOutcome::Pass => report.passed.push(descriptor.name.clone()),
            RuleOutcome::Fail => report.failed.push(descriptor.name.clone()),
            RuleOutcome::Message { success, message } => {
                report.messages.push(message);
                if success {
                    report.passed.push(descriptor.name.clone());
                } else {
                    report.failed.push(descriptor.name.clone());
                }
            }
        }
    }
    Ok(report)
}
