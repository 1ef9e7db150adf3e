//! Process-wide rule registry with inventory-based seeding.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::FormError;
use crate::validation::runner::RuleOutcome;
use crate::value::{Value, ValueMap};

/// Signature shared by every validation predicate.
///
/// Predicates receive the value under test, a snapshot of every attached
/// field's current value keyed by name, and the descriptor's argument.
pub type RuleFn = dyn Fn(&Value, &ValueMap, Option<&Value>) -> RuleOutcome + Send + Sync;

/// Built-in rule registration entry for inventory.
pub struct RuleRegistration {
    /// Rule name as referenced by descriptors.
    pub name: &'static str,
    /// The predicate.
    pub run: fn(&Value, &ValueMap, Option<&Value>) -> RuleOutcome,
}

impl RuleRegistration {
    /// Create a new rule registration.
    pub const fn new(
        name: &'static str,
        run: fn(&Value, &ValueMap, Option<&Value>) -> RuleOutcome,
    ) -> Self {
        Self { name, run }
    }
}

inventory::collect!(RuleRegistration);

/// The registry, seeded on first access from the inventory-collected
/// built-in registrations.
fn registry() -> &'static RwLock<HashMap<String, Arc<RuleFn>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<RuleFn>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut rules: HashMap<String, Arc<RuleFn>> = HashMap::new();
        for entry in inventory::iter::<RuleRegistration>() {
            rules.insert(entry.name.to_string(), Arc::new(entry.run) as Arc<RuleFn>);
        }
        RwLock::new(rules)
    })
}

/// Register a validation rule, replacing any rule with the same name.
///
/// The registration is visible to every subsequent validation run.
pub fn register_rule<F>(name: impl Into<String>, rule: F)
where
    F: Fn(&Value, &ValueMap, Option<&Value>) -> RuleOutcome + Send + Sync + 'static,
{
    if let Ok(mut rules) = registry().write() {
        rules.insert(name.into(), Arc::new(rule));
    }
}

/// Look up a rule by name.
pub(crate) fn lookup(name: &str) -> Result<Arc<RuleFn>, FormError> {
    let rules = registry()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    rules
        .get(name)
        .cloned()
        .ok_or_else(|| FormError::RuleNotFound(name.to_string()))
}
