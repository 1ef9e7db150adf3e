//! Rule execution pipeline.
//!
//! Rules live in a process-wide registry keyed by name. A field declares an
//! ordered [`RuleSet`] of descriptors; the runner resolves each descriptor
//! against the registry and partitions the results into passed and failed
//! rules plus any custom messages the predicates attached.
//!
//! # Example
//!
//! ```ignore
//! use formwork::validation::{register_rule, RuleOutcome, RuleSet};
//!
//! register_rule("isEven", |value, _siblings, _args| {
//!     match value {
//!         Value::Int(i) => (i % 2 == 0).into(),
//!         _ => RuleOutcome::Fail,
//!     }
//! });
//!
//! let rules: RuleSet = "isEven,minLength:2".parse()?;
//! ```

mod registry;
mod rules;
mod runner;
mod ruleset;

pub use registry::{RuleRegistration, register_rule};
pub use runner::{RuleOutcome, RuleReport, run_rules};
pub use ruleset::{RuleDescriptor, RuleSet};
