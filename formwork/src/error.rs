//! Error types for form misconfiguration.

use thiserror::Error;

use crate::value::ErrorMap;

/// Errors raised by the form engine.
///
/// Every variant is a misconfiguration of the form or its rules, not a
/// runtime validation outcome. They propagate out of the triggering call
/// instead of being folded into field validity.
#[derive(Debug, Clone, Error)]
pub enum FormError {
    /// A rule descriptor names a rule that was never registered.
    #[error("no validation rule registered under \"{0}\"")]
    RuleNotFound(String),

    /// An external error map referenced a field name that is not attached.
    #[error("no attached field named \"{name}\"; check the error map against the attached field names ({errors:?})")]
    MissingField {
        /// The offending field name.
        name: String,
        /// The full error map, for diagnostics.
        errors: ErrorMap,
    },

    /// A field was attached without a usable name.
    #[error("fields must have a non-empty name before they are attached")]
    MissingName,

    /// A string rule descriptor carried more than one `:`-delimited argument.
    #[error("string validations take at most one argument: \"{0}\"; build a RuleSet for structured arguments")]
    MultiArgStringRule(String),
}
