//! Declarative form-validation orchestration.
//!
//! `formwork` tracks a dynamic set of fields, runs per-field and cross-field
//! validation rules against their current values, aggregates per-field
//! validity into form-level validity, and reconciles externally supplied
//! errors (e.g. from a server) with locally computed ones. Fields attach and
//! detach at arbitrary times; every mutation triggers a full revalidation
//! pass so validity state stays consistent, and notification handlers fire
//! exactly when relevant state changes.
//!
//! # Example
//!
//! ```ignore
//! use formwork::prelude::*;
//!
//! let form = Form::builder()
//!     .on_valid(|| println!("ready to submit"))
//!     .build();
//!
//! let email = Field::builder("email")
//!     .validations("isEmail".parse()?)
//!     .required()
//!     .build();
//! form.attach(&email)?;
//!
//! email.set_value("jane@example.com".into());
//! form.validate(&email)?;
//! assert!(form.is_form_valid());
//! ```

pub mod error;
pub mod field;
pub mod form;
pub mod model;
pub mod validation;
pub mod value;

pub use error::FormError;
pub use field::{Field, FieldBuilder, FieldId};
pub use form::{Form, FormBuilder};

pub mod prelude {
    //! Convenience re-exports for consumers of the engine.

    pub use crate::error::FormError;
    pub use crate::field::{Field, FieldBuilder, FieldId};
    pub use crate::form::{Form, FormBuilder};
    pub use crate::model::expand_dotted;
    pub use crate::validation::{
        RuleDescriptor, RuleOutcome, RuleReport, RuleSet, register_rule, run_rules,
    };
    pub use crate::value::{ErrorMap, ErrorMessages, Value, ValueMap};
}
