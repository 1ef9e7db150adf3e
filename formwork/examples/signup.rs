//! Signup form demo.
//!
//! Wires up a small signup form, feeds it values the way a host UI layer
//! would, and logs the validity transitions to `signup.log`.

use std::fs::File;

use formwork::prelude::*;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

fn main() -> Result<(), FormError> {
    // Initialize file logging
    if let Ok(log_file) = File::create("signup.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let form = Form::builder()
        .on_valid(|| println!("form is valid"))
        .on_invalid(|| println!("form is invalid"))
        .on_valid_submit(|model, _form| println!("submitting {model:?}"))
        .on_invalid_submit(|_model, form| {
            for field in form.fields() {
                for message in field.error_messages() {
                    println!("  {}: {}", field.name(), message);
                }
            }
        })
        .build();

    let email = Field::builder("account.email")
        .validations("isEmail".parse()?)
        .required()
        .error_message("a valid email address is required")
        .build();
    let password = Field::builder("account.password")
        .validations(RuleSet::new().rule_with("minLength", 8))
        .required()
        .error_message_for("minLength", "use at least 8 characters")
        .build();
    let confirm = Field::builder("account.confirm")
        .validations(RuleSet::new().rule_with("equalsField", "account.password"))
        .error_message_for("equalsField", "passwords do not match")
        .build();

    form.attach(&email)?;
    form.attach(&password)?;
    form.attach(&confirm)?;

    // First attempt: too short, mismatched confirmation.
    email.set_value("jane@example.com".into());
    form.validate(&email)?;
    password.set_value("hunter2".into());
    form.validate(&password)?;
    confirm.set_value("hunter".into());
    form.validate(&confirm)?;
    form.submit();

    // Second attempt.
    password.set_value("correct horse battery".into());
    form.validate(&password)?;
    confirm.set_value("correct horse battery".into());
    form.validate(&confirm)?;
    form.submit();

    println!("model: {:?}", form.get_model());
    Ok(())
}
