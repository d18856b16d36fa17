//! # sire
//!
//! Recursive, declarative validation of untyped data. A schema declares a
//! type and a validator chain per field; validating a payload coerces each
//! field, runs its validators and collects every failure into a report
//! that can be read as a flat list, a keyed map or grouped by sub-schema.
//!
//! ## Example
//!
//! ```rust
//! use sire::prelude::*;
//! use serde_json::json;
//!
//! let mut address = Schema::new(SchemaConfig::default().title("Address"));
//! address.add("street", "text", &["required"]).unwrap().label("Street");
//!
//! let mut user = Schema::default();
//! user.add("email", "text", &["required", "email"]).unwrap().label("Email");
//! user.add("age", "int", &["min:18"]).unwrap().label("Age");
//! user.add("address", address, &[]).unwrap();
//!
//! let validation = user
//!     .validate(&json!({"email": "a@example.com", "age": "21", "address": {}}))
//!     .unwrap();
//!
//! assert!(!validation.is_valid());
//! assert_eq!(validation.values()["age"], json!(21));
//!
//! let report = validation.errors(true);
//! let groups = report.groups().unwrap();
//! assert_eq!(groups[0].title.as_deref(), Some("Address"));
//! assert_eq!(groups[0].errors[0].error, "Required");
//! ```
//!
//! ## Types
//!
//! - `text` - trimmed, HTML-escaped string
//! - `plain` - raw string
//! - `html[:tags]` - markup reduced to an allow-list of tags
//! - `int`, `float`, `bool`
//! - `list` - a JSON array
//! - another [`Schema`] - validated recursively
//!
//! ## Validators
//!
//! - `required`
//! - `email[:checkdns]`
//! - `minlen:N`, `maxlen:N`
//! - `min:N`, `max:N`
//! - `regex:PATTERN`
//! - `in:a,b,c`

mod coerce;
mod config;
mod dns;
mod error;
mod message;
mod report;
mod rule;
mod sanitize;
mod schema;
mod validation;
mod validators;
mod value;

#[cfg(test)]
mod tests;

pub use config::SchemaConfig;
pub use dns::{MxResolver, NoDns};
#[cfg(feature = "dns")]
pub use dns::SystemDns;
pub use error::{Result, SchemaError};
pub use message::{interpolate, Messages};
pub use report::{ErrorEntry, ErrorGroup, ErrorMap, ErrorReport, FieldErrors, ReportErrors};
pub use rule::{FieldType, IntoFieldType, PrimitiveType, Rule, RuleHandle};
pub use sanitize::{clean_html, escape_html, DEFAULT_ALLOWED_TAGS};
pub use schema::{ReviewFn, Schema, SchemaBuilder};
pub use validation::{Review, Validation};
pub use validators::{builtins, compile_pattern, PredicateFn, Validator, ValidatorSpec};
pub use value::{FieldError, Value};

/// Prelude module for schema validation
pub mod prelude {
    pub use crate::config::SchemaConfig;
    pub use crate::error::SchemaError;
    pub use crate::report::{ErrorReport, FieldErrors};
    pub use crate::rule::PrimitiveType;
    pub use crate::schema::Schema;
    pub use crate::validation::{Review, Validation};
    pub use crate::validators::Validator;
    pub use crate::value::Value;
}
