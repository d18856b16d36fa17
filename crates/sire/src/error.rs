//! Schema definition errors.
//!
//! These are programmer mistakes in a schema *definition* (an empty field
//! name, a type tag nobody knows, a validator that was never registered).
//! They abort the calling code path. Bad input *data* never produces a
//! `SchemaError`; it is collected in a [`Validation`](crate::Validation).

use thiserror::Error;

/// Result type alias for schema operations.
pub type Result<T, E = SchemaError> = std::result::Result<T, E>;

/// Fatal error raised while defining or running a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A rule was declared with an empty field name.
    #[error("Schema definition error: field must not be empty")]
    EmptyField,

    /// A rule was declared with a type tag that is not recognised.
    #[error("Wrong schema type: '{0}'")]
    UnknownType(String),

    /// A rule references a validator that is not registered on the schema.
    #[error("Unknown validator '{name}' on field '{field}'")]
    UnknownValidator {
        /// The field the validator spec belongs to
        field: String,
        /// The validator name as written in the spec
        name: String,
    },

    /// A validator spec string was empty.
    #[error("Empty validator spec on field '{0}'")]
    EmptyValidator(String),

    /// The payload handed to `validate` has the wrong top-level shape.
    #[error("Invalid payload: expected {expected}")]
    InvalidPayload {
        /// Human readable description of the expected shape
        expected: &'static str,
    },

    /// Schema configuration could not be deserialized.
    #[error("Invalid schema configuration: {0}")]
    Config(#[from] serde_json::Error),
}
