//! The unit flowing through a validation run.

use crate::report::ErrorReport;
use serde::Serialize;
use serde_json::Value as Json;

/// Error payload attached to a [`Value`].
///
/// Primitive fields carry a message; sub-schema fields carry the complete
/// report of the nested run so it can be rendered per subsection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldError {
    /// A single interpolated message
    Message(String),
    /// The nested schema's report
    Report(Box<ErrorReport>),
}

/// A coerced value together with the original input it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    coerced: Json,
    pristine: Json,
    error: Option<FieldError>,
}

impl Value {
    /// Create a value without an error.
    pub fn new(coerced: Json, pristine: Json) -> Self {
        Self {
            coerced,
            pristine,
            error: None,
        }
    }

    /// Create a value carrying an error.
    pub fn with_error(coerced: Json, pristine: Json, error: FieldError) -> Self {
        Self {
            coerced,
            pristine,
            error: Some(error),
        }
    }

    /// Create a value that failed coercion with a message.
    ///
    /// The coerced slot keeps the original input.
    pub fn invalid(pristine: Json, message: impl Into<String>) -> Self {
        Self::with_error(
            pristine.clone(),
            pristine,
            FieldError::Message(message.into()),
        )
    }

    /// The value after type conversion.
    pub fn coerced(&self) -> &Json {
        &self.coerced
    }

    /// The original input.
    pub fn pristine(&self) -> &Json {
        &self.pristine
    }

    /// The error recorded while producing this value, if any.
    pub fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }

    /// Whether the coerced value counts as empty for skip-if-empty validators.
    pub fn is_empty(&self) -> bool {
        is_empty(&self.coerced)
    }
}

/// String form of a scalar JSON value.
///
/// `null` and `false` become `""`, `true` becomes `"1"`, numbers print
/// without a trailing `.0`. Arrays and objects have no string form.
pub(crate) fn string_form(value: &Json) -> Option<String> {
    match value {
        Json::Null => Some(String::new()),
        Json::Bool(true) => Some("1".to_string()),
        Json::Bool(false) => Some(String::new()),
        Json::Number(n) => Some(number_form(n)),
        Json::String(s) => Some(s.clone()),
        Json::Array(_) | Json::Object(_) => None,
    }
}

fn number_form(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}

/// Zero-element array/object, or a zero-length string form.
pub(crate) fn is_empty(value: &Json) -> bool {
    match value {
        Json::Array(items) => items.is_empty(),
        Json::Object(map) => map.is_empty(),
        other => string_form(other).map_or(true, |s| s.is_empty()),
    }
}

/// Loose numeric reading used by the bound validators.
///
/// Non-numeric strings read as `0.0`, like a C-style `atof`.
pub(crate) fn as_float(value: &Json) -> f64 {
    match value {
        Json::Number(n) => n.as_f64().unwrap_or(0.0),
        Json::Bool(b) => f64::from(u8::from(*b)),
        Json::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
