//! Named validators and the validator-spec mini-grammar.
//!
//! A rule lists its validators as strings of the form `name(":" arg)*`,
//! e.g. `"required"`, `"minlen:3"`, `"in:red,green,blue"`. The `regex`
//! validator takes everything after the first colon as a single pattern,
//! since patterns may contain colons themselves.

mod builtin;

pub use builtin::{builtins, compile_pattern};
pub(crate) use builtin::email as email_validator;

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Type alias for validator predicates.
pub type PredicateFn = Arc<dyn Fn(&Value, &[String]) -> bool + Send + Sync>;

/// A named predicate with a message template.
#[derive(Clone)]
pub struct Validator {
    name: String,
    message: String,
    predicate: PredicateFn,
    skip_if_empty: bool,
    builtin: bool,
}

impl Validator {
    /// Create a validator.
    ///
    /// With `skip_if_empty` set the predicate is not consulted for empty
    /// values, so optional fields only get checked when present.
    pub fn new<F>(
        name: impl Into<String>,
        message: impl Into<String>,
        predicate: F,
        skip_if_empty: bool,
    ) -> Self
    where
        F: Fn(&Value, &[String]) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            predicate: Arc::new(predicate),
            skip_if_empty,
            builtin: false,
        }
    }

    pub(crate) fn into_builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    /// Replace the message template.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// The name used in validator specs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The message template.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether empty values bypass this validator.
    pub fn skip_if_empty(&self) -> bool {
        self.skip_if_empty
    }

    /// Whether this is one of the validators every schema starts with.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Run the predicate.
    pub fn validate(&self, value: &Value, args: &[String]) -> bool {
        (self.predicate)(value, args)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("skip_if_empty", &self.skip_if_empty)
            .field("builtin", &self.builtin)
            .finish_non_exhaustive()
    }
}

/// A parsed `name:arg1:arg2` validator spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSpec {
    name: String,
    args: Vec<String>,
}

impl ValidatorSpec {
    /// Parse a spec string. Returns `None` for an empty name.
    pub fn parse(spec: &str) -> Option<Self> {
        let (name, rest) = match spec.split_once(':') {
            Some((name, rest)) => (name, Some(rest)),
            None => (spec, None),
        };

        if name.is_empty() {
            return None;
        }

        let args = match rest {
            None => Vec::new(),
            Some(pattern) if name == "regex" => vec![pattern.to_string()],
            Some(rest) => rest.split(':').map(str::to_string).collect(),
        };

        Some(Self {
            name: name.to_string(),
            args,
        })
    }

    /// Validator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validator arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for ValidatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            write!(f, ":{}", arg)?;
        }
        Ok(())
    }
}
