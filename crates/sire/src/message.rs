//! Message catalog and placeholder interpolation.
//!
//! Templates use positional slots:
//!
//! - `{1}` the field label
//! - `{2}` the field name
//! - `{3}` the pristine value
//! - `{4}`, `{5}`, ... the validator arguments
//!
//! Coercion messages only receive the label slot.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

static SLOT_REGEX: OnceLock<Regex> = OnceLock::new();

fn slot_regex() -> &'static Regex {
    SLOT_REGEX.get_or_init(|| Regex::new(r"\{(\d+)\}").expect("slot pattern is valid"))
}

const DEFAULTS: &[(&str, &str)] = &[
    // Types
    ("bool", "Invalid boolean"),
    ("int", "Invalid number"),
    ("float", "Invalid number"),
    ("list", "Invalid list"),
    ("text", "Invalid value"),
    ("schema", "Invalid value"),
    // Validators
    ("required", "Required"),
    ("email", "Invalid email address"),
    ("minlen", "Shorter than the minimum length of {4} characters"),
    ("maxlen", "Exceeds the maximum length of {4} characters"),
    ("min", "Lower than the required minimum of {4}"),
    ("max", "Higher than the allowed maximum of {4}"),
    ("regex", "Does not match the required pattern"),
    ("in", "Invalid value"),
];

/// Message templates keyed by type tag or validator name.
#[derive(Debug, Clone)]
pub struct Messages {
    templates: HashMap<String, String>,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            templates: DEFAULTS
                .iter()
                .map(|(key, template)| (key.to_string(), template.to_string()))
                .collect(),
        }
    }
}

impl Messages {
    /// The template for `key`, or an empty string when unknown.
    pub fn get(&self, key: &str) -> &str {
        self.templates.get(key).map(String::as_str).unwrap_or("")
    }

    /// Replace or add a template.
    pub fn set(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    /// Render the coercion message for a type with the field label.
    pub fn coercion(&self, key: &str, label: &str) -> String {
        interpolate(self.get(key), &[label])
    }
}

/// Replace `{n}` with `slots[n - 1]`.
///
/// Slots without a value render as an empty string.
pub fn interpolate<S: AsRef<str>>(template: &str, slots: &[S]) -> String {
    if !template.contains('{') {
        return template.to_string();
    }

    slot_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| slots.get(i))
                .map(|s| s.as_ref().to_string())
                .unwrap_or_default()
        })
        .into_owned()
}
