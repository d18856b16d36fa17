//! Construction-time schema configuration.
//!
//! ```rust
//! use sire::SchemaConfig;
//!
//! let config = SchemaConfig::from_json(r#"{"list": true, "keepUnknown": true}"#).unwrap();
//! assert!(config.list);
//! assert!(config.keep_unknown);
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Configuration of a [`Schema`](crate::Schema).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaConfig {
    /// Validate a sequence of records instead of a single record
    #[serde(alias = "list_mode", alias = "listMode")]
    pub list: bool,
    /// Pass input keys without a rule through untyped
    #[serde(alias = "keep_unknown", alias = "keepUnknownFields")]
    pub keep_unknown: bool,
    /// Locales for message localization; carried, not interpreted
    pub locales: Vec<String>,
    /// Section title used when grouping errors
    pub title: Option<String>,
}

impl SchemaConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set list mode.
    pub fn list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }

    /// Keep or drop unknown input keys.
    pub fn keep_unknown(mut self, keep: bool) -> Self {
        self.keep_unknown = keep;
        self
    }

    /// Set the locales.
    pub fn locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locales = locales.into_iter().map(Into::into).collect();
        self
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
