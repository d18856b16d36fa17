//! Error report produced by a validation run.
//!
//! Errors are kept in two projections of the same set: a linear list with
//! section metadata (title, nesting level, list item) and a keyed map for
//! direct lookup by field and list index.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single entry of the linear error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// Interpolated message
    pub error: String,
    /// Field name the error belongs to
    pub field: String,
    /// Display label of the field
    pub label: String,
    /// Title of the schema that recorded the error
    pub title: Option<String>,
    /// Nesting level of that schema, starting at 1
    pub level: usize,
    /// List index when recorded by a list-mode schema
    pub item: Option<usize>,
}

/// Errors recorded for one field in the error map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldErrors {
    /// Messages from coercion and validators, in recording order
    Messages(Vec<String>),
    /// A failed sub-schema field
    ///
    /// Serializes as `{"map": {...}, "messages": [...]}`.
    Nested {
        /// The map of the sub-schema run
        map: ErrorMap,
        /// Messages recorded on the field itself, e.g. by its validators
        messages: Vec<String>,
    },
}

impl FieldErrors {
    /// Messages recorded directly on this field.
    pub fn messages(&self) -> &[String] {
        match self {
            FieldErrors::Messages(messages) => messages,
            FieldErrors::Nested { messages, .. } => messages,
        }
    }

    /// The nested map of a sub-schema field.
    pub fn nested(&self) -> Option<&ErrorMap> {
        match self {
            FieldErrors::Messages(_) => None,
            FieldErrors::Nested { map, .. } => Some(map),
        }
    }

    /// First message, if any.
    pub fn first(&self) -> Option<&str> {
        self.messages().first().map(String::as_str)
    }
}

type FieldMap = IndexMap<String, FieldErrors>;

/// Errors keyed by field, and by list index for list-mode schemas.
///
/// A record map serializes as one JSON object keyed by field. A list map
/// serializes item indexes as string keys and nests record-level errors
/// (recorded by a review function) under `"fields"`, so a field named
/// like an index cannot clash with an item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMap {
    list: bool,
    fields: FieldMap,
    items: BTreeMap<usize, FieldMap>,
}

impl ErrorMap {
    /// Create an empty map for a single record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map for a list of records.
    pub fn list() -> Self {
        Self {
            list: true,
            ..Self::default()
        }
    }

    /// Whether the map belongs to a list-mode run.
    pub fn is_list(&self) -> bool {
        self.list
    }

    /// Errors of a record-level field.
    pub fn field(&self, field: &str) -> Option<&FieldErrors> {
        self.fields.get(field)
    }

    /// Errors of all fields of one list item.
    pub fn item(&self, index: usize) -> Option<&IndexMap<String, FieldErrors>> {
        self.items.get(&index)
    }

    /// Errors of one field of one list item.
    pub fn item_field(&self, index: usize, field: &str) -> Option<&FieldErrors> {
        self.items.get(&index).and_then(|fields| fields.get(field))
    }

    /// Indexes of list items that have errors.
    pub fn item_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.items.keys().copied()
    }

    /// Names of record-level fields that have errors.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Number of messages, nested maps included.
    pub fn len(&self) -> usize {
        fn count(fields: &FieldMap) -> usize {
            fields
                .values()
                .map(|errors| {
                    errors.messages().len() + errors.nested().map_or(0, ErrorMap::len)
                })
                .sum()
        }

        count(&self.fields) + self.items.values().map(count).sum::<usize>()
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.items.is_empty()
    }

    fn slot(&mut self, item: Option<usize>) -> &mut FieldMap {
        match item {
            Some(index) => self.items.entry(index).or_default(),
            None => &mut self.fields,
        }
    }

    /// Append a message for a field.
    ///
    /// On a sub-schema field the message is kept next to the nested map.
    pub(crate) fn push_message(&mut self, item: Option<usize>, field: &str, message: String) {
        let entry = self
            .slot(item)
            .entry(field.to_string())
            .or_insert_with(|| FieldErrors::Messages(Vec::new()));

        match entry {
            FieldErrors::Messages(messages) | FieldErrors::Nested { messages, .. } => {
                messages.push(message)
            }
        }
    }

    /// Nest a sub-schema map under a field, keeping messages already there.
    pub(crate) fn set_nested(&mut self, item: Option<usize>, field: &str, map: ErrorMap) {
        let entry = self
            .slot(item)
            .entry(field.to_string())
            .or_insert_with(|| FieldErrors::Messages(Vec::new()));

        let messages = match entry {
            FieldErrors::Messages(messages) | FieldErrors::Nested { messages, .. } => {
                std::mem::take(messages)
            }
        };
        *entry = FieldErrors::Nested { map, messages };
    }
}

impl Serialize for ErrorMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if !self.list {
            let mut map = serializer.serialize_map(Some(self.fields.len()))?;
            for (field, errors) in &self.fields {
                map.serialize_entry(field, errors)?;
            }
            return map.end();
        }

        let record_level = usize::from(!self.fields.is_empty());
        let mut map = serializer.serialize_map(Some(self.items.len() + record_level))?;
        for (index, fields) in &self.items {
            map.serialize_entry(index, fields)?;
        }
        if !self.fields.is_empty() {
            map.serialize_entry("fields", &self.fields)?;
        }
        map.end()
    }
}

/// Errors of one `(level, title)` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorGroup {
    /// Section title
    pub title: Option<String>,
    /// Section nesting level
    pub level: usize,
    /// Entries in recording order
    pub errors: Vec<ErrorEntry>,
}

/// Either the linear list or the grouped sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportErrors {
    /// Linear list in recording order
    Flat(Vec<ErrorEntry>),
    /// Sections ordered by level and title
    Grouped(Vec<ErrorGroup>),
}

/// The complete error report of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Whether the schema validated a list of records
    pub is_list: bool,
    /// Schema title
    pub title: Option<String>,
    /// Keyed projection
    pub map: ErrorMap,
    /// Whether `errors` is grouped
    pub grouped: bool,
    /// Linear or grouped projection
    pub errors: ReportErrors,
}

impl ErrorReport {
    /// Linear entries, or an empty slice for grouped reports.
    pub fn entries(&self) -> &[ErrorEntry] {
        match &self.errors {
            ReportErrors::Flat(entries) => entries,
            ReportErrors::Grouped(_) => &[],
        }
    }

    /// Sections of a grouped report.
    pub fn groups(&self) -> Option<&[ErrorGroup]> {
        match &self.errors {
            ReportErrors::Flat(_) => None,
            ReportErrors::Grouped(groups) => Some(groups),
        }
    }

    /// Total number of error entries.
    pub fn len(&self) -> usize {
        match &self.errors {
            ReportErrors::Flat(entries) => entries.len(),
            ReportErrors::Grouped(groups) => groups.iter().map(|g| g.errors.len()).sum(),
        }
    }

    /// Check if the report holds no errors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{}: {} error(s)", title, self.len()),
            None => write!(f, "Validation failed: {} error(s)", self.len()),
        }
    }
}

/// Bucket entries by `(level, title)`.
///
/// Buckets are ordered by the string `"{level}{title}"`; entries keep their
/// recording order inside a bucket.
pub(crate) fn group_entries(entries: &[ErrorEntry]) -> Vec<ErrorGroup> {
    let mut sections: Vec<(usize, Option<String>)> = Vec::new();
    for entry in entries {
        let key = (entry.level, entry.title.clone());
        if !sections.contains(&key) {
            sections.push(key);
        }
    }

    sections.sort_by_cached_key(|(level, title)| {
        format!("{}{}", level, title.as_deref().unwrap_or(""))
    });

    sections
        .into_iter()
        .map(|(level, title)| ErrorGroup {
            errors: entries
                .iter()
                .filter(|e| e.level == level && e.title == title)
                .cloned()
                .collect(),
            title,
            level,
        })
        .collect()
}
