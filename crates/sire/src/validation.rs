//! A single validation run.
//!
//! Each run reads every record of the payload (coercing declared fields and
//! delegating sub-schema fields one level deeper), fills in missing
//! declared fields, runs the validator chains and finally, when nothing
//! failed, the schema's review function.

use crate::coerce;
use crate::error::Result;
use crate::message::interpolate;
use crate::report::{group_entries, ErrorEntry, ErrorMap, ErrorReport, ReportErrors};
use crate::rule::{FieldType, Rule};
use crate::schema::Schema;
use crate::value::{string_form, FieldError, Value};
use indexmap::IndexMap;
use serde_json::{Map, Value as Json};
use std::sync::OnceLock;
use tracing::{debug, trace};

type Record = IndexMap<String, Value>;

/// Outcome of [`Schema::validate`].
#[derive(Debug, Clone)]
pub struct Validation {
    is_list: bool,
    title: Option<String>,
    level: usize,
    records: Vec<Record>,
    error_list: Vec<ErrorEntry>,
    error_map: ErrorMap,
    values: OnceLock<Json>,
    pristine: OnceLock<Json>,
}

/// Run `schema` over `data` at `level`.
///
/// `Ok(None)` means the payload does not have the shape the schema expects.
/// Validator names are not checked here; callers do that once up front.
pub(crate) fn run(schema: &Schema, data: &Json, level: usize) -> Result<Option<Validation>> {
    let Some(inputs) = records_of(schema.is_list(), data) else {
        return Ok(None);
    };

    let level = level.max(1);
    debug!(
        title = ?schema.title(),
        level,
        list = schema.is_list(),
        records = inputs.len(),
        "validation started"
    );

    let mut validation = Validation {
        is_list: schema.is_list(),
        title: schema.title().map(str::to_string),
        level,
        records: Vec::new(),
        error_list: Vec::new(),
        error_map: if schema.is_list() {
            ErrorMap::list()
        } else {
            ErrorMap::new()
        },
        values: OnceLock::new(),
        pristine: OnceLock::new(),
    };

    let mut records = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let item = validation.is_list.then_some(index);
        records.push(validation.read(schema, input, item)?);
    }

    for (index, record) in records.iter().enumerate() {
        let item = validation.is_list.then_some(index);
        validation.check(schema, record, item);
    }
    validation.records = records;

    if validation.error_list.is_empty() {
        if let Some(review) = schema.review_fn() {
            review(&mut Review {
                schema,
                validation: &mut validation,
            });
        }
    }

    debug!(
        title = ?schema.title(),
        level,
        errors = validation.error_list.len(),
        "validation finished"
    );

    Ok(Some(validation))
}

fn records_of(list: bool, data: &Json) -> Option<Vec<&Map<String, Json>>> {
    match (list, data) {
        (false, Json::Object(map)) => Some(vec![map]),
        (true, Json::Array(items)) => items.iter().map(Json::as_object).collect(),
        _ => None,
    }
}

impl Validation {
    /// Read and fill one record.
    fn read(
        &mut self,
        schema: &Schema,
        input: &Map<String, Json>,
        item: Option<usize>,
    ) -> Result<Record> {
        let mut record = Record::with_capacity(input.len());

        for (field, raw) in input {
            let value = match schema.rule(field) {
                Some(rule) => self.coerce(schema, rule, raw, item)?,
                None if schema.config().keep_unknown => Value::new(raw.clone(), raw.clone()),
                None => continue,
            };
            record.insert(field.clone(), value);
        }

        for rule in schema.rules() {
            if !record.contains_key(rule.field()) {
                let coerced = if rule.field_type().is_bool() {
                    Json::Bool(false)
                } else {
                    Json::Null
                };
                record.insert(rule.field().to_string(), Value::new(coerced, Json::Null));
            }
        }

        Ok(record)
    }

    fn coerce(
        &mut self,
        schema: &Schema,
        rule: &Rule,
        raw: &Json,
        item: Option<usize>,
    ) -> Result<Value> {
        let value = match rule.field_type() {
            FieldType::Primitive(primitive, args) => {
                coerce::coerce(*primitive, args, raw, rule.name(), schema.messages())
            }
            FieldType::Nested(sub) => return self.delegate(schema, rule, sub, raw, item),
        };

        if let Some(FieldError::Message(message)) = value.error() {
            self.add_error(rule.field(), rule.name(), message.clone(), item);
        }

        Ok(value)
    }

    /// Validate a sub-schema field one level deeper and merge its errors.
    fn delegate(
        &mut self,
        schema: &Schema,
        rule: &Rule,
        sub: &Schema,
        raw: &Json,
        item: Option<usize>,
    ) -> Result<Value> {
        let Some(nested) = run(sub, raw, self.level + 1)? else {
            let message = schema.messages().coercion("schema", rule.name());
            self.add_error(rule.field(), rule.name(), message.clone(), item);
            return Ok(Value::invalid(raw.clone(), message));
        };

        if nested.is_valid() {
            return Ok(Value::new(nested.values().clone(), raw.clone()));
        }

        let report = nested.errors(false);
        self.error_list.extend(nested.error_list);
        self.error_map.set_nested(item, rule.field(), nested.error_map);

        Ok(Value::with_error(
            raw.clone(),
            raw.clone(),
            FieldError::Report(Box::new(report)),
        ))
    }

    /// Run the validator chains of every rule against one record.
    fn check(&mut self, schema: &Schema, record: &Record, item: Option<usize>) {
        for rule in schema.rules() {
            let Some(value) = record.get(rule.field()) else {
                continue;
            };

            for spec in rule.validators() {
                let Some(validator) = schema.validator(spec.name()) else {
                    continue;
                };

                if validator.skip_if_empty() && value.is_empty() {
                    continue;
                }
                if validator.validate(value, spec.args()) {
                    continue;
                }

                let pristine = string_form(value.pristine())
                    .unwrap_or_else(|| value.pristine().to_string());
                let mut slots = vec![rule.name().to_string(), rule.field().to_string(), pristine];
                slots.extend(spec.args().iter().cloned());

                let message = interpolate(validator.message(), &slots);
                self.add_error(rule.field(), rule.name(), message, item);
            }
        }
    }

    fn add_error(&mut self, field: &str, label: &str, message: String, item: Option<usize>) {
        trace!(field, level = self.level, ?item, error = %message, "field error");

        self.error_map.push_message(item, field, message.clone());
        self.error_list.push(ErrorEntry {
            error: message,
            field: field.to_string(),
            label: label.to_string(),
            title: self.title.clone(),
            level: self.level,
            item,
        });
    }

    /// Whether no errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.error_list.is_empty()
    }

    /// Number of recorded errors, nested ones included.
    pub fn error_count(&self) -> usize {
        self.error_list.len()
    }

    /// Nesting level of the run, starting at 1.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Whether a list of records was validated.
    pub fn is_list(&self) -> bool {
        self.is_list
    }

    /// Title of the schema that ran.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Build the error report, optionally grouped by `(level, title)`.
    pub fn errors(&self, grouped: bool) -> ErrorReport {
        let errors = if grouped {
            ReportErrors::Grouped(group_entries(&self.error_list))
        } else {
            ReportErrors::Flat(self.error_list.clone())
        };

        ErrorReport {
            is_list: self.is_list,
            title: self.title.clone(),
            map: self.error_map.clone(),
            grouped,
            errors,
        }
    }

    /// Coerced values: an object, or an array of objects in list mode.
    ///
    /// Computed on first access.
    pub fn values(&self) -> &Json {
        self.values
            .get_or_init(|| project(&self.records, self.is_list, Value::coerced))
    }

    /// Original input values, shaped like [`values`](Self::values).
    pub fn pristine_values(&self) -> &Json {
        self.pristine
            .get_or_init(|| project(&self.records, self.is_list, Value::pristine))
    }

    /// The value of a field of a single-record run.
    pub fn value(&self, field: &str) -> Option<&Value> {
        if self.is_list {
            return None;
        }
        self.records.first().and_then(|record| record.get(field))
    }

    /// The value of a field of one list item.
    pub fn item_value(&self, index: usize, field: &str) -> Option<&Value> {
        if !self.is_list {
            return None;
        }
        self.records.get(index).and_then(|record| record.get(field))
    }
}

fn project(records: &[Record], is_list: bool, side: fn(&Value) -> &Json) -> Json {
    let mut objects = records.iter().map(|record| {
        Json::Object(
            record
                .iter()
                .map(|(field, value)| (field.clone(), side(value).clone()))
                .collect(),
        )
    });

    if is_list {
        Json::Array(objects.collect())
    } else {
        objects.next().unwrap_or_else(|| Json::Object(Map::new()))
    }
}

/// Access handed to a schema's review function.
///
/// Reads the validated values and records errors through the same path as
/// field validation.
pub struct Review<'a> {
    schema: &'a Schema,
    validation: &'a mut Validation,
}

impl Review<'_> {
    /// Coerced values of the run.
    pub fn values(&self) -> &Json {
        self.validation.values()
    }

    /// Original input values of the run.
    pub fn pristine_values(&self) -> &Json {
        self.validation.pristine_values()
    }

    /// Whether the run validated a list.
    pub fn is_list(&self) -> bool {
        self.validation.is_list
    }

    /// Nesting level of the run.
    pub fn level(&self) -> usize {
        self.validation.level
    }

    /// Record an error on a field.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        let label = self.label(field);
        self.validation
            .add_error(field, &label, message.into(), None);
    }

    /// Record an error on a field of one list item.
    pub fn add_item_error(&mut self, index: usize, field: &str, message: impl Into<String>) {
        let label = self.label(field);
        self.validation
            .add_error(field, &label, message.into(), Some(index));
    }

    fn label(&self, field: &str) -> String {
        self.schema
            .rule(field)
            .map_or(field, Rule::name)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::report::FieldErrors;
    use serde_json::json;

    #[test]
    fn missing_fields_are_filled() {
        let mut schema = Schema::default();
        schema.add("text", "text", &[]).unwrap();
        schema.add("flag", "bool", &[]).unwrap();

        let validation = schema.validate(&json!({})).unwrap();
        assert!(validation.is_valid());
        assert_eq!(validation.values(), &json!({"text": null, "flag": false}));
        assert_eq!(validation.pristine_values(), &json!({"text": null, "flag": null}));
    }

    #[test]
    fn unknown_fields() {
        let mut schema = Schema::default();
        schema.add("a", "int", &[]).unwrap();
        let data = json!({"a": "1", "extra": ["x"]});

        let validation = schema.validate(&data).unwrap();
        assert_eq!(validation.values(), &json!({"a": 1}));
        assert_eq!(validation.pristine_values(), &json!({"a": "1"}));

        let mut schema = Schema::new(SchemaConfig::default().keep_unknown(true));
        schema.add("a", "int", &[]).unwrap();
        let validation = schema.validate(&data).unwrap();
        assert_eq!(validation.values(), &json!({"a": 1, "extra": ["x"]}));
        assert_eq!(validation.pristine_values()["extra"], json!(["x"]));
    }

    #[test]
    fn empty_values_skip_optional_validators() {
        let mut schema = Schema::default();
        schema.add("email", "text", &["email", "minlen:3"]).unwrap();
        schema.add("name", "text", &["required"]).unwrap();

        let validation = schema.validate(&json!({"email": ""})).unwrap();
        assert_eq!(validation.error_count(), 1);
        assert_eq!(validation.errors(false).entries()[0].field, "name");
    }

    #[test]
    fn validator_messages_fill_slots() {
        let mut schema = Schema::default();
        schema.set_message("min", "{1} ({2}) is {3}, below {4}");
        schema.add("age", "int", &["min:18"]).unwrap().label("Age");

        let validation = schema.validate(&json!({"age": "7"})).unwrap();
        let report = validation.errors(false);
        assert_eq!(report.entries()[0].error, "Age (age) is 7, below 18");
        assert_eq!(report.entries()[0].label, "Age");
    }

    #[test]
    fn coercion_and_validator_errors_accumulate() {
        let mut schema = Schema::default();
        schema.add("n", "int", &["min:100"]).unwrap();

        let validation = schema.validate(&json!({"n": "12x"})).unwrap();
        let messages = validation
            .errors(false)
            .map
            .field("n")
            .map(|e| e.messages().to_vec())
            .unwrap();
        assert_eq!(messages[0], "Invalid number");
        assert_eq!(validation.error_count(), messages.len());
    }

    #[test]
    fn review_only_runs_without_field_errors() {
        let schema = Schema::builder()
            .rules(|s| {
                s.add("a", "int", &["required"])?;
                Ok(())
            })
            .review(|review| review.add_error("a", "Reviewed"))
            .build()
            .unwrap();

        let validation = schema.validate(&json!({})).unwrap();
        assert_eq!(validation.error_count(), 1);
        assert_eq!(validation.errors(false).entries()[0].error, "Required");

        let validation = schema.validate(&json!({"a": 1})).unwrap();
        assert_eq!(validation.error_count(), 1);
        assert_eq!(validation.errors(false).entries()[0].error, "Reviewed");
    }

    #[test]
    fn review_sees_values_and_can_flag_items() {
        let schema = Schema::builder()
            .list()
            .rules(|s| {
                s.add("n", "int", &[])?.label("Number");
                Ok(())
            })
            .review(|review| {
                let total: i64 = review
                    .values()
                    .as_array()
                    .map(|rows| rows.iter().filter_map(|r| r["n"].as_i64()).sum())
                    .unwrap_or_default();
                if total > 10 {
                    review.add_item_error(1, "n", "Sum too large");
                    review.add_error("rows", "Check the rows");
                }
            })
            .build()
            .unwrap();

        let validation = schema.validate(&json!([{"n": 5}, {"n": "6"}])).unwrap();
        assert!(!validation.is_valid());

        let report = validation.errors(false);
        assert_eq!(report.entries()[0].item, Some(1));
        assert_eq!(report.entries()[0].label, "Number");
        assert_eq!(
            report.map.item_field(1, "n").and_then(FieldErrors::first),
            Some("Sum too large")
        );
        assert_eq!(
            report.map.field("rows").and_then(FieldErrors::first),
            Some("Check the rows")
        );
    }

    #[test]
    fn record_error_named_like_an_item_stays_apart() {
        let schema = Schema::builder()
            .list()
            .rules(|s| {
                s.add("n", "int", &[])?;
                Ok(())
            })
            .review(|review| {
                review.add_item_error(0, "n", "Too small");
                review.add_error("0", "First row is off");
            })
            .build()
            .unwrap();

        let validation = schema.validate(&json!([{"n": 1}])).unwrap();
        let report = validation.errors(false);
        assert!(report.map.is_list());

        let text = serde_json::to_string(&report.map).unwrap();
        assert_eq!(
            text,
            r#"{"0":{"n":["Too small"]},"fields":{"0":["First row is off"]}}"#
        );
    }

    #[test]
    fn nested_success_keeps_raw_pristine() {
        let mut sub = Schema::default();
        sub.add("n", "int", &[]).unwrap();
        let mut schema = Schema::default();
        schema.add("sub", sub, &[]).unwrap();

        let validation = schema.validate(&json!({"sub": {"n": "3"}})).unwrap();
        assert!(validation.is_valid());
        assert_eq!(validation.values(), &json!({"sub": {"n": 3}}));
        assert_eq!(validation.pristine_values(), &json!({"sub": {"n": "3"}}));
    }

    #[test]
    fn nested_failure_carries_report() {
        let mut sub = Schema::new(SchemaConfig::default().title("Sub"));
        sub.add("n", "int", &["required"]).unwrap();
        let mut schema = Schema::default();
        schema.add("sub", sub, &[]).unwrap();

        let validation = schema.validate(&json!({"sub": {}})).unwrap();
        assert_eq!(validation.error_count(), 1);

        let value = validation.value("sub").unwrap();
        assert_eq!(value.coerced(), &json!({}));
        match value.error() {
            Some(FieldError::Report(report)) => {
                assert_eq!(report.title.as_deref(), Some("Sub"));
                assert_eq!(report.len(), 1);
            }
            other => panic!("expected nested report, got {:?}", other),
        }

        let errors = validation.errors(false);
        let entry = &errors.entries()[0];
        assert_eq!(entry.level, 2);
        assert_eq!(entry.title.as_deref(), Some("Sub"));
    }

    #[test]
    fn nested_shape_mismatch_is_a_data_error() {
        let mut sub = Schema::default();
        sub.add("n", "int", &[]).unwrap();
        let mut schema = Schema::default();
        schema.add("sub", sub, &[]).unwrap().label("Sub");

        let validation = schema.validate(&json!({"sub": "flat"})).unwrap();
        let report = validation.errors(false);
        assert_eq!(report.entries()[0].error, "Invalid value");
        assert_eq!(report.entries()[0].level, 1);
        assert_eq!(validation.values()["sub"], json!("flat"));
    }

    #[test]
    fn values_are_cached() {
        let mut schema = Schema::default();
        schema.add("a", "float", &[]).unwrap();
        let validation = schema.validate(&json!({"a": "1.5"})).unwrap();
        let first = validation.values() as *const Json;
        let second = validation.values() as *const Json;
        assert_eq!(first, second);
    }

    #[test]
    fn list_runs_have_one_entry_per_record() {
        let mut schema = Schema::list();
        schema.add("a", "int", &[]).unwrap();

        let validation = schema.validate(&json!([{"a": "1"}, {}])).unwrap();
        assert_eq!(validation.values(), &json!([{"a": 1}, {"a": null}]));
        assert_eq!(validation.item_value(0, "a").map(Value::pristine), Some(&json!("1")));
        assert!(validation.value("a").is_none());

        let validation = schema.validate(&json!([])).unwrap();
        assert_eq!(validation.values(), &json!([]));
    }
}
