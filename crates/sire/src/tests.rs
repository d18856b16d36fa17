//! Property-based tests for validation runs.

#[cfg(test)]
mod property_tests {
    use crate::config::SchemaConfig;
    use crate::schema::Schema;
    use proptest::prelude::*;
    use serde_json::{json, Map, Value as Json};

    // Raw input for an int field: valid digits, junk, or missing
    fn int_input_strategy() -> impl Strategy<Value = Option<Json>> {
        prop_oneof![
            Just(None),
            any::<i32>().prop_map(|n| Some(json!(n.to_string()))),
            any::<i32>().prop_map(|n| Some(json!(n))),
            "[a-z]{1,8}".prop_map(|s| Some(json!(s))),
        ]
    }

    fn text_input_strategy() -> impl Strategy<Value = Option<Json>> {
        prop_oneof![
            Just(None),
            Just(Some(json!(""))),
            "[a-zA-Z <>&]{1,20}".prop_map(|s| Some(json!(s))),
        ]
    }

    fn record_strategy() -> impl Strategy<Value = Json> {
        (int_input_strategy(), text_input_strategy(), text_input_strategy()).prop_map(
            |(number, text, inner)| {
                let mut record = Map::new();
                if let Some(number) = number {
                    record.insert("number".to_string(), number);
                }
                if let Some(text) = text {
                    record.insert("text".to_string(), text);
                }
                if let Some(inner) = inner {
                    record.insert("sub".to_string(), json!({"inner": inner}));
                }
                Json::Object(record)
            },
        )
    }

    fn record_schema(config: SchemaConfig) -> Schema {
        let mut sub = Schema::new(SchemaConfig::default().title("Sub"));
        sub.add("inner", "text", &["required"]).unwrap();

        let mut schema = Schema::new(config);
        schema.add("number", "int", &["max:1000"]).unwrap();
        schema.add("text", "text", &["required", "minlen:2"]).unwrap();
        schema.add("flag", "bool", &[]).unwrap();
        schema.add("sub", sub, &[]).unwrap();
        schema
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // values() is computed once and does not drift
        #[test]
        fn values_are_idempotent(record in record_strategy()) {
            let validation = record_schema(SchemaConfig::default()).validate(&record).unwrap();
            let first = validation.values().clone();
            prop_assert_eq!(&first, validation.values());
            let pristine = validation.pristine_values().clone();
            prop_assert_eq!(&pristine, validation.pristine_values());
        }

        // Integers survive coercion and keep their original input
        #[test]
        fn int_round_trip(n in any::<i64>()) {
            let mut schema = Schema::default();
            schema.add("n", "int", &[]).unwrap();
            let input = json!({"n": n.to_string()});

            let validation = schema.validate(&input).unwrap();
            prop_assert!(validation.is_valid());
            prop_assert_eq!(&validation.values()["n"], &json!(n));
            prop_assert_eq!(&validation.pristine_values()["n"], &input["n"]);
        }

        // Missing declared fields default to null, bool fields to false
        #[test]
        fn absent_fields_default(record in record_strategy()) {
            let validation = record_schema(SchemaConfig::default()).validate(&record).unwrap();
            let values = validation.values();

            prop_assert_eq!(&values["flag"], &json!(false));
            for field in ["number", "text", "sub"] {
                if record.get(field).is_none() {
                    prop_assert_eq!(&values[field], &Json::Null);
                    prop_assert_eq!(&validation.pristine_values()[field], &Json::Null);
                }
            }
        }

        // Validity matches the error list, and grouping never loses entries
        #[test]
        fn grouped_count_matches_flat(records in prop::collection::vec(record_strategy(), 0..6)) {
            let schema = record_schema(SchemaConfig::default().list(true).title("Root"));
            let validation = schema.validate(&Json::Array(records.clone())).unwrap();

            let flat = validation.errors(false);
            let grouped = validation.errors(true);
            prop_assert_eq!(validation.is_valid(), flat.entries().is_empty());
            prop_assert_eq!(flat.len(), grouped.len());
            prop_assert_eq!(flat.len(), validation.error_count());

            let groups = grouped.groups().unwrap();
            let keys: Vec<String> = groups
                .iter()
                .map(|g| format!("{}{}", g.level, g.title.as_deref().unwrap_or("")))
                .collect();
            let mut sorted = keys.clone();
            sorted.sort();
            prop_assert_eq!(keys, sorted);

            prop_assert_eq!(validation.values().as_array().map(Vec::len), Some(records.len()));
        }

        // Only indexes with errors appear in the map of a list run
        #[test]
        fn list_map_only_holds_failing_items(records in prop::collection::vec(record_strategy(), 1..6)) {
            let schema = record_schema(SchemaConfig::default().list(true));
            let validation = schema.validate(&Json::Array(records)).unwrap();
            let report = validation.errors(false);

            for index in report.map.item_indexes() {
                prop_assert!(report.entries().iter().any(|e| e.item == Some(index)
                    || report.map.item_field(index, "sub").is_some()));
            }
        }
    }
}
