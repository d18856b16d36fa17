//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value as Json};
use sire::{MxResolver, Schema, SchemaConfig};

/// Resolver that knows MX records for a fixed set of domains.
#[derive(Debug)]
pub struct StaticDns(pub Vec<&'static str>);

impl MxResolver for StaticDns {
    fn has_mx(&self, domain: &str) -> bool {
        self.0.iter().any(|known| *known == domain)
    }
}

/// Two required fields: an int labelled "Int" and an email labelled "Email".
pub fn sub_schema(config: SchemaConfig) -> Schema {
    Schema::builder()
        .config(config)
        .rules(|s| {
            s.add("inner_int", "int", &["required"])?.label("Int");
            s.add("inner_email", "text", &["required", "email"])?
                .label("Email");
            Ok(())
        })
        .build()
        .unwrap()
}

/// List schema over records with a single and a list sub-schema.
pub fn list_schema() -> Schema {
    Schema::builder()
        .list()
        .title("List Root")
        .rules(|s| {
            s.add("int", "int", &["required"])?;
            s.add("text", "text", &["required"])?;
            s.add("email", "text", &["email", "minlen:10"])?;
            s.add(
                "single_schema",
                sub_schema(SchemaConfig::default().title("Single Sub")),
                &["required"],
            )?
            .label("Single Schema");
            s.add(
                "list_schema",
                sub_schema(SchemaConfig::default().title("List Sub").list(true)),
                &[],
            )?;
            Ok(())
        })
        .build()
        .unwrap()
}

/// Four records; only the third is valid.
pub fn list_data() -> Json {
    json!([
        {
            "int": 13,
            "email": "chuck@example.com",
            "single_schema": {
                "inner_email": "test@example.com"
            },
            "list_schema": [{
                "inner_int": 23,
                "inner_email": "test@example.com"
            }]
        },
        {
            "int": 73,
            "email": "chuck",
            "list_schema": [{
                "inner_int": 43,
                "inner_email": "test@example.com"
            }]
        },
        {
            "int": 23,
            "text": "Text 23",
            "single_schema": {
                "inner_int": 97,
                "inner_email": "test@example.com"
            },
            "list_schema": [{
                "inner_int": 83,
                "inner_email": "test@example.com"
            }]
        },
        {
            "int": 17,
            "text": "Text 2",
            "single_schema": {
                "inner_int": 23,
                "inner_email": "test INVALID example.com"
            },
            "list_schema": [{
                "inner_int": "invalid",
                "inner_email": "example@example.com"
            }, {
                "inner_int": 29,
                "inner_email": "example@example.com"
            }, {
                "inner_int": "37",
                "inner_email": "example INVALID example.com"
            }]
        }
    ])
}
