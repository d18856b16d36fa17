//! Validation throughput benchmarks
//!
//! Measures flat records, nested schemas and list runs of growing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value as Json};
use sire::{Schema, SchemaConfig};

fn address_schema() -> Schema {
    let mut schema = Schema::new(SchemaConfig::default().title("Address"));
    schema.add("street", "text", &["required", "maxlen:100"]).unwrap();
    schema.add("zip", "plain", &["required", "regex:/^[0-9]{5}$/"]).unwrap();
    schema.add("country", "text", &["in:de,at,ch"]).unwrap();
    schema
}

fn user_schema(list: bool) -> Schema {
    let mut schema = Schema::new(SchemaConfig::default().list(list).title("User"));
    schema.add("name", "text", &["required", "minlen:2"]).unwrap();
    schema.add("email", "text", &["required", "email"]).unwrap();
    schema.add("age", "int", &["min:18", "max:120"]).unwrap();
    schema.add("active", "bool", &[]).unwrap();
    schema.add("bio", "html", &["maxlen:500"]).unwrap();
    schema.add("address", address_schema(), &["required"]).unwrap();
    schema
}

fn user(n: usize, valid: bool) -> Json {
    json!({
        "name": format!("User {}", n),
        "email": if valid { format!("user{}@example.com", n) } else { "broken".to_string() },
        "age": if valid { "42" } else { "old" },
        "active": "yes",
        "bio": "<p>Hello <b>there</b><script>x()</script></p>",
        "address": {"street": "Main Street 1", "zip": "12345", "country": "de"}
    })
}

/// Benchmark single record validation
fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");
    let schema = user_schema(false);

    let valid = user(1, true);
    group.bench_function("valid", |b| {
        b.iter(|| schema.validate(black_box(&valid)).unwrap().is_valid())
    });

    let invalid = user(1, false);
    group.bench_function("invalid_grouped", |b| {
        b.iter(|| schema.validate(black_box(&invalid)).unwrap().errors(true))
    });

    group.finish();
}

/// Benchmark list runs
fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");
    let schema = user_schema(true);

    for size in [10, 100, 1000] {
        let data = Json::Array((0..size).map(|n| user(n, n % 10 != 0)).collect());
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let validation = schema.validate(black_box(data)).unwrap();
                validation.values().as_array().map(Vec::len)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record, bench_list);
criterion_main!(benches);
