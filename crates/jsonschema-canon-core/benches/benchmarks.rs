//! Criterion benchmarks for the jsonschema-canon-core normalizer.
//!
//! Fixtures are pre-parsed outside the benchmark loop to measure only the
//! normalization logic, not JSON parsing or file I/O.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use jsonschema_canon_core::{normalize, NormalizeOptions};

/// Load and parse a fixture schema from the shared test fixtures directory.
fn load_fixture(name: &str) -> Value {
    let fixtures_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/schemas");
    let path = Path::new(fixtures_dir).join(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

fn bench_normalize_fixtures(c: &mut Criterion) {
    let options = NormalizeOptions::default();
    for name in ["product.json", "job_draft7.json", "settings.json"] {
        let schema = load_fixture(name);
        c.bench_function(&format!("normalize/{name}"), |b| {
            b.iter(|| normalize(black_box(&schema), black_box(&options)).unwrap())
        });
    }
}

fn bench_normalize_canonical_input(c: &mut Criterion) {
    // Already canonical: measures a full scan with no rewrites.
    let options = NormalizeOptions::default();
    let schema = normalize(&load_fixture("product.json"), &options).unwrap().schema;

    c.bench_function("normalize/product_canonical", |b| {
        b.iter(|| normalize(black_box(&schema), black_box(&options)).unwrap())
    });
}

fn bench_all_of_chain(c: &mut Criterion) {
    let options = NormalizeOptions::default();
    let mut group = c.benchmark_group("normalize/allOf_chain");
    for depth in [10usize, 100] {
        let schema = (0..depth).fold(json!({ "type": "string" }), |inner, _| json!({ "allOf": [inner] }));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &schema, |b, schema| {
            b.iter(|| normalize(black_box(schema), black_box(&options)).unwrap())
        });
    }
    group.finish();
}

fn bench_wide_enum_union(c: &mut Criterion) {
    let options = NormalizeOptions::default();
    let branches: Vec<Value> = (0..200).rev().map(|i| json!({ "const": format!("v{i}") })).collect();
    let schema = json!({ "anyOf": branches });

    c.bench_function("normalize/anyOf_200_consts", |b| {
        b.iter(|| normalize(black_box(&schema), black_box(&options)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_normalize_fixtures,
    bench_normalize_canonical_input,
    bench_all_of_chain,
    bench_wide_enum_union,
);
criterion_main!(benches);
