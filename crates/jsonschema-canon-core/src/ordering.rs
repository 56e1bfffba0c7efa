//! Canonical Ordering.
//!
//! A total order over arbitrary JSON values, used to deduplicate and sort the
//! value sets that occur inside keywords (`enum`, `required`, `type`) and to
//! order the branches of `allOf`/`anyOf`/`oneOf`.
//!
//! Values are ranked by JSON type first:
//!
//! `null` < `false` < `true` < number < string < array < object
//!
//! and compared within a rank numerically (numbers compare by value, so `1`
//! and `1.0` are equal), lexicographically (strings, by code point),
//! element-wise (arrays) or entry-wise over sorted keys (objects).

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::{Map, Number, Value};

use crate::schema::{Keyword, Schema};

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Total order over JSON values.
pub fn canonical_cmp(a: &Value, b: &Value) -> Ordering {
    match type_rank(a).cmp(&type_rank(b)) {
        Ordering::Equal => {}
        other => return other,
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => cmp_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => cmp_sequences(x, y, canonical_cmp),
        (Value::Object(x), Value::Object(y)) => cmp_objects(x, y),
        _ => Ordering::Equal,
    }
}

/// Deep structural equality: key order is irrelevant and numbers compare by value.
pub fn canonical_eq(a: &Value, b: &Value) -> bool {
    canonical_cmp(a, b) == Ordering::Equal
}

/// Deduplicate and sort a value set into its canonical form.
///
/// Numbers are first rewritten with [`canonicalize_numbers`], so the result
/// does not depend on the input spelling or order.
pub fn canonical_dedup_sort(values: Vec<Value>) -> Vec<Value> {
    let mut values: Vec<Value> = values.into_iter().map(canonicalize_numbers).collect();
    values.sort_by(canonical_cmp);
    values.dedup_by(|a, b| canonical_eq(a, b));
    values
}

/// Rewrite integral floats that are exactly representable (`1.0`, `-0.0`) as
/// integers, recursively. Object keys come out sorted.
pub fn canonicalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(canonical_number(n)),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_numbers).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize_numbers(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        other => other,
    }
}

fn canonical_number(n: Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n;
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => Number::from(f as i64),
        _ => n,
    }
}

fn cmp_numbers(x: &Number, y: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a.cmp(&b);
    }
    match (x.as_f64(), y.as_f64()) {
        // JSON has no NaN; -0.0 and 0.0 compare equal.
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn cmp_sequences<T>(x: &[T], y: &[T], cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    for (a, b) in x.iter().zip(y.iter()) {
        match cmp(a, b) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    x.len().cmp(&y.len())
}

fn cmp_objects(x: &Map<String, Value>, y: &Map<String, Value>) -> Ordering {
    let mut xs: Vec<(&String, &Value)> = x.iter().collect();
    let mut ys: Vec<(&String, &Value)> = y.iter().collect();
    xs.sort_by(|a, b| a.0.cmp(b.0));
    ys.sort_by(|a, b| a.0.cmp(b.0));
    cmp_sequences(&xs, &ys, |a, b| {
        a.0.cmp(b.0).then_with(|| canonical_cmp(a.1, b.1))
    })
}

// ---------------------------------------------------------------------------
// Schema order
// ---------------------------------------------------------------------------

/// Total order over schemas: `false` < `true` < keyword nodes; nodes compare
/// keyword by keyword in name order.
pub fn cmp_schema(a: &Schema, b: &Schema) -> Ordering {
    match (a, b) {
        (Schema::Bool(x), Schema::Bool(y)) => x.cmp(y),
        (Schema::Bool(_), Schema::Object(_)) => Ordering::Less,
        (Schema::Object(_), Schema::Bool(_)) => Ordering::Greater,
        (Schema::Object(x), Schema::Object(y)) => {
            let xs: Vec<_> = x.iter().collect();
            let ys: Vec<_> = y.iter().collect();
            cmp_sequences(&xs, &ys, |a, b| {
                a.0.cmp(b.0).then_with(|| cmp_keyword(a.1, b.1))
            })
        }
    }
}

fn keyword_rank(keyword: &Keyword) -> u8 {
    match keyword {
        Keyword::Literal(_) => 0,
        Keyword::Subschema(_) => 1,
        Keyword::Sequence(_) => 2,
        Keyword::Mapping(_) => 3,
    }
}

fn cmp_keyword(a: &Keyword, b: &Keyword) -> Ordering {
    match keyword_rank(a).cmp(&keyword_rank(b)) {
        Ordering::Equal => {}
        other => return other,
    }
    match (a, b) {
        (Keyword::Literal(x), Keyword::Literal(y)) => canonical_cmp(x, y),
        (Keyword::Subschema(x), Keyword::Subschema(y)) => cmp_schema(x, y),
        (Keyword::Sequence(x), Keyword::Sequence(y)) => cmp_sequences(x, y, cmp_arc),
        (Keyword::Mapping(x), Keyword::Mapping(y)) => {
            let xs: Vec<_> = x.iter().collect();
            let ys: Vec<_> = y.iter().collect();
            cmp_sequences(&xs, &ys, |a, b| a.0.cmp(b.0).then_with(|| cmp_arc(a.1, b.1)))
        }
        _ => Ordering::Equal,
    }
}

fn cmp_arc(a: &Arc<Schema>, b: &Arc<Schema>) -> Ordering {
    if Arc::ptr_eq(a, b) {
        return Ordering::Equal;
    }
    cmp_schema(a, b)
}

/// Sort schemas canonically; with `dedup`, also drop structural duplicates.
pub fn sort_schemas(mut schemas: Vec<Arc<Schema>>, dedup: bool) -> Vec<Arc<Schema>> {
    schemas.sort_by(cmp_arc);
    if dedup {
        schemas.dedup_by(|a, b| cmp_arc(a, b) == Ordering::Equal);
    }
    schemas
}
