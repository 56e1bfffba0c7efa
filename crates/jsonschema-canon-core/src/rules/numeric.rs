//! canon-number-bounds and drop-trivial-multipleOf.

use std::cmp::Ordering;

use serde_json::Value;

use super::rule_utils::{bool_value, exclude_family, number_value, Family};
use super::RuleContext;
use crate::ordering::{canonical_cmp, canonical_eq};
use crate::schema::{Keyword, Keywords, Schema};

#[derive(Clone, Copy)]
struct Side {
    inclusive: &'static str,
    exclusive: &'static str,
    /// How a tighter bound compares against a looser one.
    tighter: Ordering,
}

const LOWER: Side = Side {
    inclusive: "minimum",
    exclusive: "exclusiveMinimum",
    tighter: Ordering::Greater,
};

const UPPER: Side = Side {
    inclusive: "maximum",
    exclusive: "exclusiveMaximum",
    tighter: Ordering::Less,
};

enum Fix {
    /// Draft-4 `exclusive*: true`: the inclusive bound becomes the exclusive one.
    MoveToExclusive(Side),
    Drop(&'static str),
    EmptyInterval,
}

fn side_fix(keywords: &Keywords, side: Side) -> Option<Fix> {
    if let Some(exclusive) = bool_value(keywords, side.exclusive) {
        return Some(if exclusive && number_value(keywords, side.inclusive).is_some() {
            Fix::MoveToExclusive(side)
        } else {
            Fix::Drop(side.exclusive)
        });
    }
    let inclusive = number_value(keywords, side.inclusive)?;
    let exclusive = number_value(keywords, side.exclusive)?;
    // An exclusive bound at least as tight as the inclusive one subsumes it.
    Some(if canonical_cmp(exclusive, inclusive) == side.tighter.reverse() {
        Fix::Drop(side.exclusive)
    } else {
        Fix::Drop(side.inclusive)
    })
}

/// The effective bound of one side as `(value, exclusive)`.
fn bound<'a>(keywords: &'a Keywords, side: Side) -> Option<(&'a Value, bool)> {
    number_value(keywords, side.exclusive)
        .map(|v| (v, true))
        .or_else(|| number_value(keywords, side.inclusive).map(|v| (v, false)))
}

fn plan(keywords: &Keywords) -> Option<Fix> {
    if let Some(fix) = side_fix(keywords, LOWER).or_else(|| side_fix(keywords, UPPER)) {
        return Some(fix);
    }
    let (lo, lo_exclusive) = bound(keywords, LOWER)?;
    let (hi, hi_exclusive) = bound(keywords, UPPER)?;
    let empty = match canonical_cmp(lo, hi) {
        Ordering::Greater => true,
        Ordering::Equal => lo_exclusive || hi_exclusive,
        Ordering::Less => false,
    };
    empty.then_some(Fix::EmptyInterval)
}

pub(super) fn bounds_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    plan(keywords).is_some()
}

pub(super) fn bounds(mut keywords: Keywords, _: &RuleContext) -> Schema {
    match plan(&keywords) {
        Some(Fix::MoveToExclusive(side)) => {
            if let Some(value) = keywords.remove(side.inclusive) {
                keywords.insert(side.exclusive.to_string(), value);
            }
            Schema::Object(keywords)
        }
        Some(Fix::Drop(name)) => {
            keywords.remove(name);
            Schema::Object(keywords)
        }
        Some(Fix::EmptyInterval) => exclude_family(keywords, Family::Number),
        None => Schema::Object(keywords),
    }
}

// ---------------------------------------------------------------------------
// drop-trivial-multipleOf
// ---------------------------------------------------------------------------

pub(super) fn multiple_of_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    let is_one = number_value(keywords, "multipleOf")
        .is_some_and(|v| canonical_eq(v, &Value::from(1)));
    let integer_only = keywords
        .get("type")
        .and_then(Keyword::as_literal)
        .and_then(Value::as_str)
        == Some("integer");
    is_one && integer_only
}

pub(super) fn multiple_of(mut keywords: Keywords, _: &RuleContext) -> Schema {
    keywords.remove("multipleOf");
    Schema::Object(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BooleanForm;
    use serde_json::json;

    const CTX: RuleContext = RuleContext {
        strip_metadata: true,
        preserve_annotations: false,
    };

    /// Apply canon-number-bounds until it no longer applies.
    fn settle(value: Value) -> Value {
        let mut node = Schema::from_value(value).unwrap();
        loop {
            node = match node {
                Schema::Object(keywords) if bounds_applies(&keywords, &CTX) => bounds(keywords, &CTX),
                done => return done.to_value(BooleanForm::Literal),
            };
        }
    }

    #[test]
    fn test_legacy_exclusive_true_moves_bound() {
        assert_eq!(
            settle(json!({ "minimum": 5, "exclusiveMinimum": true })),
            json!({ "exclusiveMinimum": 5 })
        );
        assert_eq!(
            settle(json!({ "maximum": 5, "exclusiveMaximum": true })),
            json!({ "exclusiveMaximum": 5 })
        );
    }

    #[test]
    fn test_legacy_exclusive_false_or_alone_is_dropped() {
        assert_eq!(
            settle(json!({ "minimum": 5, "exclusiveMinimum": false })),
            json!({ "minimum": 5 })
        );
        assert_eq!(settle(json!({ "exclusiveMaximum": true, "type": "number" })), json!({ "type": "number" }));
    }

    #[test]
    fn test_tighter_of_inclusive_and_exclusive_kept() {
        assert_eq!(
            settle(json!({ "minimum": 5, "exclusiveMinimum": 5 })),
            json!({ "exclusiveMinimum": 5 })
        );
        assert_eq!(
            settle(json!({ "minimum": 6, "exclusiveMinimum": 5 })),
            json!({ "minimum": 6 })
        );
        assert_eq!(
            settle(json!({ "maximum": 4, "exclusiveMaximum": 5 })),
            json!({ "maximum": 4 })
        );
    }

    #[test]
    fn test_empty_interval_excludes_numbers() {
        assert_eq!(settle(json!({ "type": "integer", "minimum": 5, "maximum": 1 })), json!(false));
        assert_eq!(
            settle(json!({ "type": ["number", "string"], "exclusiveMinimum": 3, "maximum": 3 })),
            json!({ "type": "string" })
        );
        assert_eq!(
            settle(json!({ "minimum": 3, "maximum": 3 })),
            json!({ "minimum": 3, "maximum": 3 })
        );
    }

    #[test]
    fn test_trivial_multiple_of() {
        let node = |v: Value| match Schema::from_value(v).unwrap() {
            Schema::Object(k) => k,
            Schema::Bool(_) => unreachable!(),
        };
        assert!(multiple_of_applies(&node(json!({ "type": "integer", "multipleOf": 1.0 })), &CTX));
        assert!(!multiple_of_applies(&node(json!({ "type": "number", "multipleOf": 1 })), &CTX));
        assert!(!multiple_of_applies(&node(json!({ "type": "integer", "multipleOf": 2 })), &CTX));
    }
}
