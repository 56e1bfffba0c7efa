//! canon-type and prune-inapplicable.

use serde_json::Value;

use super::rule_utils::{
    admits, declared_types, is_universe, reduce_types, type_literal, Family,
};
use super::RuleContext;
use crate::schema::{Keyword, Keywords, Schema};

/// Canonical replacement for the node's `type`: `Some(None)` drops it.
fn canonical_type(keywords: &Keywords) -> Option<Option<Value>> {
    let types = reduce_types(declared_types(keywords)?);
    if is_universe(&types) {
        Some(None)
    } else {
        Some(Some(type_literal(&types)))
    }
}

pub(super) fn canon_type_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    match canonical_type(keywords) {
        Some(Some(canonical)) => keywords.get("type").and_then(Keyword::as_literal) != Some(&canonical),
        Some(None) => true,
        None => false,
    }
}

pub(super) fn canon_type(mut keywords: Keywords, _: &RuleContext) -> Schema {
    match canonical_type(&keywords) {
        Some(Some(canonical)) => {
            keywords.insert("type".to_string(), Keyword::Literal(canonical));
        }
        Some(None) => {
            keywords.remove("type");
        }
        None => {}
    }
    Schema::Object(keywords)
}

/// Families whose keywords are present but can never apply under the declared `type`.
fn inapplicable(keywords: &Keywords) -> Vec<Family> {
    let Some(types) = declared_types(keywords) else {
        return Vec::new();
    };
    Family::ALL
        .into_iter()
        .filter(|f| !admits(&types, *f) && f.is_used_by(keywords))
        .collect()
}

pub(super) fn prune_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    !inapplicable(keywords).is_empty()
}

pub(super) fn prune(mut keywords: Keywords, _: &RuleContext) -> Schema {
    for family in inapplicable(&keywords) {
        for name in family.keywords() {
            keywords.remove(*name);
        }
    }
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

    fn keywords(value: Value) -> Keywords {
        match Schema::from_value(value).unwrap() {
            Schema::Object(k) => k,
            Schema::Bool(_) => panic!("expected keywords"),
        }
    }

    fn run_canon(value: Value) -> Option<Value> {
        let node = keywords(value);
        canon_type_applies(&node, &CTX)
            .then(|| canon_type(node, &CTX).to_value(BooleanForm::Literal))
    }

    #[test]
    fn test_type_set_is_deduped_and_sorted() {
        assert_eq!(
            run_canon(json!({ "type": ["string", "string", "number"] })),
            Some(json!({ "type": ["number", "string"] }))
        );
        assert_eq!(run_canon(json!({ "type": ["null"] })), Some(json!({ "type": "null" })));
        assert_eq!(run_canon(json!({ "type": "string" })), None);
    }

    #[test]
    fn test_integer_subsumed_by_number() {
        assert_eq!(
            run_canon(json!({ "type": ["integer", "number"] })),
            Some(json!({ "type": "number" }))
        );
    }

    #[test]
    fn test_universe_is_dropped() {
        assert_eq!(
            run_canon(json!({
                "type": ["array", "boolean", "integer", "null", "number", "object", "string"],
                "minimum": 1
            })),
            Some(json!({ "minimum": 1 }))
        );
    }

    #[test]
    fn test_malformed_type_untouched() {
        assert_eq!(run_canon(json!({ "type": ["string", 1] })), None);
        assert_eq!(run_canon(json!({ "type": "text" })), None);
    }

    #[test]
    fn test_prune_inapplicable_families() {
        let node = keywords(json!({
            "type": "string",
            "minLength": 1,
            "minimum": 3,
            "properties": { "a": {} },
            "items": {}
        }));
        assert!(prune_applies(&node, &CTX));
        assert_eq!(
            prune(node, &CTX).to_value(BooleanForm::Literal),
            json!({ "type": "string", "minLength": 1 })
        );
        assert!(!prune_applies(&keywords(json!({ "type": "integer", "minimum": 1 })), &CTX));
        assert!(!prune_applies(&keywords(json!({ "minimum": 1 })), &CTX));
    }
}
