//! canon-array-items and canon-array-bounds.

use super::rule_utils::{count_value, exclude_family, is_true_subschema, Family};
use super::RuleContext;
use crate::schema::{Keyword, Keywords, Schema};

enum ItemsFix {
    /// `additionalItems` has no effect unless `items` is a tuple.
    DropAdditional,
    /// `items: []`: whatever `additionalItems` says now applies to every element.
    AdoptAdditional,
    DropItems,
}

fn items_plan(keywords: &Keywords, ctx: &RuleContext) -> Option<ItemsFix> {
    let items = keywords.get("items");
    let tuple = items.and_then(Keyword::as_sequence);
    let has_additional = keywords.contains_key("additionalItems");

    match tuple {
        Some([]) if has_additional => Some(ItemsFix::AdoptAdditional),
        Some([]) => Some(ItemsFix::DropItems),
        Some(_) if !ctx.preserve_annotations && is_true_subschema(keywords, "additionalItems") => {
            Some(ItemsFix::DropAdditional)
        }
        Some(_) => None,
        None if has_additional => Some(ItemsFix::DropAdditional),
        None if !ctx.preserve_annotations && is_true_subschema(keywords, "items") => {
            Some(ItemsFix::DropItems)
        }
        None => None,
    }
}

pub(super) fn items_applies(keywords: &Keywords, ctx: &RuleContext) -> bool {
    items_plan(keywords, ctx).is_some()
}

pub(super) fn items(mut keywords: Keywords, ctx: &RuleContext) -> Schema {
    match items_plan(&keywords, ctx) {
        Some(ItemsFix::DropAdditional) => {
            keywords.remove("additionalItems");
        }
        Some(ItemsFix::AdoptAdditional) => {
            if let Some(additional) = keywords.remove("additionalItems") {
                keywords.insert("items".to_string(), additional);
            }
        }
        Some(ItemsFix::DropItems) => {
            keywords.remove("items");
        }
        None => {}
    }
    Schema::Object(keywords)
}

// ---------------------------------------------------------------------------
// canon-array-bounds
// ---------------------------------------------------------------------------

enum BoundsFix {
    Unsatisfiable,
    DropZeroMin,
}

fn bounds_plan(keywords: &Keywords) -> Option<BoundsFix> {
    let min = count_value(keywords, "minItems");
    if let (Some(min), Some(max)) = (min, count_value(keywords, "maxItems")) {
        if min > max {
            return Some(BoundsFix::Unsatisfiable);
        }
    }
    (min == Some(0)).then_some(BoundsFix::DropZeroMin)
}

pub(super) fn bounds_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    bounds_plan(keywords).is_some()
}

pub(super) fn bounds(mut keywords: Keywords, _: &RuleContext) -> Schema {
    match bounds_plan(&keywords) {
        Some(BoundsFix::Unsatisfiable) => exclude_family(keywords, Family::Array),
        Some(BoundsFix::DropZeroMin) => {
            keywords.remove("minItems");
            Schema::Object(keywords)
        }
        None => Schema::Object(keywords),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BooleanForm;
    use serde_json::{json, Value};

    const CTX: RuleContext = RuleContext {
        strip_metadata: true,
        preserve_annotations: false,
    };
    const PRESERVE: RuleContext = RuleContext {
        strip_metadata: true,
        preserve_annotations: true,
    };

    fn keywords(value: Value) -> Keywords {
        match Schema::from_value(value).unwrap() {
            Schema::Object(k) => k,
            Schema::Bool(_) => panic!("expected keywords"),
        }
    }

    fn settle(value: Value, ctx: &RuleContext) -> Value {
        let mut node = Schema::from_value(value).unwrap();
        loop {
            node = match node {
                Schema::Object(k) if items_applies(&k, ctx) => items(k, ctx),
                done => return done.to_value(BooleanForm::Literal),
            };
        }
    }

    #[test]
    fn test_additional_items_without_tuple_dropped() {
        assert_eq!(
            settle(json!({ "items": { "type": "string" }, "additionalItems": false }), &CTX),
            json!({ "items": { "type": "string" } })
        );
        assert_eq!(settle(json!({ "additionalItems": false }), &CTX), json!({}));
    }

    #[test]
    fn test_empty_tuple_adopts_additional_items() {
        assert_eq!(
            settle(json!({ "items": [], "additionalItems": { "type": "integer" } }), &CTX),
            json!({ "items": { "type": "integer" } })
        );
        assert_eq!(settle(json!({ "items": [], "minItems": 1 }), &CTX), json!({ "minItems": 1 }));
    }

    #[test]
    fn test_true_items_dropped_unless_annotations_matter() {
        assert_eq!(settle(json!({ "items": true, "maxItems": 2 }), &CTX), json!({ "maxItems": 2 }));
        assert_eq!(
            settle(json!({ "items": true, "maxItems": 2 }), &PRESERVE),
            json!({ "items": true, "maxItems": 2 })
        );
        assert_eq!(
            settle(json!({ "items": [{ "type": "string" }], "additionalItems": true }), &CTX),
            json!({ "items": [{ "type": "string" }] })
        );
    }

    #[test]
    fn test_array_bounds() {
        let node = keywords(json!({ "type": "array", "minItems": 3, "maxItems": 2 }));
        assert_eq!(bounds(node, &CTX), Schema::Bool(false));
        let node = keywords(json!({ "minItems": 0, "maxItems": 2 }));
        assert_eq!(
            bounds(node, &CTX).to_value(BooleanForm::Literal),
            json!({ "maxItems": 2 })
        );
        assert!(!bounds_applies(&keywords(json!({ "minItems": 2, "maxItems": 2 })), &CTX));
    }
}
