//! Merge policy: conjoin a single-branch subschema into its parent node.
//!
//! Used by merge-allOf, merge-anyOf-oneOf and collapse-double-not. The result
//! accepts exactly the instances accepted by both parent and branch.
//!
//! Keywords only one side carries are copied. Shared keywords are combined
//! where the conjunction has a direct form (`type` intersect, `required`
//! union, tighter bounds, ...); anything else is kept side by side as
//! `allOf: [{k: parent}, {k: branch}]`. Keywords whose meaning depends on a
//! sibling move as a group, so `additionalProperties` never starts applying to
//! names listed by the other side.
//!
//! Definition tables are unioned, never wrapped, so JSON pointers into them
//! keep resolving. A reference never lands beside assertions it did not
//! already sit with: drafts 4 to 7 ignore the siblings of `$ref`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::rule_utils::{intersect_types, is_metadata, parse_types, type_literal};
use crate::ordering::{canonical_cmp, canonical_dedup_sort, canonical_eq};
use crate::schema::{Keyword, Keywords, Schema};

/// Keywords whose meaning depends on siblings in the same node.
const ADJACENCY_GROUPS: &[&[&str]] = &[
    &["properties", "patternProperties", "additionalProperties"],
    &["items", "additionalItems", "prefixItems"],
    &["if", "then", "else"],
    &["contains", "minContains", "maxContains"],
];

const ANNOTATION_CONSUMERS: &[&str] = &["unevaluatedProperties", "unevaluatedItems"];

const REFERENCES: &[&str] = &["$ref", "$dynamicRef", "$recursiveRef"];

/// Keyword-to-schema tables addressed by JSON pointer.
const DEFINITIONS: &[&str] = &["$defs", "definitions"];

const LOWER_BOUNDS: &[&str] = &[
    "minimum",
    "exclusiveMinimum",
    "minLength",
    "minItems",
    "minProperties",
];

const UPPER_BOUNDS: &[&str] = &[
    "maximum",
    "exclusiveMaximum",
    "maxLength",
    "maxItems",
    "maxProperties",
];

/// True if `branch`, taken from the parent's `source` keyword, can be merged
/// into the rest of `parent`.
///
/// Refused when:
/// - a side consumes evaluation annotations
///   (`unevaluatedProperties`/`unevaluatedItems`) while the other side could
///   produce them;
/// - a side holds a reference and the other side holds an assertion;
/// - the branch sets `$id` next to parent keywords;
/// - both sides define the same name differently in `$defs`/`definitions`;
/// - an `allOf` is not a schema sequence.
pub fn can_merge(parent: &Keywords, source: &str, branch: &Schema) -> bool {
    let Schema::Object(branch) = branch else {
        return true;
    };
    let parent_keys: Vec<&str> = parent
        .keys()
        .map(String::as_str)
        .filter(|k| *k != source)
        .collect();
    let branch_keys: Vec<&str> = branch.keys().map(String::as_str).collect();

    let consumes = |keys: &[&str]| keys.iter().any(|k| ANNOTATION_CONSUMERS.contains(k));
    if (consumes(&parent_keys) && !branch_keys.is_empty())
        || (consumes(&branch_keys) && !parent_keys.is_empty())
    {
        return false;
    }

    let refers = |keys: &[&str]| keys.iter().any(|k| REFERENCES.contains(k));
    let asserts = |keys: &[&str]| {
        keys.iter()
            .any(|k| !DEFINITIONS.contains(k) && (*k == "$id" || !is_metadata(k)))
    };
    if (refers(&parent_keys) && asserts(&branch_keys))
        || (refers(&branch_keys) && asserts(&parent_keys))
    {
        return false;
    }
    if branch.contains_key("$id") && !parent_keys.is_empty() {
        return false;
    }
    if !DEFINITIONS
        .iter()
        .all(|name| definitions_agree(parent.get(*name), branch.get(*name)))
    {
        return false;
    }

    let malformed_all_of =
        |k: &Keywords| matches!(k.get("allOf"), Some(kw) if kw.as_sequence().is_none());
    (source == "allOf" || !malformed_all_of(parent)) && !malformed_all_of(branch)
}

/// Two definition tables can be unioned when every shared name has the same schema.
fn definitions_agree(parent: Option<&Keyword>, branch: Option<&Keyword>) -> bool {
    match (parent, branch) {
        (Some(a), Some(b)) if a == b => true,
        (Some(Keyword::Mapping(a)), Some(Keyword::Mapping(b))) => a
            .iter()
            .all(|(name, schema)| b.get(name).map_or(true, |other| other == schema)),
        (Some(_), Some(_)) => false,
        _ => true,
    }
}

/// Conjoin `branch` into `parent`. Callers check [`can_merge`] first.
pub fn merge_into(mut parent: Keywords, branch: Schema) -> Schema {
    let branch = match branch {
        Schema::Bool(true) => return Schema::Object(parent),
        Schema::Bool(false) => return Schema::Bool(false),
        Schema::Object(keywords) => keywords,
    };

    let mut wrapped: Vec<Arc<Schema>> = Vec::new();
    let mut rest = Keywords::new();
    let mut groups: BTreeMap<usize, Keywords> = BTreeMap::new();

    for (name, keyword) in branch {
        match ADJACENCY_GROUPS.iter().position(|g| g.contains(&name.as_str())) {
            Some(idx) => {
                groups.entry(idx).or_default().insert(name, keyword);
            }
            None => {
                rest.insert(name, keyword);
            }
        }
    }

    for (idx, branch_group) in groups {
        merge_group(&mut parent, branch_group, ADJACENCY_GROUPS[idx], &mut wrapped);
    }

    for (name, keyword) in rest {
        let Some(existing) = parent.remove(&name) else {
            parent.insert(name, keyword);
            continue;
        };
        match combine(&name, existing, keyword) {
            Combined::Keep(keyword) => {
                parent.insert(name, keyword);
            }
            Combined::Unsatisfiable => return Schema::Bool(false),
            Combined::Wrap(a, b) => {
                wrapped.push(Arc::new(Schema::single(&name, a)));
                wrapped.push(Arc::new(Schema::single(&name, b)));
            }
        }
    }

    if !wrapped.is_empty() {
        let mut all_of = match parent.remove("allOf") {
            Some(Keyword::Sequence(seq)) => seq,
            _ => Vec::new(),
        };
        all_of.extend(wrapped);
        parent.insert("allOf".to_string(), Keyword::Sequence(all_of));
    }
    Schema::Object(parent)
}

fn merge_group(
    parent: &mut Keywords,
    branch_group: Keywords,
    group: &[&str],
    wrapped: &mut Vec<Arc<Schema>>,
) {
    let parent_group: Keywords = group
        .iter()
        .filter_map(|k| parent.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect();

    if parent_group.is_empty() {
        parent.extend(branch_group);
        return;
    }
    if parent_group == branch_group {
        return;
    }

    let property_group = group.contains(&"properties");
    let closed = |k: &Keywords| k.contains_key("additionalProperties");
    if property_group && !closed(&parent_group) && !closed(&branch_group) {
        for (name, keyword) in branch_group {
            let merged = match (parent.remove(&name), keyword) {
                (None, keyword) => keyword,
                (Some(Keyword::Mapping(a)), Keyword::Mapping(b)) => Keyword::Mapping(union_mappings(a, b)),
                (Some(a), b) => {
                    wrapped.push(Arc::new(Schema::single(&name, a)));
                    wrapped.push(Arc::new(Schema::single(&name, b)));
                    continue;
                }
            };
            parent.insert(name, merged);
        }
        return;
    }

    for name in group {
        parent.remove(*name);
    }
    wrapped.push(Arc::new(Schema::Object(parent_group)));
    wrapped.push(Arc::new(Schema::Object(branch_group)));
}

/// Key-wise union; a name on both sides must satisfy both schemas.
fn union_mappings(
    mut a: BTreeMap<String, Arc<Schema>>,
    b: BTreeMap<String, Arc<Schema>>,
) -> BTreeMap<String, Arc<Schema>> {
    for (name, schema) in b {
        let merged = match a.remove(&name) {
            None => schema,
            Some(existing) if existing == schema => existing,
            Some(existing) => Arc::new(Schema::single(
                "allOf",
                Keyword::Sequence(vec![existing, schema]),
            )),
        };
        a.insert(name, merged);
    }
    a
}

enum Combined {
    Keep(Keyword),
    Unsatisfiable,
    Wrap(Keyword, Keyword),
}

fn combine(name: &str, parent: Keyword, branch: Keyword) -> Combined {
    if parent == branch {
        return Combined::Keep(parent);
    }
    match (name, parent, branch) {
        ("allOf", Keyword::Sequence(mut a), Keyword::Sequence(b)) => {
            a.extend(b);
            Combined::Keep(Keyword::Sequence(a))
        }
        (_, Keyword::Mapping(mut a), Keyword::Mapping(b)) if DEFINITIONS.contains(&name) => {
            a.extend(b);
            Combined::Keep(Keyword::Mapping(a))
        }
        (_, Keyword::Literal(a), Keyword::Literal(b)) => combine_literals(name, a, b),
        (_, a, b) => Combined::Wrap(a, b),
    }
}

fn combine_literals(name: &str, a: Value, b: Value) -> Combined {
    match name {
        "type" => match (parse_types(&a), parse_types(&b)) {
            (Some(x), Some(y)) => {
                let both = intersect_types(&x, &y);
                if both.is_empty() {
                    Combined::Unsatisfiable
                } else {
                    Combined::Keep(Keyword::Literal(type_literal(&both)))
                }
            }
            _ => wrap_literals(a, b),
        },
        "required" => match (a, b) {
            (Value::Array(mut x), Value::Array(y)) => {
                x.extend(y);
                Combined::Keep(Keyword::Literal(Value::Array(canonical_dedup_sort(x))))
            }
            (a, b) => wrap_literals(a, b),
        },
        "const" => {
            if canonical_eq(&a, &b) {
                Combined::Keep(Keyword::Literal(a))
            } else {
                Combined::Unsatisfiable
            }
        }
        "enum" => match (a, b) {
            (Value::Array(x), Value::Array(y)) => {
                let both: Vec<Value> = x
                    .into_iter()
                    .filter(|v| y.iter().any(|w| canonical_eq(v, w)))
                    .collect();
                Combined::Keep(Keyword::Literal(Value::Array(both)))
            }
            (a, b) => wrap_literals(a, b),
        },
        "uniqueItems" => match (a.as_bool(), b.as_bool()) {
            (Some(x), Some(y)) => Combined::Keep(Keyword::Literal(Value::Bool(x || y))),
            _ => wrap_literals(a, b),
        },
        _ if a.is_number() && b.is_number() && LOWER_BOUNDS.contains(&name) => {
            Combined::Keep(Keyword::Literal(tighter(a, b, std::cmp::Ordering::Greater)))
        }
        _ if a.is_number() && b.is_number() && UPPER_BOUNDS.contains(&name) => {
            Combined::Keep(Keyword::Literal(tighter(a, b, std::cmp::Ordering::Less)))
        }
        _ => wrap_literals(a, b),
    }
}

fn tighter(a: Value, b: Value, prefer: std::cmp::Ordering) -> Value {
    if canonical_cmp(&b, &a) == prefer {
        b
    } else {
        a
    }
}

fn wrap_literals(a: Value, b: Value) -> Combined {
    Combined::Wrap(Keyword::Literal(a), Keyword::Literal(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BooleanForm;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn keywords(value: Value) -> Keywords {
        match Schema::from_value(value).unwrap() {
            Schema::Object(k) => k,
            Schema::Bool(_) => panic!("expected keywords"),
        }
    }

    fn merge(parent: Value, branch: Value) -> Value {
        let parent = keywords(parent);
        let branch = Schema::from_value(branch).unwrap();
        assert!(can_merge(&parent, "allOf", &branch));
        merge_into(parent, branch).to_value(BooleanForm::Literal)
    }

    // -----------------------------------------------------------------------
    // Shared literals
    // -----------------------------------------------------------------------

    #[test]
    fn test_disjoint_keywords_are_copied() {
        assert_eq!(
            merge(json!({ "minimum": 1 }), json!({ "type": "string", "minLength": 1 })),
            json!({ "minimum": 1, "type": "string", "minLength": 1 })
        );
    }

    #[test]
    fn test_type_is_intersected() {
        assert_eq!(
            merge(json!({ "type": ["number", "string"] }), json!({ "type": "integer" })),
            json!({ "type": "integer" })
        );
        assert_eq!(
            merge(json!({ "type": "string" }), json!({ "type": "null" })),
            json!(false)
        );
    }

    #[test]
    fn test_required_is_unioned() {
        assert_eq!(
            merge(json!({ "required": ["b", "a"] }), json!({ "required": ["c", "a"] })),
            json!({ "required": ["a", "b", "c"] })
        );
    }

    #[test]
    fn test_bounds_tighten() {
        assert_eq!(
            merge(
                json!({ "minimum": 1, "maxLength": 10 }),
                json!({ "minimum": 3, "maxLength": 4 })
            ),
            json!({ "minimum": 3, "maxLength": 4 })
        );
    }

    #[test]
    fn test_const_conflict_is_unsatisfiable() {
        assert_eq!(merge(json!({ "const": 1 }), json!({ "const": 1.0 })), json!({ "const": 1 }));
        assert_eq!(merge(json!({ "const": 1 }), json!({ "const": 2 })), json!(false));
    }

    #[test]
    fn test_enum_is_intersected() {
        assert_eq!(
            merge(json!({ "enum": ["a", "b", 1] }), json!({ "enum": ["b", 1.0, "c"] })),
            json!({ "enum": ["b", 1] })
        );
    }

    #[test]
    fn test_other_shared_keywords_are_wrapped() {
        assert_eq!(
            merge(
                json!({ "pattern": "^a", "allOf": [{ "minimum": 0 }, { "maximum": 9 }] }),
                json!({ "pattern": "b$" })
            ),
            json!({
                "allOf": [
                    { "minimum": 0 },
                    { "maximum": 9 },
                    { "pattern": "^a" },
                    { "pattern": "b$" }
                ]
            })
        );
    }

    // -----------------------------------------------------------------------
    // Adjacency groups
    // -----------------------------------------------------------------------

    #[test]
    fn test_open_properties_union_key_wise() {
        assert_eq!(
            merge(
                json!({ "properties": { "a": { "type": "string" }, "b": { "minimum": 1 } } }),
                json!({ "properties": { "b": { "maximum": 5 }, "c": false } })
            ),
            json!({
                "properties": {
                    "a": { "type": "string" },
                    "b": { "allOf": [{ "minimum": 1 }, { "maximum": 5 }] },
                    "c": false
                }
            })
        );
    }

    #[test]
    fn test_closed_property_groups_are_wrapped() {
        assert_eq!(
            merge(
                json!({ "properties": { "a": true }, "additionalProperties": false }),
                json!({ "properties": { "b": true } })
            ),
            json!({
                "allOf": [
                    { "properties": { "a": true }, "additionalProperties": false },
                    { "properties": { "b": true } }
                ]
            })
        );
    }

    #[test]
    fn test_group_from_one_side_is_copied() {
        assert_eq!(
            merge(
                json!({ "required": ["a"] }),
                json!({ "properties": { "a": true }, "additionalProperties": false })
            ),
            json!({
                "required": ["a"],
                "properties": { "a": true },
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_unevaluated_blocks_merge() {
        let parent = keywords(json!({ "unevaluatedProperties": false }));
        let branch = Schema::from_value(json!({ "properties": { "a": true } })).unwrap();
        assert!(!can_merge(&parent, "allOf", &branch));
        assert!(can_merge(&Keywords::new(), "allOf", &branch));
    }

    // -----------------------------------------------------------------------
    // References and definitions
    // -----------------------------------------------------------------------

    #[test]
    fn test_definitions_union_key_wise() {
        assert_eq!(
            merge(
                json!({ "$defs": { "a": { "minimum": 3 } }, "$ref": "#/$defs/a" }),
                json!({ "$defs": { "b": { "type": "string" } } })
            ),
            json!({
                "$defs": { "a": { "minimum": 3 }, "b": { "type": "string" } },
                "$ref": "#/$defs/a"
            })
        );
    }

    #[test]
    fn test_conflicting_definitions_block_merge() {
        let parent = keywords(json!({ "$defs": { "a": { "minimum": 3 } }, "type": "integer" }));
        let branch = Schema::from_value(json!({ "$defs": { "a": { "minimum": 4 } } })).unwrap();
        assert!(!can_merge(&parent, "allOf", &branch));

        let branch = Schema::from_value(json!({ "$defs": { "a": { "minimum": 3 } } })).unwrap();
        assert!(can_merge(&parent, "allOf", &branch));
    }

    #[test]
    fn test_reference_never_gains_assertion_siblings() {
        let parent = keywords(json!({ "type": "integer" }));
        let branch = Schema::from_value(json!({ "$ref": "#/definitions/a" })).unwrap();
        assert!(!can_merge(&parent, "allOf", &branch));

        let parent = keywords(json!({ "$ref": "#/definitions/a" }));
        let branch = Schema::from_value(json!({ "minimum": 1 })).unwrap();
        assert!(!can_merge(&parent, "allOf", &branch));

        let parent = keywords(json!({ "definitions": { "a": true }, "title": "T" }));
        let branch = Schema::from_value(json!({ "$ref": "#/definitions/a" })).unwrap();
        assert!(can_merge(&parent, "allOf", &branch));
    }

    #[test]
    fn test_branch_identifier_blocks_merge() {
        let parent = keywords(json!({ "type": "object" }));
        let branch = Schema::from_value(json!({ "$id": "https://example.com/x" })).unwrap();
        assert!(!can_merge(&parent, "allOf", &branch));
        assert!(can_merge(&Keywords::new(), "allOf", &branch));
    }

    #[test]
    fn test_boolean_branches() {
        let parent = keywords(json!({ "minimum": 1 }));
        assert_eq!(merge_into(parent.clone(), Schema::Bool(true)), Schema::Object(parent.clone()));
        assert_eq!(merge_into(parent, Schema::Bool(false)), Schema::Bool(false));
    }
}
