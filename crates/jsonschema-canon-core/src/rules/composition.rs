//! merge-allOf and merge-anyOf-oneOf.

use std::sync::Arc;

use serde_json::Value;

use super::merge::{can_merge, merge_into};
use super::RuleContext;
use crate::ordering::{canonical_dedup_sort, canonical_eq, sort_schemas};
use crate::schema::{Keyword, Keywords, Schema};

enum Plan {
    Unsatisfiable,
    DropKeyword(&'static str),
    Replace(&'static str, Vec<Arc<Schema>>),
    Merge(&'static str, Arc<Schema>),
}

fn branches<'a>(keywords: &'a Keywords, name: &str) -> Option<&'a [Arc<Schema>]> {
    keywords.get(name).and_then(Keyword::as_sequence)
}

/// Merge a lone branch into the parent, or at least store it canonically.
fn single_branch(
    keywords: &Keywords,
    name: &'static str,
    branch: Arc<Schema>,
    current: &[Arc<Schema>],
) -> Option<Plan> {
    if can_merge(keywords, name, &branch) {
        Some(Plan::Merge(name, branch))
    } else if current.len() != 1 || current[0] != branch {
        Some(Plan::Replace(name, vec![branch]))
    } else {
        None
    }
}

fn execute(mut keywords: Keywords, plan: Option<Plan>) -> Schema {
    match plan {
        Some(Plan::Unsatisfiable) => Schema::Bool(false),
        Some(Plan::DropKeyword(name)) => {
            keywords.remove(name);
            Schema::Object(keywords)
        }
        Some(Plan::Replace(name, seq)) => {
            keywords.insert(name.to_string(), Keyword::Sequence(seq));
            Schema::Object(keywords)
        }
        Some(Plan::Merge(name, branch)) => {
            keywords.remove(name);
            merge_into(keywords, Arc::unwrap_or_clone(branch))
        }
        None => Schema::Object(keywords),
    }
}

// ---------------------------------------------------------------------------
// allOf
// ---------------------------------------------------------------------------

fn all_of_plan(keywords: &Keywords) -> Option<Plan> {
    let current = branches(keywords, "allOf")?;

    let mut flat: Vec<Arc<Schema>> = Vec::with_capacity(current.len());
    for branch in current {
        match branch.single_keyword() {
            Some(("allOf", Keyword::Sequence(inner))) => flat.extend(inner.iter().cloned()),
            _ => flat.push(branch.clone()),
        }
    }
    if flat.iter().any(|b| b.is_false()) {
        return Some(Plan::Unsatisfiable);
    }
    flat.retain(|b| !b.is_true());
    let flat = sort_schemas(flat, true);

    match flat.len() {
        0 => Some(Plan::DropKeyword("allOf")),
        1 => single_branch(keywords, "allOf", flat[0].clone(), current),
        _ if flat.as_slice() != current => Some(Plan::Replace("allOf", flat)),
        _ => None,
    }
}

pub(super) fn all_of_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    all_of_plan(keywords).is_some()
}

pub(super) fn all_of(keywords: Keywords, _: &RuleContext) -> Schema {
    let plan = all_of_plan(&keywords);
    execute(keywords, plan)
}

// ---------------------------------------------------------------------------
// anyOf / oneOf
// ---------------------------------------------------------------------------

/// Values accepted by a branch that is nothing but a `const` or an `enum`.
fn literal_values(branch: &Schema) -> Option<Vec<Value>> {
    match branch.single_keyword()? {
        ("const", Keyword::Literal(value)) => Some(vec![value.clone()]),
        ("enum", Keyword::Literal(Value::Array(values))) => Some(canonical_dedup_sort(values.clone())),
        _ => None,
    }
}

fn enum_branch(values: Vec<Value>) -> Arc<Schema> {
    Arc::new(Schema::single("enum", Keyword::Literal(Value::Array(values))))
}

fn any_of_plan(keywords: &Keywords, ctx: &RuleContext) -> Option<Plan> {
    let current = branches(keywords, "anyOf")?;
    let kept: Vec<Arc<Schema>> = current.iter().filter(|b| !b.is_false()).cloned().collect();

    if kept.is_empty() {
        return Some(Plan::Unsatisfiable);
    }
    if kept.iter().any(|b| b.is_true()) && !ctx.preserve_annotations {
        return Some(Plan::DropKeyword("anyOf"));
    }
    if kept.len() > 1 {
        let sets: Option<Vec<Vec<Value>>> = kept.iter().map(|b| literal_values(b)).collect();
        if let Some(sets) = sets {
            let union = canonical_dedup_sort(sets.into_iter().flatten().collect());
            return single_branch(keywords, "anyOf", enum_branch(union), current);
        }
    }

    let kept = sort_schemas(kept, true);
    match kept.len() {
        1 => single_branch(keywords, "anyOf", kept[0].clone(), current),
        _ if kept.as_slice() != current => Some(Plan::Replace("anyOf", kept)),
        _ => None,
    }
}

/// Values contributed by exactly one branch; a value in two branches fails `oneOf`.
fn exclusive_values(sets: Vec<Vec<Value>>) -> Vec<Value> {
    let all: Vec<Value> = sets.into_iter().flatten().collect();
    let unique: Vec<Value> = all
        .iter()
        .filter(|v| all.iter().filter(|w| canonical_eq(v, w)).count() == 1)
        .cloned()
        .collect();
    canonical_dedup_sort(unique)
}

fn one_of_plan(keywords: &Keywords) -> Option<Plan> {
    let current = branches(keywords, "oneOf")?;
    let kept: Vec<Arc<Schema>> = current.iter().filter(|b| !b.is_false()).cloned().collect();

    if kept.is_empty() || kept.iter().filter(|b| b.is_true()).count() > 1 {
        return Some(Plan::Unsatisfiable);
    }
    if kept.len() > 1 {
        let sets: Option<Vec<Vec<Value>>> = kept.iter().map(|b| literal_values(b)).collect();
        if let Some(sets) = sets {
            let values = exclusive_values(sets);
            if values.is_empty() {
                return Some(Plan::Unsatisfiable);
            }
            return single_branch(keywords, "oneOf", enum_branch(values), current);
        }
    }

    let kept = sort_schemas(kept, false);
    match kept.len() {
        1 => single_branch(keywords, "oneOf", kept[0].clone(), current),
        _ if kept.as_slice() != current => Some(Plan::Replace("oneOf", kept)),
        _ => None,
    }
}

fn any_one_of_plan(keywords: &Keywords, ctx: &RuleContext) -> Option<Plan> {
    any_of_plan(keywords, ctx).or_else(|| one_of_plan(keywords))
}

pub(super) fn any_one_of_applies(keywords: &Keywords, ctx: &RuleContext) -> bool {
    any_one_of_plan(keywords, ctx).is_some()
}

pub(super) fn any_one_of(keywords: Keywords, ctx: &RuleContext) -> Schema {
    let plan = any_one_of_plan(&keywords, ctx);
    execute(keywords, plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BooleanForm;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CTX: RuleContext = RuleContext {
        strip_metadata: true,
        preserve_annotations: false,
    };
    const PRESERVE: RuleContext = RuleContext {
        strip_metadata: true,
        preserve_annotations: true,
    };

    fn settle(value: Value, ctx: &RuleContext) -> Value {
        let mut node = Schema::from_value(value).unwrap();
        loop {
            node = match node {
                Schema::Object(k) if all_of_applies(&k, ctx) => all_of(k, ctx),
                Schema::Object(k) if any_one_of_applies(&k, ctx) => any_one_of(k, ctx),
                done => return done.to_value(BooleanForm::Literal),
            };
        }
    }

    // -----------------------------------------------------------------------
    // allOf
    // -----------------------------------------------------------------------

    #[test]
    fn test_all_of_single_branch_merges() {
        assert_eq!(
            settle(json!({ "allOf": [{ "type": "string", "minLength": 1 }] }), &CTX),
            json!({ "type": "string", "minLength": 1 })
        );
    }

    #[test]
    fn test_all_of_false_branch() {
        assert_eq!(settle(json!({ "allOf": [{ "minimum": 1 }, false] }), &CTX), json!(false));
    }

    #[test]
    fn test_all_of_true_branches_dropped() {
        assert_eq!(
            settle(json!({ "allOf": [true, true], "minimum": 1 }), &CTX),
            json!({ "minimum": 1 })
        );
    }

    #[test]
    fn test_all_of_flattened_sorted_deduped() {
        assert_eq!(
            settle(
                json!({
                    "allOf": [
                        { "allOf": [{ "pattern": "b" }, { "pattern": "a" }] },
                        { "pattern": "a" }
                    ]
                }),
                &CTX
            ),
            json!({ "allOf": [{ "pattern": "a" }, { "pattern": "b" }] })
        );
    }

    #[test]
    fn test_all_of_blocked_by_unevaluated() {
        assert_eq!(
            settle(
                json!({ "allOf": [{ "properties": { "a": true } }], "unevaluatedProperties": false }),
                &PRESERVE
            ),
            json!({ "allOf": [{ "properties": { "a": true } }], "unevaluatedProperties": false })
        );
    }

    // -----------------------------------------------------------------------
    // anyOf
    // -----------------------------------------------------------------------

    #[test]
    fn test_any_of_false_branches_and_empty() {
        assert_eq!(settle(json!({ "anyOf": [false, false] }), &CTX), json!(false));
        assert_eq!(
            settle(json!({ "anyOf": [false, { "minimum": 1 }] }), &CTX),
            json!({ "minimum": 1 })
        );
    }

    #[test]
    fn test_any_of_true_branch_drops_keyword() {
        assert_eq!(
            settle(json!({ "anyOf": [true, { "minimum": 1 }], "maximum": 3 }), &CTX),
            json!({ "maximum": 3 })
        );
        assert_eq!(
            settle(json!({ "anyOf": [{ "minimum": 1 }, true] }), &PRESERVE),
            json!({ "anyOf": [true, { "minimum": 1 }] })
        );
    }

    #[test]
    fn test_any_of_literals_become_enum() {
        assert_eq!(
            settle(json!({ "anyOf": [{ "const": 2 }, { "enum": [1, 2] }] }), &CTX),
            json!({ "enum": [1, 2] })
        );
    }

    #[test]
    fn test_any_of_sorted_and_deduped() {
        assert_eq!(
            settle(
                json!({ "anyOf": [{ "type": "string" }, { "minimum": 1 }, { "type": "string" }] }),
                &CTX
            ),
            json!({ "anyOf": [{ "minimum": 1 }, { "type": "string" }] })
        );
    }

    // -----------------------------------------------------------------------
    // oneOf
    // -----------------------------------------------------------------------

    #[test]
    fn test_one_of_consts_become_enum() {
        assert_eq!(
            settle(json!({ "oneOf": [{ "const": "foo" }, { "const": "bar" }] }), &CTX),
            json!({ "enum": ["bar", "foo"] })
        );
    }

    #[test]
    fn test_one_of_shared_value_excluded() {
        assert_eq!(
            settle(json!({ "oneOf": [{ "enum": ["a", "b"] }, { "enum": ["b", "c"] }] }), &CTX),
            json!({ "enum": ["a", "c"] })
        );
        assert_eq!(
            settle(json!({ "oneOf": [{ "const": "a" }, { "const": "a" }] }), &CTX),
            json!(false)
        );
    }

    #[test]
    fn test_one_of_two_true_branches() {
        assert_eq!(settle(json!({ "oneOf": [true, true, { "minimum": 1 }] }), &CTX), json!(false));
    }

    #[test]
    fn test_one_of_keeps_duplicates() {
        assert_eq!(
            settle(json!({ "oneOf": [{ "minimum": 1 }, { "minimum": 1 }] }), &CTX),
            json!({ "oneOf": [{ "minimum": 1 }, { "minimum": 1 }] })
        );
    }
}
