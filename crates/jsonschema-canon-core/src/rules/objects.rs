//! canon-object and canon-dependencies.

use serde_json::{Map, Value};

use super::rule_utils::{count_value, exclude_family, is_true_subschema, Family};
use super::RuleContext;
use crate::keywords;
use crate::ordering::canonical_dedup_sort;
use crate::schema::{Keyword, Keywords, Schema};

enum ObjectFix {
    Unsatisfiable,
    /// Drop `true` entries from `properties` / `patternProperties`.
    DropTrueEntries(&'static str),
    Drop(&'static str),
    CanonicalRequired(Vec<Value>),
}

fn has_true_entries(keywords: &Keywords, name: &str) -> bool {
    keywords
        .get(name)
        .and_then(Keyword::as_mapping)
        .is_some_and(|map| map.values().any(|s| s.is_true()))
}

fn object_plan(keywords: &Keywords, ctx: &RuleContext) -> Option<ObjectFix> {
    let min = count_value(keywords, "minProperties");
    if let (Some(min), Some(max)) = (min, count_value(keywords, "maxProperties")) {
        if min > max {
            return Some(ObjectFix::Unsatisfiable);
        }
    }
    if min == Some(0) {
        return Some(ObjectFix::Drop("minProperties"));
    }

    if !ctx.preserve_annotations {
        // A listed name is exempt from `additionalProperties`, so entries only go when it is absent.
        if !keywords.contains_key("additionalProperties") {
            for name in ["properties", "patternProperties"] {
                if has_true_entries(keywords, name) {
                    return Some(ObjectFix::DropTrueEntries(name));
                }
            }
        }
        if is_true_subschema(keywords, "additionalProperties") {
            return Some(ObjectFix::Drop("additionalProperties"));
        }
    }
    if is_true_subschema(keywords, "propertyNames") {
        return Some(ObjectFix::Drop("propertyNames"));
    }

    if let Some(Value::Array(required)) = keywords.get("required").and_then(Keyword::as_literal) {
        let canonical = canonical_dedup_sort(required.clone());
        if &canonical != required {
            return Some(ObjectFix::CanonicalRequired(canonical));
        }
    }
    None
}

pub(super) fn object_applies(keywords: &Keywords, ctx: &RuleContext) -> bool {
    object_plan(keywords, ctx).is_some()
}

pub(super) fn object(mut keywords: Keywords, ctx: &RuleContext) -> Schema {
    match object_plan(&keywords, ctx) {
        Some(ObjectFix::Unsatisfiable) => return exclude_family(keywords, Family::Object),
        Some(ObjectFix::DropTrueEntries(name)) => {
            if let Some(Keyword::Mapping(map)) = keywords.get_mut(name) {
                map.retain(|_, s| !s.is_true());
            }
        }
        Some(ObjectFix::Drop(name)) => {
            keywords.remove(name);
        }
        Some(ObjectFix::CanonicalRequired(required)) => {
            keywords.insert("required".to_string(), Keyword::Literal(Value::Array(required)));
        }
        None => {}
    }
    Schema::Object(keywords)
}

// ---------------------------------------------------------------------------
// canon-dependencies
// ---------------------------------------------------------------------------

/// Canonical form of a property-list dependency map (`dependentRequired`, or
/// a `dependencies` map holding lists): lists deduped and sorted, empty lists
/// and `true` entries removed.
fn canonical_dependency_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter_map(|(name, entry)| match entry {
            Value::Array(list) if list.is_empty() => None,
            Value::Array(list) => Some((name.clone(), Value::Array(canonical_dedup_sort(list.clone())))),
            Value::Bool(true) => None,
            other => Some((name.clone(), other.clone())),
        })
        .collect()
}

enum DependencyFix {
    /// Replace a literal dependency map, reclassifying it (a map left with only
    /// schemas becomes a schema mapping).
    Literal(&'static str, Value),
    DropTrueSchemas(&'static str),
}

fn dependencies_plan(keywords: &Keywords) -> Option<DependencyFix> {
    for name in ["dependentRequired", "dependencies"] {
        if let Some(Value::Object(map)) = keywords.get(name).and_then(Keyword::as_literal) {
            let canonical = canonical_dependency_map(map);
            let reclassifies = name == "dependencies"
                && !canonical.is_empty()
                && canonical.values().all(|v| v.is_object() || v.is_boolean());
            if &canonical != map || reclassifies {
                return Some(DependencyFix::Literal(name, Value::Object(canonical)));
            }
        }
    }
    ["dependentSchemas", "dependencies"]
        .into_iter()
        .find(|name| has_true_entries(keywords, name))
        .map(DependencyFix::DropTrueSchemas)
}

pub(super) fn dependencies_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    dependencies_plan(keywords).is_some()
}

pub(super) fn dependencies(mut keywords: Keywords, _: &RuleContext) -> Schema {
    match dependencies_plan(&keywords) {
        Some(DependencyFix::Literal(name, value)) => {
            keywords.insert(name.to_string(), keywords::classify(name, value));
        }
        Some(DependencyFix::DropTrueSchemas(name)) => {
            if let Some(Keyword::Mapping(map)) = keywords.get_mut(name) {
                map.retain(|_, s| !s.is_true());
            }
        }
        None => {}
    }
    Schema::Object(keywords)
}
