//! Helpers shared across rules: keyword families, `type` sets, literal getters.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::schema::{Keyword, Keywords, Schema};

/// Annotation-only keywords removed by strip-metadata.
pub const METADATA_KEYWORDS: &[&str] = &[
    "title",
    "description",
    "$comment",
    "examples",
    "default",
    "readOnly",
    "writeOnly",
    "deprecated",
    "$id",
    "$schema",
];

/// Every instance type a validator distinguishes (`integer` is a subset of `number`).
pub const TYPE_UNIVERSE: &[&str] = &["array", "boolean", "null", "number", "object", "string"];

const TYPE_NAMES: &[&str] = &[
    "array", "boolean", "integer", "null", "number", "object", "string",
];

pub fn is_metadata(keyword: &str) -> bool {
    METADATA_KEYWORDS.contains(&keyword)
}

// ---------------------------------------------------------------------------
// Keyword families
// ---------------------------------------------------------------------------

/// Assertion keywords scoped to one instance type; they ignore every other type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    String,
    Number,
    Array,
    Object,
}

impl Family {
    pub const ALL: [Family; 4] = [Family::String, Family::Number, Family::Array, Family::Object];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Family::String => &["minLength", "maxLength", "pattern"],
            Family::Number => &[
                "minimum",
                "maximum",
                "exclusiveMinimum",
                "exclusiveMaximum",
                "multipleOf",
            ],
            Family::Array => &[
                "items",
                "additionalItems",
                "prefixItems",
                "contains",
                "minContains",
                "maxContains",
                "minItems",
                "maxItems",
                "uniqueItems",
                "unevaluatedItems",
            ],
            Family::Object => &[
                "properties",
                "patternProperties",
                "additionalProperties",
                "required",
                "minProperties",
                "maxProperties",
                "propertyNames",
                "dependencies",
                "dependentRequired",
                "dependentSchemas",
                "unevaluatedProperties",
            ],
        }
    }

    /// `type` names whose instances this family constrains.
    pub fn type_names(self) -> &'static [&'static str] {
        match self {
            Family::String => &["string"],
            Family::Number => &["number", "integer"],
            Family::Array => &["array"],
            Family::Object => &["object"],
        }
    }

    pub fn is_used_by(self, keywords: &Keywords) -> bool {
        self.keywords().iter().any(|k| keywords.contains_key(*k))
    }
}

// ---------------------------------------------------------------------------
// `type` sets
// ---------------------------------------------------------------------------

pub type TypeSet = BTreeSet<String>;

/// Parse a `type` value. `None` when it is not a string or an array of known type names.
pub fn parse_types(value: &Value) -> Option<TypeSet> {
    let names: Vec<&str> = match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().map(Value::as_str).collect::<Option<_>>()?,
        _ => return None,
    };
    if names.is_empty() || !names.iter().all(|n| TYPE_NAMES.contains(n)) {
        return None;
    }
    Some(names.into_iter().map(str::to_string).collect())
}

/// The node's declared `type` set, when present and well-formed.
pub fn declared_types(keywords: &Keywords) -> Option<TypeSet> {
    keywords.get("type")?.as_literal().and_then(parse_types)
}

/// True if `types` admits at least one instance constrained by `family`.
pub fn admits(types: &TypeSet, family: Family) -> bool {
    family.type_names().iter().any(|t| types.contains(*t))
}

/// True if every instance admitted by `t` is also admitted by `types`.
pub fn covers(types: &TypeSet, t: &str) -> bool {
    types.contains(t) || (t == "integer" && types.contains("number"))
}

/// Drop `integer` when `number` is present; it is subsumed.
pub fn reduce_types(mut types: TypeSet) -> TypeSet {
    if types.contains("number") {
        types.remove("integer");
    }
    types
}

/// Intersection of two type sets, with `number ∩ integer = integer`.
pub fn intersect_types(a: &TypeSet, b: &TypeSet) -> TypeSet {
    a.iter()
        .filter_map(|t| {
            if b.contains(t) {
                Some(t.clone())
            } else if (t == "integer" && b.contains("number"))
                || (t == "number" && b.contains("integer"))
            {
                Some("integer".to_string())
            } else {
                None
            }
        })
        .collect()
}

pub fn is_universe(types: &TypeSet) -> bool {
    TYPE_UNIVERSE.iter().all(|t| types.contains(*t))
}

/// Canonical `type` value: a bare string for a singleton, a sorted array otherwise.
pub fn type_literal(types: &TypeSet) -> Value {
    if types.len() == 1 {
        if let Some(t) = types.iter().next() {
            return Value::String(t.clone());
        }
    }
    Value::Array(types.iter().cloned().map(Value::String).collect())
}

/// Rewrite a node whose `family` can accept nothing: the family's type leaves
/// `type`, and its keywords go. No type left means nothing is accepted.
pub fn exclude_family(mut keywords: Keywords, family: Family) -> Schema {
    let current = match keywords.get("type") {
        None => Some(TYPE_UNIVERSE.iter().map(|t| t.to_string()).collect()),
        Some(k) => k.as_literal().and_then(parse_types),
    };
    for name in family.keywords() {
        keywords.remove(*name);
    }
    // A malformed `type` stays as it was.
    if let Some(mut types) = current {
        types.retain(|t| !family.type_names().contains(&t.as_str()));
        if types.is_empty() {
            return Schema::Bool(false);
        }
        keywords.insert("type".to_string(), Keyword::Literal(type_literal(&types)));
    }
    Schema::Object(keywords)
}

// ---------------------------------------------------------------------------
// Literal getters
// ---------------------------------------------------------------------------

/// A numeric literal keyword value.
pub fn number_value<'a>(keywords: &'a Keywords, name: &str) -> Option<&'a Value> {
    keywords
        .get(name)
        .and_then(Keyword::as_literal)
        .filter(|v| v.is_number())
}

/// A non-negative integer literal (`5` or `5.0`), as used by length and count bounds.
pub fn count_value(keywords: &Keywords, name: &str) -> Option<u64> {
    let value = number_value(keywords, name)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

pub fn bool_value(keywords: &Keywords, name: &str) -> Option<bool> {
    keywords
        .get(name)
        .and_then(Keyword::as_literal)
        .and_then(Value::as_bool)
}

/// True if the keyword is a subschema that accepts everything.
pub fn is_true_subschema(keywords: &Keywords, name: &str) -> bool {
    keywords
        .get(name)
        .and_then(Keyword::as_subschema)
        .is_some_and(Schema::is_true)
}

/// True if the keyword is a subschema that accepts nothing.
pub fn is_false_subschema(keywords: &Keywords, name: &str) -> bool {
    keywords
        .get(name)
        .and_then(Keyword::as_subschema)
        .is_some_and(Schema::is_false)
}
