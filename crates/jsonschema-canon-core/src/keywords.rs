//! Keyword Traversal Table.
//!
//! Static knowledge of which keywords carry nested schemas and in what shape.
//! [`classify`] combines the static [`shape_of`] with the value's runtime shape
//! to build a [`Keyword`]; everything that does not fit becomes a
//! [`Keyword::Literal`] and is never recursed into. Adding a keyword is a
//! single-line change here.
//!
//! The parser and the normalizer never recurse into nested schemas. They take
//! a keyword apart into a [`Skeleton`] plus its nested schemas, work on those
//! from an explicit stack, and [`assemble`] the node once they are done.

use std::sync::Arc;

use serde_json::Value;

use crate::schema::{Keyword, Keywords, Schema};

// ---------------------------------------------------------------------------
// Keyword lists
// ---------------------------------------------------------------------------

/// Keywords whose values are arrays of sub-schemas.
pub const SEQUENCE_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];

/// Keywords whose values are single sub-schemas.
pub const SINGLE_KEYWORDS: &[&str] = &[
    "not",
    "additionalItems",
    "contains",
    "propertyNames",
    "additionalProperties",
    "unevaluatedItems",
    "unevaluatedProperties",
    "if",
    "then",
    "else",
];

/// Keywords whose values are maps of schemas.
pub const MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// Subschema keywords whose boolean value is written back as a boolean
/// regardless of [`crate::BooleanForm`].
pub(crate) const KEEPS_BOOLEAN: &[&str] = &["additionalProperties", "additionalItems"];

/// How a keyword carries nested schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Subschema,
    SubschemaSequence,
    SubschemaMapping,
    /// `items`: a single schema, or a tuple of schemas (draft 4–2019-09).
    SubschemaOrSequence,
    /// `dependencies`: schemas, property lists, or a mix of both.
    SubschemaOrLiteralMapping,
    Literal,
}

/// Static shape of a keyword, by name alone.
pub fn shape_of(keyword: &str) -> Shape {
    if SEQUENCE_KEYWORDS.contains(&keyword) {
        Shape::SubschemaSequence
    } else if SINGLE_KEYWORDS.contains(&keyword) {
        Shape::Subschema
    } else if MAP_KEYWORDS.contains(&keyword) {
        Shape::SubschemaMapping
    } else if keyword == "items" {
        Shape::SubschemaOrSequence
    } else if keyword == "dependencies" {
        Shape::SubschemaOrLiteralMapping
    } else {
        Shape::Literal
    }
}

/// Classify a keyword value using its name and its runtime shape.
///
/// A value whose runtime shape does not match the keyword (e.g. `properties`
/// given as an array) is kept verbatim as a literal.
pub fn classify(keyword: &str, value: Value) -> Keyword {
    let (skeleton, nested) = split_value(keyword, &value);
    let mut children = nested.into_iter().map(|v| Arc::new(Schema::parse_nested(v)));
    skeleton.fill(&mut children)
}

/// A keyword with its nested schemas taken out.
#[derive(Debug)]
pub(crate) enum Skeleton {
    Literal(Value),
    Subschema,
    Sequence(usize),
    Mapping(Vec<String>),
}

impl Skeleton {
    /// Take the nested schemas out of a keyword, in keyword order.
    pub(crate) fn split(keyword: Keyword) -> (Self, Vec<Arc<Schema>>) {
        match keyword {
            Keyword::Literal(v) => (Skeleton::Literal(v), Vec::new()),
            Keyword::Subschema(s) => (Skeleton::Subschema, vec![s]),
            Keyword::Sequence(seq) => (Skeleton::Sequence(seq.len()), seq),
            Keyword::Mapping(map) => {
                let (keys, schemas) = map.into_iter().unzip();
                (Skeleton::Mapping(keys), schemas)
            }
        }
    }

    /// Put nested schemas back, consuming as many from `children` as were taken out.
    pub(crate) fn fill(self, children: &mut impl Iterator<Item = Arc<Schema>>) -> Keyword {
        match self {
            Skeleton::Literal(v) => Keyword::Literal(v),
            Skeleton::Subschema => Keyword::Subschema(
                children
                    .next()
                    .unwrap_or_else(|| Arc::new(Schema::Bool(true))),
            ),
            Skeleton::Sequence(len) => Keyword::Sequence(children.take(len).collect()),
            Skeleton::Mapping(keys) => Keyword::Mapping(keys.into_iter().zip(children).collect()),
        }
    }
}

/// Classify without descending: the skeleton plus the nested schema values,
/// each of which is an object or a boolean.
pub(crate) fn split_value<'a>(keyword: &str, value: &'a Value) -> (Skeleton, Vec<&'a Value>) {
    let shape = shape_of(keyword);
    let matched = match shape {
        Shape::Literal => false,
        Shape::Subschema => is_schema_value(value),
        Shape::SubschemaSequence => is_schema_array(value),
        Shape::SubschemaMapping | Shape::SubschemaOrLiteralMapping => is_schema_map(value),
        Shape::SubschemaOrSequence => is_schema_value(value) || is_schema_array(value),
    };

    if !matched {
        if shape != Shape::Literal && shape != Shape::SubschemaOrLiteralMapping {
            tracing::trace!(keyword, "keyword shape mismatch, keeping literal");
        }
        return (Skeleton::Literal(value.clone()), Vec::new());
    }

    match value {
        Value::Array(items) => (Skeleton::Sequence(items.len()), items.iter().collect()),
        Value::Object(map) if shape != Shape::Subschema && shape != Shape::SubschemaOrSequence => (
            Skeleton::Mapping(map.keys().cloned().collect()),
            map.values().collect(),
        ),
        other => (Skeleton::Subschema, vec![other]),
    }
}

/// Rebuild a node's keywords from their skeletons and the nested schemas, in order.
pub(crate) fn assemble(skeleton: Vec<(String, Skeleton)>, children: Vec<Arc<Schema>>) -> Keywords {
    let mut children = children.into_iter();
    skeleton
        .into_iter()
        .map(|(name, shape)| {
            let keyword = shape.fill(&mut children);
            (name, keyword)
        })
        .collect()
}

fn is_schema_value(value: &Value) -> bool {
    value.is_object() || value.is_boolean()
}

fn is_schema_array(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(is_schema_value))
}

fn is_schema_map(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.values().all(is_schema_value))
}
