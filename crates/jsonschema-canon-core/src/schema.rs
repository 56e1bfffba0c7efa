//! Schema Node model.
//!
//! A [`Schema`] is either a boolean leaf or a node carrying keywords. Every
//! keyword value is classified once, at parse time, by the traversal table in
//! [`crate::keywords`]: nested schemas live behind [`Arc`] so rewrites can
//! share untouched subtrees instead of copying them.
//!
//! The JSON boundary is crossed exactly twice: [`Schema::from_json`] on the
//! way in and [`Schema::to_value`] on the way out. Both keep their own stack
//! of pending nodes, so nesting depth is bounded by the heap.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::BooleanForm;
use crate::error::CanonError;
use crate::keywords::{self, Skeleton};

/// Keywords of a schema node, ordered by name.
pub type Keywords = BTreeMap<String, Keyword>;

/// A JSON Schema: boolean leaf or keyword-bearing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Bool(bool),
    Object(Keywords),
}

/// A classified keyword value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    /// Anything that is not a nested schema (`minimum`, `required`, `type`, unknown keywords,
    /// and schema keywords whose runtime shape did not match).
    Literal(Value),
    /// A single nested schema (`not`, `items` object form, `additionalProperties`, ...).
    Subschema(Arc<Schema>),
    /// An ordered sequence of schemas (`allOf`, `anyOf`, `oneOf`, `prefixItems`, tuple `items`).
    Sequence(Vec<Arc<Schema>>),
    /// Named schemas (`properties`, `patternProperties`, `dependentSchemas`, ...).
    Mapping(BTreeMap<String, Arc<Schema>>),
}

impl Schema {
    /// Parse a top-level schema. Fails only when the value is neither an object nor a boolean.
    pub fn from_value(value: Value) -> Result<Self, CanonError> {
        Self::from_json(&value)
    }

    /// Like [`Schema::from_value`], without taking ownership of the document.
    pub fn from_json(value: &Value) -> Result<Self, CanonError> {
        parse_tree(value).ok_or_else(|| CanonError::InvalidInputKind {
            found: kind_name(value),
        })
    }

    /// Parse a nested schema value already checked to be an object or a boolean.
    pub(crate) fn parse_nested(value: &Value) -> Self {
        parse_tree(value).unwrap_or(Schema::Bool(true))
    }

    /// Encode back to JSON.
    pub fn to_value(&self, form: BooleanForm) -> Value {
        enum Task<'a> {
            Encode(&'a Schema, bool),
            Build(&'a Keywords),
        }

        let mut tasks = vec![Task::Encode(self, false)];
        let mut values: Vec<Value> = Vec::new();
        while let Some(task) = tasks.pop() {
            match task {
                // Boolean `additionalProperties`/`additionalItems` are valid in every draft.
                Task::Encode(Schema::Bool(b), true) => values.push(Value::Bool(*b)),
                Task::Encode(Schema::Bool(b), false) => values.push(bool_value(*b, form)),
                Task::Encode(Schema::Object(keywords), _) => {
                    tasks.push(Task::Build(keywords));
                    let children: Vec<Task<'_>> = keywords
                        .iter()
                        .flat_map(|(name, keyword)| {
                            let keep = matches!(keyword, Keyword::Subschema(_))
                                && keywords::KEEPS_BOOLEAN.contains(&name.as_str());
                            keyword.subschemas().map(move |s| Task::Encode(s, keep))
                        })
                        .collect();
                    // Reversed, so children finish in keyword order.
                    tasks.extend(children.into_iter().rev());
                }
                Task::Build(keywords) => {
                    let arity: usize = keywords.values().map(|k| k.subschemas().count()).sum();
                    let mut children = values.split_off(values.len() - arity).into_iter();
                    let mut obj = Map::new();
                    for (name, keyword) in keywords {
                        let value = match keyword {
                            Keyword::Literal(v) => v.clone(),
                            Keyword::Subschema(_) => children.next().unwrap_or_default(),
                            Keyword::Sequence(seq) => {
                                Value::Array(children.by_ref().take(seq.len()).collect())
                            }
                            Keyword::Mapping(map) => Value::Object(
                                map.keys().cloned().zip(children.by_ref()).collect(),
                            ),
                        };
                        obj.insert(name.clone(), value);
                    }
                    values.push(Value::Object(obj));
                }
            }
        }
        values.pop().unwrap_or_default()
    }

    /// Wrap a single keyword into a node.
    pub fn single(name: &str, keyword: Keyword) -> Self {
        let mut keywords = Keywords::new();
        keywords.insert(name.to_string(), keyword);
        Schema::Object(keywords)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Schema::Bool(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Schema::Bool(false))
    }

    pub fn as_keywords(&self) -> Option<&Keywords> {
        match self {
            Schema::Object(keywords) => Some(keywords),
            Schema::Bool(_) => None,
        }
    }

    /// The only keyword of this node, if it has exactly one.
    pub fn single_keyword(&self) -> Option<(&str, &Keyword)> {
        let keywords = self.as_keywords()?;
        if keywords.len() != 1 {
            return None;
        }
        keywords.iter().next().map(|(k, v)| (k.as_str(), v))
    }

    /// True if any node in this tree carries one of `names`.
    pub fn mentions_any(&self, names: &[&str]) -> bool {
        let mut stack = vec![self];
        while let Some(schema) = stack.pop() {
            let Schema::Object(keywords) = schema else {
                continue;
            };
            for (name, keyword) in keywords {
                if names.contains(&name.as_str()) {
                    return true;
                }
                stack.extend(keyword.subschemas());
            }
        }
        false
    }
}

impl Keyword {
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Keyword::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_subschema(&self) -> Option<&Schema> {
        match self {
            Keyword::Subschema(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Arc<Schema>]> {
        match self {
            Keyword::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Arc<Schema>>> {
        match self {
            Keyword::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Nested schemas carried by this keyword, in keyword order.
    pub fn subschemas(&self) -> Box<dyn Iterator<Item = &Schema> + '_> {
        match self {
            Keyword::Literal(_) => Box::new(std::iter::empty()),
            Keyword::Subschema(s) => Box::new(std::iter::once(s.as_ref())),
            Keyword::Sequence(seq) => Box::new(seq.iter().map(Arc::as_ref)),
            Keyword::Mapping(map) => Box::new(map.values().map(Arc::as_ref)),
        }
    }

    /// True for an empty sequence or mapping (literal arrays and objects included).
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Keyword::Sequence(seq) => seq.is_empty(),
            Keyword::Mapping(map) => map.is_empty(),
            Keyword::Literal(Value::Array(arr)) => arr.is_empty(),
            Keyword::Literal(Value::Object(obj)) => obj.is_empty(),
            _ => false,
        }
    }

}

/// Parse with an explicit stack of open nodes. `None` when `root` is not a schema.
fn parse_tree(root: &Value) -> Option<Schema> {
    struct Frame<'a> {
        skeleton: Vec<(String, Skeleton)>,
        pending: std::vec::IntoIter<&'a Value>,
        done: Vec<Arc<Schema>>,
    }

    fn open(map: &Map<String, Value>) -> Frame<'_> {
        let mut skeleton = Vec::with_capacity(map.len());
        let mut nested = Vec::new();
        for (name, value) in map {
            let (shape, children) = keywords::split_value(name, value);
            skeleton.push((name.clone(), shape));
            nested.extend(children);
        }
        Frame {
            skeleton,
            done: Vec::with_capacity(nested.len()),
            pending: nested.into_iter(),
        }
    }

    let map = match root {
        Value::Bool(b) => return Some(Schema::Bool(*b)),
        Value::Object(map) => map,
        _ => return None,
    };
    let mut current = open(map);
    let mut parents = Vec::new();
    loop {
        match current.pending.next() {
            Some(Value::Object(map)) => parents.push(std::mem::replace(&mut current, open(map))),
            Some(leaf) => current
                .done
                .push(Arc::new(Schema::Bool(leaf.as_bool().unwrap_or(true)))),
            None => {
                let Frame { skeleton, done, .. } = current;
                let node = Schema::Object(keywords::assemble(skeleton, done));
                match parents.pop() {
                    Some(parent) => {
                        current = parent;
                        current.done.push(Arc::new(node));
                    }
                    None => return Some(node),
                }
            }
        }
    }
}

fn bool_value(b: bool, form: BooleanForm) -> Value {
    match (form, b) {
        (BooleanForm::Literal, _) => Value::Bool(b),
        (BooleanForm::Object, true) => Value::Object(Map::new()),
        (BooleanForm::Object, false) => {
            let mut obj = Map::new();
            obj.insert("not".to_string(), Value::Object(Map::new()));
            Value::Object(obj)
        }
    }
}

/// JSON kind of a value, for error messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
