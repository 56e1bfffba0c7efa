//! Fixed-Point Driver.
//!
//! Normalizes a schema tree bottom-up: every nested schema reachable through
//! the traversal table is normalized first, then the rule catalog is scanned
//! in order against the node itself. After each applied rule the scan restarts
//! from the top of the catalog; it ends when a full scan applies nothing or
//! the node has become a boolean leaf.
//!
//! The walk keeps its own stack of [`Frame`]s, one per node whose children
//! are still being normalized, so deep schemas cost heap rather than call
//! stack. A child is moved out of its [`Arc`] when uniquely owned and cloned
//! otherwise.

use std::sync::Arc;

use serde::Serialize;

use crate::config::NormalizeOptions;
use crate::error::CanonError;
use crate::keywords::{self, Skeleton};
use crate::rules::{RuleContext, RULES};
use crate::schema::{Keywords, Schema};
use crate::schema_utils::build_path;

/// Rewrites allowed on a single node before the scan gives up.
///
/// Every rule shrinks the node or collapses it, so real schemas settle long
/// before this.
const MAX_REWRITES_PER_NODE: usize = 10_000;

/// One rule application, reported against the JSON Pointer of the node it rewrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRule {
    pub rule: &'static str,
    pub path: String,
}

/// Schema normalizer.
///
/// ```
/// use jsonschema_canon_core::{NormalizeOptions, Normalizer, Schema};
/// use serde_json::json;
///
/// let normalizer = Normalizer::new(NormalizeOptions::default());
/// let schema = Schema::from_value(json!({ "not": { "not": { "type": "string" } } })).unwrap();
/// let canonical = normalizer.normalize_node(schema).unwrap();
/// assert_eq!(canonical, Schema::from_value(json!({ "type": "string" })).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Normalize a schema tree to its canonical form.
    pub fn normalize_node(&self, schema: Schema) -> Result<Schema, CanonError> {
        self.normalize_traced(schema).map(|(schema, _)| schema)
    }

    /// Normalize a schema tree, also returning every rule application in order.
    pub fn normalize_traced(&self, schema: Schema) -> Result<(Schema, Vec<AppliedRule>), CanonError> {
        let preserve_annotations = consumes_annotations(&schema);
        let mut walk = Walk {
            ctx: RuleContext {
                strip_metadata: self.options.strip_metadata,
                preserve_annotations,
            },
            max_depth: self.options.max_depth,
            applied: Vec::new(),
        };
        let mut schema = walk.run(schema)?;

        // Rules never add `unevaluated*`; once the last one is gone, annotations
        // no longer matter and the rules held back for them can run.
        if preserve_annotations && !consumes_annotations(&schema) {
            walk.ctx.preserve_annotations = false;
            schema = walk.run(schema)?;
        }
        Ok((schema, walk.applied))
    }
}

fn consumes_annotations(schema: &Schema) -> bool {
    schema.mentions_any(&["unevaluatedProperties", "unevaluatedItems"])
}

/// State of one normalization call.
struct Walk {
    ctx: RuleContext,
    max_depth: Option<usize>,
    applied: Vec<AppliedRule>,
}

/// A node waiting on its children.
struct Frame {
    path: String,
    depth: usize,
    /// Rules applied to this node so far.
    rewrites: usize,
    skeleton: Vec<(String, Skeleton)>,
    /// Children still to normalize, with their paths.
    pending: std::vec::IntoIter<(String, Arc<Schema>)>,
    done: Vec<Arc<Schema>>,
}

impl Frame {
    fn open(keywords: Keywords, path: String, depth: usize, rewrites: usize) -> Self {
        let mut skeleton = Vec::with_capacity(keywords.len());
        let mut pending = Vec::new();
        for (name, keyword) in keywords {
            let (shape, children) = Skeleton::split(keyword);
            let paths: Vec<String> = match &shape {
                Skeleton::Literal(_) => Vec::new(),
                Skeleton::Subschema => vec![build_path(&path, &[&name])],
                Skeleton::Sequence(len) => (0..*len)
                    .map(|i| build_path(&path, &[&name, &i.to_string()]))
                    .collect(),
                Skeleton::Mapping(keys) => keys
                    .iter()
                    .map(|key| build_path(&path, &[&name, key]))
                    .collect(),
            };
            pending.extend(paths.into_iter().zip(children));
            skeleton.push((name, shape));
        }
        Self {
            path,
            depth,
            rewrites,
            skeleton,
            done: Vec::with_capacity(pending.len()),
            pending: pending.into_iter(),
        }
    }
}

enum Scan {
    /// No rule applies any more.
    Settled(Schema),
    /// A rule built new children; they need normalizing before the scan resumes.
    Reshaped(Keywords),
}

impl Walk {
    fn run(&mut self, root: Schema) -> Result<Schema, CanonError> {
        let keywords = match root {
            Schema::Object(keywords) => keywords,
            leaf => return Ok(leaf),
        };
        let mut current = Frame::open(keywords, "#".to_string(), 0, 0);
        let mut parents: Vec<Frame> = Vec::new();
        loop {
            if let Some((path, child)) = current.pending.next() {
                let depth = current.depth + 1;
                match Arc::unwrap_or_clone(child) {
                    Schema::Object(keywords) => {
                        self.check_depth(&path, depth)?;
                        let frame = Frame::open(keywords, path, depth, 0);
                        parents.push(std::mem::replace(&mut current, frame));
                    }
                    leaf => current.done.push(Arc::new(leaf)),
                }
                continue;
            }

            let Frame {
                path,
                depth,
                mut rewrites,
                skeleton,
                done,
                ..
            } = current;
            let node = Schema::Object(keywords::assemble(skeleton, done));
            let settled = match self.rewrite(node, &path, &mut rewrites) {
                Scan::Settled(node) => node,
                Scan::Reshaped(keywords) => {
                    current = Frame::open(keywords, path, depth, rewrites);
                    continue;
                }
            };
            match parents.pop() {
                Some(parent) => {
                    current = parent;
                    current.done.push(Arc::new(settled));
                }
                None => return Ok(settled),
            }
        }
    }

    fn check_depth(&self, path: &str, depth: usize) -> Result<(), CanonError> {
        match self.max_depth {
            Some(max_depth) if depth > max_depth => Err(CanonError::RecursionDepthExceeded {
                path: path.to_string(),
                max_depth,
            }),
            _ => Ok(()),
        }
    }

    /// Scan the catalog against a node whose children are normalized.
    fn rewrite(&mut self, mut schema: Schema, path: &str, rewrites: &mut usize) -> Scan {
        loop {
            let keywords = match schema {
                Schema::Object(keywords) => keywords,
                leaf => return Scan::Settled(leaf),
            };
            let Some(rule) = RULES.iter().find(|r| (r.applies)(&keywords, &self.ctx)) else {
                return Scan::Settled(Schema::Object(keywords));
            };

            *rewrites += 1;
            if *rewrites > MAX_REWRITES_PER_NODE {
                tracing::warn!(path, rule = rule.name, "rewrite limit reached, node left as is");
                return Scan::Settled(Schema::Object(keywords));
            }

            tracing::debug!(rule = rule.name, path, "rule applied");
            self.applied.push(AppliedRule {
                rule: rule.name,
                path: path.to_string(),
            });
            schema = (rule.apply)(keywords, &self.ctx);
            if rule.renormalize {
                return match schema {
                    Schema::Object(keywords) => Scan::Reshaped(keywords),
                    leaf => Scan::Settled(leaf),
                };
            }
        }
    }
}
