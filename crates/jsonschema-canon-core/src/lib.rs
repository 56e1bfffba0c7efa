//! # jsonschema-canon-core
//!
//! Canonicalize JSON Schema documents into a validation-equivalent normal form.
//!
//! Two schemas that accept the same instances but are written differently
//! (`{"type": ["string", "string"]}` and `{"type": "string"}`,
//! `{"allOf": [{"not": {"not": X}}]}` and `X`) normalize to the same output,
//! so they can be compared, deduplicated and diffed structurally.
//!
//! The engine recurses bottom-up through every nested schema and applies an
//! ordered catalog of rewrite rules ([`RULES`]) to each node until none
//! applies. Every rule preserves the set of accepted instances; the result is
//! a deterministic fixed point of the catalog, not a globally minimal schema.
//!
//! ```
//! use jsonschema_canon_core::{normalize, NormalizeOptions};
//! use serde_json::json;
//!
//! let schema = json!({ "title": "X", "required": ["foo", "foo"] });
//! let result = normalize(&schema, &NormalizeOptions::default()).unwrap();
//! assert_eq!(result.schema, json!({ "required": ["foo"] }));
//! ```

pub mod config;
pub mod error;
pub mod keywords;
pub mod normalizer;
#[cfg(feature = "oracle")]
pub mod oracle;
pub mod ordering;
pub mod rules;
pub mod schema;
pub mod schema_utils;

use serde::Serialize;
use serde_json::Value;

pub use config::{BooleanForm, NormalizeOptions};
pub use error::CanonError;
pub use normalizer::{AppliedRule, Normalizer};
#[cfg(feature = "oracle")]
pub use oracle::{is_equivalent, Draft, EquivalenceOracle};
pub use ordering::{canonical_cmp, canonical_dedup_sort, canonical_eq};
pub use rules::{Rule, RuleContext, RULES};
pub use schema::{Keyword, Keywords, Schema};
pub use schema_utils::build_path;

/// Output of [`normalize`].
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeResult {
    /// The canonical schema, encoded per [`NormalizeOptions::boolean_form`].
    pub schema: Value,
    /// Every rule application, in order.
    pub applied: Vec<AppliedRule>,
}

/// Normalize a JSON Schema value.
///
/// Fails with [`CanonError::InvalidInputKind`] when `schema` is neither an
/// object nor a boolean, and with [`CanonError::RecursionDepthExceeded`] only
/// when [`NormalizeOptions::max_depth`] is set.
pub fn normalize(schema: &Value, options: &NormalizeOptions) -> Result<NormalizeResult, CanonError> {
    let parsed = Schema::from_json(schema)?;
    let (canonical, applied) = Normalizer::new(options.clone()).normalize_traced(parsed)?;
    tracing::debug!(rules = applied.len(), "normalization complete");
    Ok(NormalizeResult {
        schema: canonical.to_value(options.boolean_form),
        applied,
    })
}

/// Normalize a JSON Schema given as text.
pub fn normalize_str(text: &str, options: &NormalizeOptions) -> Result<NormalizeResult, CanonError> {
    let value: Value = serde_json::from_str(text)?;
    normalize(&value, options)
}
