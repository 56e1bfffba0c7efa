//! Equivalence Oracle.
//!
//! Empirical check that two schemas accept the same instances, by running a
//! real validator over a caller-supplied corpus. This is a sampling
//! approximation of semantic equivalence, not a decision procedure: schemas
//! that agree on every instance in the corpus may still differ elsewhere.
//!
//! Not used by [`crate::normalize`]; it exists to test the engine and to back
//! the CLI's `compare --corpus`.

use serde_json::Value;

use crate::error::CanonError;

pub use jsonschema::Draft;

/// Compares schemas by acceptance over an instance corpus.
#[derive(Debug, Clone, Copy)]
pub struct EquivalenceOracle {
    draft: Draft,
}

impl Default for EquivalenceOracle {
    fn default() -> Self {
        Self::new(Draft::Draft202012)
    }
}

impl EquivalenceOracle {
    pub fn new(draft: Draft) -> Self {
        Self { draft }
    }

    fn acceptance(&self, schema: &Value, corpus: &[Value]) -> Result<Vec<bool>, CanonError> {
        let validator = jsonschema::options()
            .with_draft(self.draft)
            .build(schema)
            .map_err(|e| CanonError::Oracle {
                message: e.to_string(),
            })?;
        Ok(corpus.iter().map(|instance| validator.is_valid(instance)).collect())
    }

    /// Indices of the corpus instances accepted by exactly one of `a` and `b`.
    pub fn disagreements(&self, a: &Value, b: &Value, corpus: &[Value]) -> Result<Vec<usize>, CanonError> {
        let left = self.acceptance(a, corpus)?;
        let right = self.acceptance(b, corpus)?;
        Ok(left
            .iter()
            .zip(right.iter())
            .enumerate()
            .filter(|(_, (l, r))| l != r)
            .map(|(i, _)| i)
            .collect())
    }

    /// True if `a` and `b` accept exactly the same subset of `corpus`.
    pub fn is_equivalent(&self, a: &Value, b: &Value, corpus: &[Value]) -> Result<bool, CanonError> {
        Ok(self.disagreements(a, b, corpus)?.is_empty())
    }
}

/// [`EquivalenceOracle::is_equivalent`] under draft 2020-12.
pub fn is_equivalent(a: &Value, b: &Value, corpus: &[Value]) -> Result<bool, CanonError> {
    EquivalenceOracle::default().is_equivalent(a, b, corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn corpus() -> Vec<Value> {
        vec![
            json!(null),
            json!(true),
            json!(0),
            json!(1.5),
            json!("foo"),
            json!("bar"),
            json!([1, 2]),
            json!({ "a": 1 }),
        ]
    }

    #[test]
    fn test_equivalent_spellings() {
        let a = json!({ "type": ["string", "string", "number"] });
        let b = json!({ "type": ["number", "string"] });
        assert!(is_equivalent(&a, &b, &corpus()).unwrap());
    }

    #[test]
    fn test_disagreements_listed() {
        let a = json!({ "type": "string" });
        let b = json!({ "const": "foo" });
        let oracle = EquivalenceOracle::default();
        assert_eq!(oracle.disagreements(&a, &b, &corpus()).unwrap(), vec![5]);
    }

    #[test]
    fn test_boolean_and_empty_schemas() {
        assert!(is_equivalent(&json!(true), &json!({}), &corpus()).unwrap());
        assert!(is_equivalent(&json!(false), &json!({ "not": {} }), &corpus()).unwrap());
    }

    #[test]
    fn test_invalid_schema_is_an_error() {
        let err = is_equivalent(&json!({ "type": 12 }), &json!({}), &corpus()).unwrap_err();
        assert!(matches!(err, CanonError::Oracle { .. }));
    }
}
