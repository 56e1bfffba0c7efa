//! Error types for schema canonicalization.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanonError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid schema: expected an object or a boolean at the top level, found {found}")]
    InvalidInputKind { found: &'static str },

    #[error("Recursion depth exceeded at {path} (max: {max_depth})")]
    RecursionDepthExceeded { path: String, max_depth: usize },

    #[error("Equivalence oracle error: {message}")]
    Oracle { message: String },
}
