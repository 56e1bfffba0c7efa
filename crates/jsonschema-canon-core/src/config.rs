//! Configuration for schema canonicalization.

use serde::{Deserialize, Serialize};

/// How boolean leaves are written back out at the JSON boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BooleanForm {
    /// `true` / `false` (draft 6 and later).
    #[default]
    Literal,
    /// `{}` / `{"not": {}}`, for consumers that only understand object schemas.
    /// `additionalProperties` and `additionalItems` keep their boolean value,
    /// which every draft accepts.
    Object,
}

/// Options for schema normalization.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `strip-metadata`, `max-depth`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NormalizeOptions {
    /// Remove annotation-only keywords (`title`, `description`, ...).
    /// Default: true.
    pub strip_metadata: bool,
    /// Optional nesting limit imposed by the host. `None` means unlimited.
    pub max_depth: Option<usize>,
    /// Encoding of boolean leaves in the output.
    pub boolean_form: BooleanForm,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            strip_metadata: true,
            max_depth: None,
            boolean_form: BooleanForm::Literal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_options_serde_round_trip() {
        let opts = NormalizeOptions {
            strip_metadata: false,
            max_depth: Some(64),
            boolean_form: BooleanForm::Object,
        };

        let json = serde_json::to_string(&opts).unwrap();

        assert!(json.contains("\"strip-metadata\""));
        assert!(json.contains("\"max-depth\""));
        assert!(json.contains("\"object\""));

        let deserialized: NormalizeOptions = serde_json::from_str(&json).unwrap();
        assert!(!deserialized.strip_metadata);
        assert_eq!(deserialized.max_depth, Some(64));
        assert_eq!(deserialized.boolean_form, BooleanForm::Object);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let opts: NormalizeOptions = serde_json::from_str("{}").unwrap();
        assert!(opts.strip_metadata);
        assert_eq!(opts.max_depth, None);
        assert_eq!(opts.boolean_form, BooleanForm::Literal);
    }
}
