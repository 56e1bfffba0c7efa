//! Rule Catalog.
//!
//! Each rule is a pure rewrite of a single schema node: an applicability
//! predicate plus an apply function that consumes the node and returns its
//! replacement. Predicates are exact: a rule applies only when applying it
//! changes the node, so the driver can stop on the first full scan where no
//! predicate holds.
//!
//! Rules assume the node's children are already normalized. Each owns one
//! concern; [`RULES`] fixes the scan order.

use crate::schema::{Keywords, Schema};

pub mod rule_utils;

mod arrays;
mod boolean;
mod composition;
mod conditional;
mod enums;
pub(crate) mod merge;
mod negation;
mod numeric;
mod objects;
mod strings;
mod types;

/// Per-call settings visible to every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// `strip-metadata` is enabled.
    pub strip_metadata: bool,
    /// The document uses `unevaluatedProperties`/`unevaluatedItems`, so
    /// subschemas that may produce evaluation annotations must not be dropped.
    pub preserve_annotations: bool,
}

/// A named rewrite rule.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&Keywords, &RuleContext) -> bool,
    pub apply: fn(Keywords, &RuleContext) -> Schema,
    /// The rewrite may introduce subschemas that are not yet normalized.
    pub renormalize: bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("renormalize", &self.renormalize)
            .finish()
    }
}

const fn rule(
    name: &'static str,
    applies: fn(&Keywords, &RuleContext) -> bool,
    apply: fn(Keywords, &RuleContext) -> Schema,
) -> Rule {
    Rule {
        name,
        applies,
        apply,
        renormalize: false,
    }
}

const fn reshaping_rule(
    name: &'static str,
    applies: fn(&Keywords, &RuleContext) -> bool,
    apply: fn(Keywords, &RuleContext) -> Schema,
) -> Rule {
    Rule {
        name,
        applies,
        apply,
        renormalize: true,
    }
}

/// The catalog, in scan order.
pub static RULES: &[Rule] = &[
    rule("collapse-boolean", boolean::collapse_applies, boolean::collapse),
    rule("collapse-negated-true", negation::negated_true_applies, negation::negated_true),
    rule("drop-negated-false", negation::negated_false_applies, negation::negated_false),
    rule("strip-metadata", boolean::strip_metadata_applies, boolean::strip_metadata),
    rule("contradicting-not-type", negation::contradiction_applies, negation::contradiction),
    rule("canon-type", types::canon_type_applies, types::canon_type),
    rule("prune-inapplicable", types::prune_applies, types::prune),
    rule("canon-number-bounds", numeric::bounds_applies, numeric::bounds),
    rule("drop-trivial-multipleOf", numeric::multiple_of_applies, numeric::multiple_of),
    rule("canon-string-length", strings::length_applies, strings::length),
    rule("pattern-to-enum", strings::pattern_applies, strings::pattern_to_enum),
    rule("canon-array-items", arrays::items_applies, arrays::items),
    rule("canon-array-bounds", arrays::bounds_applies, arrays::bounds),
    rule("canon-object", objects::object_applies, objects::object),
    rule("canon-enum-const", enums::enum_applies, enums::enum_const),
    reshaping_rule("merge-allOf", composition::all_of_applies, composition::all_of),
    reshaping_rule("merge-anyOf-oneOf", composition::any_one_of_applies, composition::any_one_of),
    reshaping_rule("collapse-double-not", negation::double_not_applies, negation::double_not),
    reshaping_rule("canon-if-then-else", conditional::applies, conditional::if_then_else),
    reshaping_rule("canon-dependencies", objects::dependencies_applies, objects::dependencies),
    rule("cleanup-empty", boolean::cleanup_applies, boolean::cleanup),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_names_are_unique() {
        let names: HashSet<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn test_catalog_starts_with_boolean_collapse() {
        assert_eq!(RULES[0].name, "collapse-boolean");
        assert_eq!(RULES.last().map(|r| r.name), Some("cleanup-empty"));
    }
}
