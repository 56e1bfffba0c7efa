//! Rules over `not`.

use std::sync::Arc;

use super::merge::{can_merge, merge_into};
use super::rule_utils::{covers, declared_types, is_false_subschema, is_true_subschema, parse_types};
use super::RuleContext;
use crate::schema::{Keyword, Keywords, Schema};

pub(super) fn negated_true_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    is_true_subschema(keywords, "not")
}

pub(super) fn negated_true(_: Keywords, _: &RuleContext) -> Schema {
    Schema::Bool(false)
}

pub(super) fn negated_false_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    is_false_subschema(keywords, "not")
}

pub(super) fn negated_false(mut keywords: Keywords, _: &RuleContext) -> Schema {
    keywords.remove("not");
    Schema::Object(keywords)
}

// ---------------------------------------------------------------------------
// contradicting-not-type
// ---------------------------------------------------------------------------

/// `{"type": T, "not": {"type": U}}` where U admits everything T admits.
pub(super) fn contradiction_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    let Some(types) = declared_types(keywords) else {
        return false;
    };
    let Some(("type", Keyword::Literal(negated))) = keywords
        .get("not")
        .and_then(Keyword::as_subschema)
        .and_then(Schema::single_keyword)
    else {
        return false;
    };
    parse_types(negated).is_some_and(|negated| types.iter().all(|t| covers(&negated, t)))
}

pub(super) fn contradiction(_: Keywords, _: &RuleContext) -> Schema {
    Schema::Bool(false)
}

// ---------------------------------------------------------------------------
// collapse-double-not
// ---------------------------------------------------------------------------

/// The schema wrapped by `{"not": {"not": X}}`.
fn double_negated(keywords: &Keywords) -> Option<&Arc<Schema>> {
    let inner = keywords.get("not").and_then(Keyword::as_subschema)?;
    match inner.single_keyword()? {
        ("not", Keyword::Subschema(x)) => Some(x),
        _ => None,
    }
}

pub(super) fn double_not_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    double_negated(keywords).is_some_and(|x| can_merge(keywords, "not", x))
}

pub(super) fn double_not(mut keywords: Keywords, _: &RuleContext) -> Schema {
    let inner = double_negated(&keywords).map(|x| Arc::unwrap_or_clone(x.clone()));
    match inner {
        Some(x) => {
            keywords.remove("not");
            merge_into(keywords, x)
        }
        None => Schema::Object(keywords),
    }
}
