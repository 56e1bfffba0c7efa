//! collapse-boolean, strip-metadata, cleanup-empty.

use super::rule_utils::is_metadata;
use super::RuleContext;
use crate::keywords::{MAP_KEYWORDS, SEQUENCE_KEYWORDS};
use crate::schema::{Keyword, Keywords, Schema};

/// Keywords removed when they hold an empty sequence or mapping. An empty
/// `anyOf`/`oneOf` rejects everything and is left to merge-anyOf-oneOf.
fn is_cleanup_target(name: &str) -> bool {
    (SEQUENCE_KEYWORDS.contains(&name) && !matches!(name, "anyOf" | "oneOf"))
        || MAP_KEYWORDS.contains(&name)
        || matches!(
            name,
            "items" | "required" | "dependencies" | "dependentRequired"
        )
}

pub(super) fn collapse_applies(keywords: &Keywords, ctx: &RuleContext) -> bool {
    keywords.is_empty() || (ctx.strip_metadata && keywords.keys().all(|k| is_metadata(k)))
}

pub(super) fn collapse(_: Keywords, _: &RuleContext) -> Schema {
    Schema::Bool(true)
}

pub(super) fn strip_metadata_applies(keywords: &Keywords, ctx: &RuleContext) -> bool {
    ctx.strip_metadata && keywords.keys().any(|k| is_metadata(k))
}

pub(super) fn strip_metadata(mut keywords: Keywords, _: &RuleContext) -> Schema {
    keywords.retain(|k, _| !is_metadata(k));
    Schema::Object(keywords)
}

fn is_empty_target(name: &str, keyword: &Keyword) -> bool {
    is_cleanup_target(name) && keyword.is_empty_collection()
}

pub(super) fn cleanup_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    keywords.iter().any(|(k, v)| is_empty_target(k, v))
}

pub(super) fn cleanup(mut keywords: Keywords, _: &RuleContext) -> Schema {
    keywords.retain(|k, v| !is_empty_target(k, v));
    Schema::Object(keywords)
}
