//! canon-if-then-else.
//!
//! A branch that always applies is appended to the node's `allOf`, where
//! merge-allOf folds it into the parent.

use std::sync::Arc;

use super::RuleContext;
use crate::schema::{Keyword, Keywords, Schema};

enum Fix {
    /// Remove the listed keywords.
    Drop(&'static [&'static str]),
    /// Remove `if`/`then`/`else` and require the branch unconditionally.
    Collapse(&'static str),
}

fn subschema<'a>(keywords: &'a Keywords, name: &str) -> Option<&'a Arc<Schema>> {
    match keywords.get(name)? {
        Keyword::Subschema(s) => Some(s),
        _ => None,
    }
}

fn plan(keywords: &Keywords, ctx: &RuleContext) -> Option<Fix> {
    let then = subschema(keywords, "then");
    let otherwise = subschema(keywords, "else");
    // Collapsing needs somewhere to put the branch.
    let can_collapse = !matches!(keywords.get("allOf"), Some(k) if k.as_sequence().is_none());

    let Some(condition) = subschema(keywords, "if") else {
        if keywords.contains_key("if") {
            return None;
        }
        return (then.is_some() || otherwise.is_some()).then_some(Fix::Drop(&["then", "else"]));
    };

    match condition.as_ref() {
        Schema::Bool(true) => match then {
            Some(_) if can_collapse => Some(Fix::Collapse("then")),
            Some(_) => None,
            None => Some(Fix::Drop(&["if", "else"])),
        },
        Schema::Bool(false) => match otherwise {
            Some(_) if can_collapse => Some(Fix::Collapse("else")),
            Some(_) => None,
            None => Some(Fix::Drop(&["if", "then"])),
        },
        // `if` annotations are visible to `unevaluated*` when it passes.
        Schema::Object(_) if ctx.preserve_annotations => None,
        Schema::Object(_) => match (then, otherwise) {
            (None, None) => Some(Fix::Drop(&["if"])),
            (Some(t), Some(e)) if t == e && can_collapse => Some(Fix::Collapse("then")),
            (Some(t), None) if t.is_true() => Some(Fix::Drop(&["if", "then"])),
            (None, Some(e)) if e.is_true() => Some(Fix::Drop(&["if", "else"])),
            _ => None,
        },
    }
}

pub(super) fn applies(keywords: &Keywords, ctx: &RuleContext) -> bool {
    plan(keywords, ctx).is_some()
}

pub(super) fn if_then_else(mut keywords: Keywords, ctx: &RuleContext) -> Schema {
    match plan(&keywords, ctx) {
        Some(Fix::Drop(names)) => {
            for name in names {
                keywords.remove(*name);
            }
        }
        Some(Fix::Collapse(branch)) => {
            let kept = match keywords.remove(branch) {
                Some(Keyword::Subschema(s)) => s,
                _ => Arc::new(Schema::Bool(true)),
            };
            for name in ["if", "then", "else"] {
                keywords.remove(name);
            }
            let mut all_of = match keywords.remove("allOf") {
                Some(Keyword::Sequence(seq)) => seq,
                _ => Vec::new(),
            };
            all_of.push(kept);
            keywords.insert("allOf".to_string(), Keyword::Sequence(all_of));
        }
        None => {}
    }
    Schema::Object(keywords)
}
