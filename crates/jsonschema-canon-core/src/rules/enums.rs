//! canon-enum-const.

use serde_json::Value;

use super::RuleContext;
use crate::ordering::{canonical_dedup_sort, canonical_eq, canonicalize_numbers};
use crate::schema::{Keyword, Keywords, Schema};

enum EnumFix {
    Unsatisfiable,
    /// `const` already narrows to one value; `enum` only adds a membership check.
    DropEnum,
    ToConst(Value),
    Canonical(&'static str, Value),
}

fn plan(keywords: &Keywords) -> Option<EnumFix> {
    let constant = keywords.get("const").and_then(Keyword::as_literal);
    let values = keywords
        .get("enum")
        .and_then(Keyword::as_literal)
        .and_then(Value::as_array);

    if let Some(values) = values {
        if let Some(constant) = constant {
            return Some(if values.iter().any(|v| canonical_eq(v, constant)) {
                EnumFix::DropEnum
            } else {
                EnumFix::Unsatisfiable
            });
        }
        let canonical = canonical_dedup_sort(values.clone());
        return match canonical.len() {
            0 => Some(EnumFix::Unsatisfiable),
            1 => canonical.into_iter().next().map(EnumFix::ToConst),
            _ if &canonical != values => Some(EnumFix::Canonical("enum", Value::Array(canonical))),
            _ => None,
        };
    }

    let constant = constant?;
    let canonical = canonicalize_numbers(constant.clone());
    (&canonical != constant).then_some(EnumFix::Canonical("const", canonical))
}

pub(super) fn enum_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    plan(keywords).is_some()
}

pub(super) fn enum_const(mut keywords: Keywords, _: &RuleContext) -> Schema {
    match plan(&keywords) {
        Some(EnumFix::Unsatisfiable) => return Schema::Bool(false),
        Some(EnumFix::DropEnum) => {
            keywords.remove("enum");
        }
        Some(EnumFix::ToConst(value)) => {
            keywords.remove("enum");
            keywords.insert("const".to_string(), Keyword::Literal(value));
        }
        Some(EnumFix::Canonical(name, value)) => {
            keywords.insert(name.to_string(), Keyword::Literal(value));
        }
        None => {}
    }
    Schema::Object(keywords)
}
