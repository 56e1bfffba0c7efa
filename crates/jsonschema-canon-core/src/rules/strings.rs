//! canon-string-length and pattern-to-enum.

use regex::Regex;
use serde_json::Value;

use super::rule_utils::{count_value, exclude_family, Family};
use super::RuleContext;
use crate::schema::{Keyword, Keywords, Schema};

/// ECMA-262 syntax characters; an alternative containing any of them is not a literal.
const REGEX_SYNTAX: &[char] = &[
    '^', '$', '\\', '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '/',
];

enum LengthFix {
    Unsatisfiable,
    DropZeroMin,
}

fn length_plan(keywords: &Keywords) -> Option<LengthFix> {
    let min = count_value(keywords, "minLength");
    if let (Some(min), Some(max)) = (min, count_value(keywords, "maxLength")) {
        if min > max {
            return Some(LengthFix::Unsatisfiable);
        }
    }
    (min == Some(0)).then_some(LengthFix::DropZeroMin)
}

pub(super) fn length_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    length_plan(keywords).is_some()
}

pub(super) fn length(mut keywords: Keywords, _: &RuleContext) -> Schema {
    match length_plan(&keywords) {
        Some(LengthFix::Unsatisfiable) => exclude_family(keywords, Family::String),
        Some(LengthFix::DropZeroMin) => {
            keywords.remove("minLength");
            Schema::Object(keywords)
        }
        None => Schema::Object(keywords),
    }
}

// ---------------------------------------------------------------------------
// pattern-to-enum
// ---------------------------------------------------------------------------

/// Split `^(a|b|c)$` into its literal alternatives.
fn literal_alternatives(pattern: &str) -> Option<Vec<&str>> {
    let body = pattern.strip_prefix("^(")?.strip_suffix(")$")?;
    let alternatives: Vec<&str> = body.split('|').collect();
    let literal = |alt: &&str| !alt.is_empty() && !alt.contains(REGEX_SYNTAX);
    alternatives.iter().all(literal).then_some(alternatives)
}

/// Alternatives of a `pattern` that is provably a finite set of literals.
fn enumerable_pattern(keywords: &Keywords) -> Option<Vec<String>> {
    let string_only = keywords
        .get("type")
        .and_then(Keyword::as_literal)
        .and_then(Value::as_str)
        == Some("string");
    if !string_only || keywords.contains_key("enum") || keywords.contains_key("const") {
        return None;
    }
    let pattern = keywords.get("pattern")?.as_literal()?.as_str()?;
    let alternatives = literal_alternatives(pattern)?;

    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            tracing::warn!(pattern, error = %e, "pattern is not a valid regular expression");
            return None;
        }
    };
    alternatives
        .iter()
        .all(|alt| regex.is_match(alt))
        .then(|| alternatives.into_iter().map(str::to_string).collect())
}

pub(super) fn pattern_applies(keywords: &Keywords, _: &RuleContext) -> bool {
    enumerable_pattern(keywords).is_some()
}

pub(super) fn pattern_to_enum(mut keywords: Keywords, _: &RuleContext) -> Schema {
    if let Some(alternatives) = enumerable_pattern(&keywords) {
        keywords.remove("pattern");
        keywords.insert(
            "enum".to_string(),
            Keyword::Literal(Value::Array(
                alternatives.into_iter().map(Value::String).collect(),
            )),
        );
    }
    Schema::Object(keywords)
}
