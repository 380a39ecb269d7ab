//! Response-format extraction for completion output.
//!
//! The completion service does not reliably honor "no prose" instructions,
//! so structured answers arrive in three shapes: a ```json fenced block, a
//! bare JSON object surrounded by prose, or (when things go wrong) no
//! object at all. Code answers arrive either fenced or bare.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::CompletionError;

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```\w*\n(.*?)\n```").expect("CODE_FENCE_RE regex should compile")
});

/// Pull code out of a completion response.
///
/// Returns the inner text of the first fenced block (any language tag) when
/// one exists, otherwise the raw response unchanged, treating the whole
/// reply as code. Never fails.
pub fn extract_code(raw: &str) -> String {
    match CODE_FENCE_RE.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.to_string(),
    }
}

/// Pull a JSON object out of a completion response.
///
/// Two-tier search: the brace-delimited region inside a ```json fenced
/// block first, then the first `{` through the last `}` of the raw text.
/// Whatever is found must parse as a JSON object, otherwise this fails
/// with an extraction error.
pub fn extract_object(raw: &str) -> Result<Map<String, Value>, CompletionError> {
    let candidate = json_candidate(raw)
        .ok_or_else(|| CompletionError::no_object("no JSON object in response"))?;

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| CompletionError::no_object(format!("candidate did not parse: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(CompletionError::no_object(format!(
            "parsed to {} instead of an object",
            type_name(&other)
        ))),
    }
}

/// Locate the most plausible JSON-object region of `raw`.
fn json_candidate(raw: &str) -> Option<&str> {
    if let Some(start) = raw.find("```json") {
        let after = &raw[start + "```json".len()..];
        if let Some(end) = after.find("```") {
            // The fence body may carry prose around the object, so take
            // its brace-delimited region rather than the whole body.
            if let Some(region) = brace_region(&after[..end]) {
                return Some(region);
            }
        }
    }

    brace_region(raw)
}

/// First `{` through last `}` of `text`, when that region is non-degenerate.
fn brace_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
