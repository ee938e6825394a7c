//! Reply parsing: fence stripping and field-by-field repair.
//!
//! The model is asked for bare JSON but regularly wraps it in a markdown
//! code fence, sometimes with a sentence in front.  A reply that contains no
//! JSON object at all is an error; a JSON object with missing or malformed
//! fields is repaired with fixed fallback values.

use serde_json::{Map, Value};

use crate::analysis::analyzer::AnalysisError;
use crate::analysis::types::{AnalysisResult, Category, Severity};

pub const FALLBACK_ROOT_CAUSE: &str = "Unable to determine the exact cause.";
pub const FALLBACK_FIX_STEP: &str = "Review your environment configurations";
pub const FALLBACK_PREVENTION_TIP: &str = "Always test in a staging environment first";

const FENCE: &str = "```";

/// Remove a surrounding markdown code fence, with or without a language tag.
///
/// The opening fence is the first one in the text (prose before it is
/// dropped) and the closing fence is the last one, so fences quoted inside
/// the payload survive.
///
/// ```
/// use it_works_locally::analysis::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
/// ```
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(open) = trimmed.find(FENCE) else {
        return trimmed;
    };

    let after_open = &trimmed[open + FENCE.len()..];
    let inner = match after_open.rfind(FENCE) {
        Some(close) => &after_open[..close],
        None => after_open,
    };

    // The rest of the opening line is the (optional) language tag.
    let body = match inner.find('\n') {
        Some(nl) => {
            let tag = inner[..nl].trim();
            if tag.starts_with('{') || tag.starts_with('[') {
                // Single-line fence like ```{"a":1}```
                inner
            } else {
                &inner[nl + 1..]
            }
        }
        None => inner
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
            .trim_start(),
    };

    body.trim()
}

/// Parse the model's text reply into an [`AnalysisResult`].
///
/// Bare JSON is tried first, then the fenced body, then the outermost
/// `{...}` of the fenced body and of the whole reply.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let trimmed = text.trim();

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(_) => parse_unwrapped(trimmed)?,
    };

    let Value::Object(fields) = value else {
        return Err(AnalysisError::Parse(
            "expected a JSON object in the model reply".into(),
        ));
    };

    Ok(repair(&fields))
}

fn parse_unwrapped(text: &str) -> Result<Value, AnalysisError> {
    let cleaned = strip_code_fences(text);
    let first_err = match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    [outermost_object(cleaned), outermost_object(text)]
        .into_iter()
        .flatten()
        .find_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .ok_or_else(|| AnalysisError::Parse(first_err.to_string()))
}

/// The slice from the first `{` to the last `}`, if any.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn repair(fields: &Map<String, Value>) -> AnalysisResult {
    AnalysisResult {
        root_cause: non_blank_string(fields.get("whatWentWrong"))
            .unwrap_or_else(|| FALLBACK_ROOT_CAUSE.to_string()),
        fix_steps: string_list(fields.get("howToFix"))
            .unwrap_or_else(|| vec![FALLBACK_FIX_STEP.to_string()]),
        prevention_tips: string_list(fields.get("preventionTips"))
            .unwrap_or_else(|| vec![FALLBACK_PREVENTION_TIP.to_string()]),
        tldr: non_blank_string(fields.get("tldr")),
        category: non_blank_string(fields.get("category")).and_then(|c| Category::parse(&c)),
        severity: non_blank_string(fields.get("severity")).and_then(|s| Severity::parse(&s)),
        estimated_fix_time: non_blank_string(fields.get("estimatedFixTime")),
    }
}

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// String items of an array; `None` when absent, not an array, or left empty.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(|v| non_blank_string(Some(v)))
        .collect();
    (!items.is_empty()).then_some(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
