//! Fallback parsing of LLM response content.
//!
//! Models asked for JSON frequently wrap it in prose or code fences. Each
//! parse is an ordered list of pure strategies over the raw content string;
//! the first success short-circuits. Keeping the heuristics here isolates
//! the fragile part and makes each layer independently testable.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("model response could not be parsed as a JSON object")]
    NoObject,

    #[error("model response could not be parsed as a skill array")]
    NoArray,
}

type Strategy<T> = fn(&str) -> Result<T, ParseError>;

fn first_success<T>(content: &str, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|parse| parse(content).ok())
}

// ────────────────────────────────────────────────────────────────────────────
// Object parsing (analysis responses)
// ────────────────────────────────────────────────────────────────────────────

/// Parses a top-level JSON object out of model output.
/// Order: whole content, then the outermost `{...}` substring.
pub fn parse_object(content: &str) -> Result<Map<String, Value>, ParseError> {
    first_success(content, &[whole_object, embedded_object]).ok_or(ParseError::NoObject)
}

fn whole_object(content: &str) -> Result<Map<String, Value>, ParseError> {
    match serde_json::from_str::<Value>(strip_json_fences(content)) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ParseError::NoObject),
    }
}

/// Everything from the first `{` to the last `}`, to cover objects embedded
/// in prose like "Here are the skills: {...}".
fn embedded_object(content: &str) -> Result<Map<String, Value>, ParseError> {
    let start = content.find('{').ok_or(ParseError::NoObject)?;
    let end = content.rfind('}').ok_or(ParseError::NoObject)?;
    if end <= start {
        return Err(ParseError::NoObject);
    }
    match serde_json::from_str::<Value>(&content[start..=end]) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ParseError::NoObject),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Array parsing (standalone skill extraction)
// ────────────────────────────────────────────────────────────────────────────

/// Parses a flat skill list out of model output.
/// Order: whole content as array, then the first `[...]` substring, then
/// individual quoted substrings.
pub fn parse_skill_array(content: &str) -> Result<Vec<String>, ParseError> {
    first_success(content, &[whole_array, embedded_array, quoted_strings]).ok_or(ParseError::NoArray)
}

fn whole_array(content: &str) -> Result<Vec<String>, ParseError> {
    match serde_json::from_str::<Value>(strip_json_fences(content)) {
        Ok(Value::Array(items)) => Ok(values_to_strings(items)),
        _ => Err(ParseError::NoArray),
    }
}

fn embedded_array(content: &str) -> Result<Vec<String>, ParseError> {
    let start = content.find('[').ok_or(ParseError::NoArray)?;
    let end = content[start..]
        .find(']')
        .map(|offset| start + offset)
        .ok_or(ParseError::NoArray)?;
    match serde_json::from_str::<Value>(&content[start..=end]) {
        Ok(Value::Array(items)) => Ok(values_to_strings(items)),
        _ => Err(ParseError::NoArray),
    }
}

/// Last resort: treat every quoted substring as one skill name.
fn quoted_strings(content: &str) -> Result<Vec<String>, ParseError> {
    let mut skills = Vec::new();
    let mut current: Option<String> = None;

    for c in content.chars() {
        if matches!(c, '"' | '\'' | '`') {
            match current.take() {
                Some(captured) => {
                    let captured = captured.trim().to_string();
                    if !captured.is_empty() {
                        skills.push(captured);
                    }
                }
                None => current = Some(String::new()),
            }
        } else if let Some(captured) = current.as_mut() {
            captured.push(c);
        }
    }

    if skills.is_empty() {
        return Err(ParseError::NoArray);
    }
    Ok(skills)
}

fn values_to_strings(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
