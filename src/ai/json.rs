//! JSON Extraction
//!
//! LLM replies rarely arrive as bare JSON. This module pulls the payload out of
//! the common wrappers:
//! - Markdown code fences (```json ... ```), anywhere in the reply
//! - Explanatory prose before or after the object
//! - Trailing commas before `]` or `}`
//!
//! Truncated payloads are not patched up: an incomplete reply is reported as
//! malformed so the client can ask again.

use serde_json::Value;
use tracing::debug;

use crate::types::{ArchError, Result};

/// Extract and parse the JSON payload of an LLM reply
pub fn extract_json(raw: &str) -> Result<Value> {
    let cleaned = strip_code_fences(raw.trim().trim_start_matches('\u{feff}'));

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(value);
    }

    let candidate = match balanced_span(&cleaned) {
        Some(span) => span,
        None => {
            return Err(ArchError::LlmApi(format!(
                "No JSON object in reply: {}",
                preview(&cleaned)
            )));
        }
    };

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        debug!("JSON extracted from surrounding text");
        return Ok(value);
    }

    let without_commas = remove_trailing_commas(candidate);
    serde_json::from_str::<Value>(&without_commas).map_err(|e| {
        ArchError::LlmApi(format!(
            "Reply is not valid JSON ({}): {}",
            e,
            preview(&cleaned)
        ))
    })
}

fn preview(s: &str) -> String {
    let head: String = s.chars().take(120).collect();
    if head.len() < s.len() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Keep only the body of the first fenced block, if there is one
fn strip_code_fences(s: &str) -> String {
    let Some(open) = s.find("```") else {
        return s.to_string();
    };
    let after_open = &s[open + 3..];
    // Skip the language tag on the opening line
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim().to_string(),
        None => body.trim().to_string(),
    }
}

/// First complete `{...}` or `[...]` span, respecting string literals
fn balanced_span(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drop commas that directly precede a closing bracket, outside strings
fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
            out.push(ch);
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(']') | Some('}')) {
                    continue;
                }
            }
            _ => {}
        }
        out.push(ch);
    }
    out
}
