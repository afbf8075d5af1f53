// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model and token-count extraction from LLM response records.
//!
//! Understands OpenAI-style `usage.prompt_tokens` / `usage.completion_tokens`,
//! Anthropic-style `usage.input_tokens` / `usage.output_tokens` (which win
//! when both are present), and bare top-level `prompt_tokens` /
//! `completion_tokens` as a last resort.

use serde_json::Value;

use crate::records::Record;

/// What could be read from one record. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedUsage {
    pub model: Option<String>,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub generation_id: Option<String>,
}

pub fn extract_token_usage(record: &Record) -> ExtractedUsage {
    let mut usage = ExtractedUsage {
        model: record.get("model").and_then(Value::as_str).map(str::to_string),
        generation_id: record.get("id").and_then(Value::as_str).map(str::to_string),
        ..Default::default()
    };

    if let Some(nested) = record.get("usage").and_then(Value::as_object) {
        usage.input_tokens = token_count(nested.get("input_tokens"))
            .or_else(|| token_count(nested.get("prompt_tokens")));
        usage.output_tokens = token_count(nested.get("output_tokens"))
            .or_else(|| token_count(nested.get("completion_tokens")));
    }

    if usage.input_tokens.is_none() {
        usage.input_tokens = token_count(record.get("prompt_tokens"));
    }
    if usage.output_tokens.is_none() {
        usage.output_tokens = token_count(record.get("completion_tokens"));
    }
    usage
}

/// A token count must be a JSON number; fractional counts are truncated and
/// negative ones ignored.
fn token_count(value: Option<&Value>) -> Option<u64> {
    let Value::Number(n) = value? else {
        return None;
    };
    n.as_u64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
}
