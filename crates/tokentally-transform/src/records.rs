// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch input parsing.

use serde_json::{Map, Value};
use tokentally_core::TallyError;

/// One batch item. Every record is a JSON object.
pub type Record = Map<String, Value>;

/// Parses a batch from a JSON array, a single JSON object, or
/// newline-delimited JSON objects. Blank input is an empty batch.
pub fn parse_records(input: &str) -> Result<Vec<Record>, TallyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| into_record(i, item))
            .collect(),
        Ok(value) => into_record(0, value).map(|r| vec![r]),
        Err(_) => parse_ndjson(trimmed),
    }
}

fn parse_ndjson(input: &str) -> Result<Vec<Record>, TallyError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            let value = serde_json::from_str(line).map_err(|e| {
                TallyError::InvalidInput(format!("invalid JSON on line {}: {e}", n + 1))
            })?;
            into_record(n, value)
        })
        .collect()
}

fn into_record(index: usize, value: Value) -> Result<Record, TallyError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TallyError::InvalidInput(format!(
            "record {index} is not a JSON object (found {})",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
