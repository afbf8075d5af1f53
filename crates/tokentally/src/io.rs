// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch input from a file or stdin, batch output to stdout.

use std::io::{Read, Write};
use std::path::Path;

use serde_json::Value;
use tokentally_core::TallyError;
use tokentally_transform::{parse_records, Record};

/// Reads a batch. `None` or `-` means stdin.
pub fn read_records(input: Option<&Path>) -> Result<Vec<Record>, TallyError> {
    let text = match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path).map_err(|e| {
            TallyError::InvalidInput(format!("failed to read {}: {e}", path.display()))
        })?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| TallyError::InvalidInput(format!("failed to read stdin: {e}")))?;
            buf
        }
    };
    parse_records(&text)
}

/// Writes a batch as a pretty JSON array, or one compact object per line.
pub fn write_records(records: &[Value], ndjson: bool) -> Result<(), TallyError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&mut out, records, ndjson)
        .and_then(|()| out.flush())
        .map_err(|e| TallyError::Internal(format!("failed to write output: {e}")))
}

fn render(out: &mut impl Write, records: &[Value], ndjson: bool) -> std::io::Result<()> {
    if ndjson {
        for record in records {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
        }
    } else {
        serde_json::to_writer_pretty(&mut *out, records)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_ndjson_one_per_line() {
        let mut buf = Vec::new();
        render(&mut buf, &[json!({"a": 1}), json!({"b": 2})], true).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"a\":1}\n{\"b\":2}\n");
    }

    #[test]
    fn renders_pretty_array() {
        let mut buf = Vec::new();
        render(&mut buf, &[json!({"a": 1})], false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[\n"));
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!([{"a": 1}]));
    }

    #[test]
    fn reads_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, r#"[{"model":"gpt-4o"}]"#).unwrap();
        let records = read_records(Some(&path)).unwrap();
        assert_eq!(records[0]["model"], "gpt-4o");
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = read_records(Some(Path::new("/nonexistent/batch.json"))).unwrap_err();
        assert!(matches!(err, TallyError::InvalidInput(_)));
    }
}
