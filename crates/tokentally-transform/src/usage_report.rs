// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token-usage reports for past executions.

use std::sync::Arc;

use serde_json::{json, Value};
use tokentally_core::{ExecutionSource, TallyError};
use tokentally_n8n::{extract_usage, UsageReport, NO_USAGE_WARNING};
use tracing::info;

/// Fetches an execution and summarizes its language-model usage.
pub struct UsageReporter {
    source: Arc<dyn ExecutionSource>,
}

impl UsageReporter {
    pub fn new(source: Arc<dyn ExecutionSource>) -> Self {
        Self { source }
    }

    /// Produces exactly one record: the aggregate report, or a `_warning`
    /// record when the execution made no language-model calls.
    pub async fn report(&self, execution_id: &str) -> Result<Value, TallyError> {
        if execution_id.trim().is_empty() {
            return Err(TallyError::InvalidInput("Execution ID is required".into()));
        }
        let execution = self.source.fetch_execution(execution_id).await?;
        let records = extract_usage(&execution);

        match UsageReport::from_records(execution_id, records) {
            Some(report) => {
                info!(
                    execution_id,
                    calls = report.llm_calls.len(),
                    total_tokens = report.total_token_usage.total_tokens,
                    "usage extracted"
                );
                serde_json::to_value(&report)
                    .map_err(|e| TallyError::Internal(format!("failed to serialize report: {e}")))
            }
            None => {
                info!(execution_id, "no language-model usage in execution");
                Ok(json!({
                    "_warning": NO_USAGE_WARNING,
                    "execution_id": execution_id,
                }))
            }
        }
    }
}

/// The record a workflow stores so the execution can be reported on later.
pub fn save_execution_id(execution_id: Option<&str>) -> Value {
    json!({ "execution_id": execution_id.filter(|id| !id.is_empty()) })
}
