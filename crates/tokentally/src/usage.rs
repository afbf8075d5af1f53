// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tokentally usage` command implementation.

use std::sync::Arc;
use std::time::Duration;

use tokentally_config::TallyConfig;
use tokentally_core::TallyError;
use tokentally_n8n::ExecutionClient;
use tokentally_transform::{save_execution_id, UsageReporter};

use crate::io::write_records;

/// `usage fetch`: one aggregate record (or warning record) on stdout.
pub async fn run_fetch(
    config: &TallyConfig,
    timeout: Duration,
    execution_id: &str,
) -> Result<(), TallyError> {
    if execution_id.trim().is_empty() {
        return Err(TallyError::InvalidInput("Execution ID is required".into()));
    }
    let client = ExecutionClient::from_config(&config.n8n, timeout)?;
    let report = UsageReporter::new(Arc::new(client))
        .report(execution_id)
        .await?;
    write_records(&[report], false)
}

/// `usage save`: `{ "execution_id": ... }` on stdout.
pub fn run_save(execution_id: Option<&str>) -> Result<(), TallyError> {
    write_records(&[save_execution_id(execution_id)], false)
}
