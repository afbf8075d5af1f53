// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source of recorded workflow executions.

use async_trait::async_trait;

use crate::error::TallyError;
use crate::traits::adapter::SourceAdapter;

/// Fetches the recorded run log of a finished workflow execution.
#[async_trait]
pub trait ExecutionSource: SourceAdapter {
    /// Returns the execution document, already unwrapped from any response
    /// envelope. Interpretation of its contents is left to the extractor.
    async fn fetch_execution(&self, execution_id: &str) -> Result<serde_json::Value, TallyError>;
}
