// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-record outcome handling.

use serde_json::{json, Value};
use tokentally_core::TallyError;
use tracing::warn;

/// Settles per-record results for one batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchRunner {
    continue_on_fail: bool,
}

impl BatchRunner {
    pub fn new(continue_on_fail: bool) -> Self {
        Self { continue_on_fail }
    }

    pub fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }

    /// Passes a success through. A failure either aborts the batch or, with
    /// continue-on-fail, becomes `{ "error": message }`.
    pub fn settle(&self, index: usize, outcome: Result<Value, TallyError>) -> Result<Value, TallyError> {
        match outcome {
            Ok(value) => Ok(value),
            Err(e) if self.continue_on_fail => {
                warn!(record = index, error = %e, "record failed, continuing");
                Ok(json!({ "error": e.to_string() }))
            }
            Err(e) => Err(e),
        }
    }
}
