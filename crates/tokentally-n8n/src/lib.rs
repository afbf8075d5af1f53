// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! n8n execution source for tokentally.
//!
//! [`ExecutionClient`] fetches a past execution through the n8n public API and
//! [`extract_usage`] walks its per-node runs for language-model token usage.

pub mod client;
pub mod extractor;

pub use client::{normalize_base_url, unwrap_execution, ExecutionClient};
pub use extractor::{extract_usage, ExecutionLog, UsageReport, NO_USAGE_WARNING};
