// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch transformers for tokentally.
//!
//! Each transformer takes one batch of JSON object records and returns the
//! transformed batch:
//!
//! - [`usage_report`]: execution log → one aggregate token-usage record
//! - [`price_batch`]: usage records → the same records with per-call costs
//! - [`tracker`]: LLM responses, generation ids or manual counts → `tokenCost`
//!
//! Records are processed strictly in order. [`runner::BatchRunner`] decides
//! whether a failed record aborts the batch or becomes an `{ "error" }` record.

pub mod input;
pub mod models;
pub mod price_batch;
pub mod records;
pub mod runner;
pub mod tracker;
pub mod usage_report;

pub use models::{list_models, ModelSummary};
pub use price_batch::PriceCalculator;
pub use records::{parse_records, Record};
pub use runner::BatchRunner;
pub use tracker::{CostTracker, GenerationId, TrackMode, TrackOptions};
pub use usage_report::{save_execution_id, UsageReporter};
