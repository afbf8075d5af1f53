// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for tokentally.
//!
//! This crate provides the error type, the data model passed between the
//! usage extractor, pricing lookup and cost calculator, and the source traits
//! that the HTTP clients implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TallyError;
pub use types::{
    token_count, CostBreakdown, GenerationStats, PriceSource, PricingEntry, TokenCounts,
    UsageRecord, CURRENCY_USD,
};

pub use traits::{ExecutionSource, GenerationSource, PricingSource, SourceAdapter};
