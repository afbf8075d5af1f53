// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing lookup and cost calculation for tokentally.
//!
//! This crate provides:
//! - **Pricing**: the per-batch pricing table and its tiered model lookup
//! - **Calculator**: 8-digit cost arithmetic and magnitude-scaled formatting
//! - **Result**: the interactive tracker's per-record cost document

pub mod calculator;
pub mod pricing;
pub mod result;

pub use calculator::{calculate_cost, cost_for_entry, format_cost, round_cost, sum_costs};
pub use pricing::{parse_price, price_from_value, PricingTable};
pub use result::{CostParams, TokenCostResult};
