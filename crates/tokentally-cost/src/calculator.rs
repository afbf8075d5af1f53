// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token cost arithmetic and cost formatting.
//!
//! Every stored cost is rounded to [`COST_DECIMALS`] fractional digits,
//! round-half-up. [`format_cost`] is presentation only and never feeds back
//! into stored values.

use tokentally_core::{CostBreakdown, PricingEntry, TokenCounts, CURRENCY_USD};

/// Fractional digits kept on every stored cost value.
pub const COST_DECIMALS: i32 = 8;

/// Round a non-negative cost to [`COST_DECIMALS`] fractional digits.
pub fn round_cost(value: f64) -> f64 {
    let scale = 10f64.powi(COST_DECIMALS);
    (value * scale).round() / scale
}

/// Cost of `prompt_tokens` and `completion_tokens` at the given per-token prices.
///
/// Free models (both prices zero) short-circuit to an all-zero breakdown.
pub fn calculate_cost(
    prompt_tokens: u64,
    completion_tokens: u64,
    prompt_price: f64,
    completion_price: f64,
) -> CostBreakdown {
    if prompt_price == 0.0 && completion_price == 0.0 {
        return CostBreakdown::zero();
    }

    let prompt_cost = prompt_tokens as f64 * prompt_price;
    let completion_cost = completion_tokens as f64 * completion_price;

    CostBreakdown {
        prompt_cost: round_cost(prompt_cost),
        completion_cost: round_cost(completion_cost),
        total_cost: round_cost(prompt_cost + completion_cost),
        currency: CURRENCY_USD.to_string(),
    }
}

/// Cost of one call's token counts at a resolved entry's prices.
pub fn cost_for_entry(tokens: &TokenCounts, entry: &PricingEntry) -> CostBreakdown {
    calculate_cost(
        tokens.prompt_tokens,
        tokens.completion_tokens,
        entry.prompt_price,
        entry.completion_price,
    )
}

/// Sum breakdowns into a batch aggregate, re-rounded to [`COST_DECIMALS`].
pub fn sum_costs<'a>(costs: impl IntoIterator<Item = &'a CostBreakdown>) -> CostBreakdown {
    let (prompt, completion, total) = costs.into_iter().fold((0.0, 0.0, 0.0), |acc, c| {
        (
            acc.0 + c.prompt_cost,
            acc.1 + c.completion_cost,
            acc.2 + c.total_cost,
        )
    });
    CostBreakdown {
        prompt_cost: round_cost(prompt),
        completion_cost: round_cost(completion),
        total_cost: round_cost(total),
        currency: CURRENCY_USD.to_string(),
    }
}

/// Render a cost as a dollar string whose precision grows as the value shrinks.
///
/// | value              | output          |
/// |--------------------|-----------------|
/// | `0`                | `$0.00`         |
/// | below `0.000001`   | `$5.00e-7`      |
/// | below `0.01`       | `$0.005000`     |
/// | below `1`          | `$0.0125`       |
/// | otherwise          | `$12.50`        |
pub fn format_cost(cost: f64) -> String {
    if cost == 0.0 {
        "$0.00".to_string()
    } else if cost < 0.000_001 {
        format!("${cost:.2e}")
    } else if cost < 0.01 {
        format!("${cost:.6}")
    } else if cost < 1.0 {
        format!("${cost:.4}")
    } else {
        format!("${cost:.2}")
    }
}
