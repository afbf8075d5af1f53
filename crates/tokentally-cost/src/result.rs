// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-record cost result produced by the interactive tracker.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokentally_core::PriceSource;

use crate::calculator::{calculate_cost, format_cost, round_cost};

/// Token counts reported alongside a tracked cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTokens {
    pub input: u64,
    pub output: u64,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<u64>,
}

/// Costs in USD plus a display string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedCosts {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub formatted: String,
}

/// The prices a cost was computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPricing {
    pub prompt_price_per_token: f64,
    pub completion_price_per_token: f64,
    pub prompt_price_per_million: f64,
    pub completion_price_per_million: f64,
    pub source: PriceSource,
}

/// Provenance of a tracked cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedMetadata {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The `tokenCost` object attached to each tracked record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCostResult {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub tokens: TrackedTokens,
    pub costs: TrackedCosts,
    pub pricing: TrackedPricing,
    pub metadata: TrackedMetadata,
}

/// Inputs for [`TokenCostResult::build`].
#[derive(Debug, Clone, Default)]
pub struct CostParams {
    pub model: String,
    pub model_name: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub prompt_price: f64,
    pub completion_price: f64,
    pub generation_id: Option<String>,
    pub provider: Option<String>,
    pub latency: Option<f64>,
    pub finish_reason: Option<String>,
    pub cached_tokens: Option<u64>,
    pub reasoning_tokens: Option<u64>,
    /// Exact total reported upstream; replaces the computed total when set.
    pub total_cost_override: Option<f64>,
}

impl TokenCostResult {
    /// Compute costs for `params` and assemble the result.
    pub fn build(params: CostParams, source: PriceSource, at: DateTime<Utc>) -> Self {
        let cost = calculate_cost(
            params.input_tokens,
            params.output_tokens,
            params.prompt_price,
            params.completion_price,
        );
        let total_cost = params
            .total_cost_override
            .map(round_cost)
            .unwrap_or(cost.total_cost);

        Self {
            model: params.model,
            model_name: params.model_name,
            tokens: TrackedTokens {
                input: params.input_tokens,
                output: params.output_tokens,
                total: params.input_tokens.saturating_add(params.output_tokens),
                cached: params.cached_tokens,
                reasoning: params.reasoning_tokens,
            },
            costs: TrackedCosts {
                input_cost: cost.prompt_cost,
                output_cost: cost.completion_cost,
                total_cost,
                formatted: format_cost(total_cost),
            },
            pricing: TrackedPricing {
                prompt_price_per_token: params.prompt_price,
                completion_price_per_token: params.completion_price,
                prompt_price_per_million: params.prompt_price * 1_000_000.0,
                completion_price_per_million: params.completion_price * 1_000_000.0,
                source,
            },
            metadata: TrackedMetadata {
                timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
                generation_id: params.generation_id,
                provider: params.provider,
                latency: params.latency,
                finish_reason: params.finish_reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn gpt_4o(input: u64, output: u64) -> CostParams {
        CostParams {
            model: "openai/gpt-4o".into(),
            model_name: Some("OpenAI: GPT-4o".into()),
            input_tokens: input,
            output_tokens: output,
            prompt_price: 0.000005,
            completion_price: 0.000015,
            ..Default::default()
        }
    }

    #[test]
    fn build_computes_costs_and_per_million_prices() {
        let result = TokenCostResult::build(gpt_4o(1000, 500), PriceSource::ModelsApi, at());
        assert!((result.costs.input_cost - 0.005).abs() < 1e-12);
        assert!((result.costs.output_cost - 0.0075).abs() < 1e-12);
        assert!((result.costs.total_cost - 0.0125).abs() < 1e-12);
        assert_eq!(result.costs.formatted, "$0.0125");
        assert_eq!(result.tokens.total, 1500);
        assert!((result.pricing.prompt_price_per_million - 5.0).abs() < 1e-9);
        assert!((result.pricing.completion_price_per_million - 15.0).abs() < 1e-9);
        assert_eq!(result.metadata.timestamp, "2026-03-01T12:00:00.000Z");
    }

    #[test]
    fn override_replaces_total_and_formatting_only() {
        let params = CostParams {
            total_cost_override: Some(0.02),
            ..gpt_4o(1000, 500)
        };
        let result = TokenCostResult::build(params, PriceSource::GenerationApi, at());
        assert!((result.costs.input_cost - 0.005).abs() < 1e-12);
        assert_eq!(result.costs.total_cost, 0.02);
        assert_eq!(result.costs.formatted, "$0.0200");
    }

    #[test]
    fn serializes_with_camel_case_and_skips_absent_optionals() {
        let result = TokenCostResult::build(gpt_4o(10, 5), PriceSource::Manual, at());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["modelName"], "OpenAI: GPT-4o");
        assert_eq!(json["pricing"]["source"], "manual");
        assert!(json["costs"].get("inputCost").is_some());
        assert!(json["tokens"].get("cached").is_none());
        assert!(json["metadata"].get("generationId").is_none());
    }
}
