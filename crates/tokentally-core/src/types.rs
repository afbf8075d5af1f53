// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared between the extractor, the pricing lookup, and the
//! cost calculator.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Currency tag attached to every cost breakdown.
pub const CURRENCY_USD: &str = "USD";

/// Prompt / completion / total token counts for one language-model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCounts {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl TokenCounts {
    /// Reads a `{ promptTokens, completionTokens, totalTokens }` object field by
    /// field; a missing or malformed field counts as 0.
    pub fn from_json(usage: &Map<String, Value>) -> TokenCounts {
        TokenCounts {
            prompt_tokens: token_count(usage.get("promptTokens")),
            completion_tokens: token_count(usage.get("completionTokens")),
            total_tokens: token_count(usage.get("totalTokens")),
        }
    }

    /// Component-wise sum, used to build batch totals.
    pub fn saturating_add(self, other: TokenCounts) -> TokenCounts {
        TokenCounts {
            prompt_tokens: self.prompt_tokens.saturating_add(other.prompt_tokens),
            completion_tokens: self
                .completion_tokens
                .saturating_add(other.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(other.total_tokens),
        }
    }
}

/// Reads a token count; numeric strings are accepted, fractions truncate,
/// anything else (negative, null, bool, absent) is 0.
pub fn token_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One detected language-model invocation inside an execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Name of the workflow node that made the call.
    pub node_name: String,
    /// Token usage reported by the node, if any.
    #[serde(default)]
    pub token_usage: Option<TokenCounts>,
    /// Model identifier taken from the node's input override.
    #[serde(default)]
    pub model: Option<String>,
    /// Prompt messages sent to the model.
    #[serde(default)]
    pub messages: Vec<String>,
    /// Token estimate computed by the host before the call.
    #[serde(default)]
    pub estimated_tokens: u64,
}

/// A model's per-token prices as resolved from the pricing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    /// Model identifier, verbatim from the pricing source (e.g. `openai/gpt-4o`).
    pub id: String,
    /// Human readable model name.
    pub name: String,
    /// USD per prompt token.
    pub prompt_price: f64,
    /// USD per completion token.
    pub completion_price: f64,
}

impl PricingEntry {
    /// A model with both prices at zero is free or unpriced.
    pub fn is_free(&self) -> bool {
        self.prompt_price == 0.0 && self.completion_price == 0.0
    }
}

/// Cost of one call (or of a whole batch), in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub prompt_cost: f64,
    pub completion_cost: f64,
    pub total_cost: f64,
    pub currency: String,
}

impl CostBreakdown {
    /// An all-zero breakdown.
    pub fn zero() -> Self {
        Self {
            prompt_cost: 0.0,
            completion_cost: 0.0,
            total_cost: 0.0,
            currency: CURRENCY_USD.to_string(),
        }
    }
}

impl Default for CostBreakdown {
    fn default() -> Self {
        Self::zero()
    }
}

/// Where the token counts and prices of a tracked cost came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PriceSource {
    /// Exact cost reported by the generation statistics endpoint.
    GenerationApi,
    /// Token counts from an input record, prices from the models list.
    ModelsApi,
    /// Model and token counts given by the operator.
    Manual,
}

/// Statistics for a single generation, as reported by the pricing provider.
///
/// Both the camelCase and the snake_case spellings of each field are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, alias = "total_cost", deserialize_with = "null_as_default")]
    pub total_cost: f64,
    #[serde(default, alias = "tokens_prompt", deserialize_with = "null_as_default")]
    pub tokens_prompt: u64,
    #[serde(default, alias = "tokens_completion", deserialize_with = "null_as_default")]
    pub tokens_completion: u64,
    #[serde(default, alias = "native_tokens_prompt", deserialize_with = "null_as_default")]
    pub native_tokens_prompt: u64,
    #[serde(default, alias = "native_tokens_completion", deserialize_with = "null_as_default")]
    pub native_tokens_completion: u64,
    #[serde(default, alias = "native_tokens_cached", skip_serializing_if = "Option::is_none")]
    pub native_tokens_cached: Option<u64>,
    #[serde(
        default,
        alias = "native_tokens_reasoning",
        skip_serializing_if = "Option::is_none"
    )]
    pub native_tokens_reasoning: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
    #[serde(default, alias = "finish_reason", skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, alias = "provider_name", skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
}

impl GenerationStats {
    /// Prompt tokens as counted by the model's own tokenizer, falling back to
    /// the normalized count when the native one is zero.
    pub fn prompt_tokens(&self) -> u64 {
        if self.native_tokens_prompt > 0 {
            self.native_tokens_prompt
        } else {
            self.tokens_prompt
        }
    }

    /// Completion tokens, native count first, normalized count as fallback.
    pub fn completion_tokens(&self) -> u64 {
        if self.native_tokens_completion > 0 {
            self.native_tokens_completion
        } else {
            self.tokens_completion
        }
    }
}
