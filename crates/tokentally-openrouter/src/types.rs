// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenRouter API response types.

use serde::Deserialize;
use serde_json::Value;
use tokentally_core::PricingEntry;
use tokentally_cost::price_from_value;

/// Per-token prices as published by `/models`.
///
/// Prices are decimal strings upstream; they are kept as raw JSON here and
/// parsed leniently when converted into a [`PricingEntry`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: Option<Value>,
    #[serde(default)]
    pub completion: Option<Value>,
    #[serde(default)]
    pub request: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
}

/// One model from the `/models` catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pricing: ModelPricing,
    #[serde(default)]
    pub context_length: Option<u64>,
}

impl ModelInfo {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl From<&ModelInfo> for PricingEntry {
    fn from(model: &ModelInfo) -> Self {
        PricingEntry {
            id: model.id.clone(),
            name: model.display_name().to_string(),
            prompt_price: price_from_value(model.pricing.prompt.as_ref()),
            completion_price: price_from_value(model.pricing.completion.as_ref()),
        }
    }
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<Value>,
}
