// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenRouter models and generation endpoints.
//!
//! Provides [`OpenRouterClient`], which implements both
//! [`PricingSource`] and [`GenerationSource`]. There is no retry: a failed
//! call is reported to the caller, which decides whether the batch aborts.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tokentally_config::OpenRouterConfig;
use tokentally_core::{
    GenerationSource, GenerationStats, PricingEntry, PricingSource, SourceAdapter, TallyError,
};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ModelInfo};

/// HTTP client for OpenRouter API communication.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenRouterClient {
    /// Creates a client that authenticates with `api_key` as a bearer token.
    ///
    /// Trailing slashes on `base_url` are ignored.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, TallyError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| TallyError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TallyError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from the `[openrouter]` config section.
    ///
    /// Fails with a configuration error when the API key is missing.
    pub fn from_config(config: &OpenRouterConfig, timeout: Duration) -> Result<Self, TallyError> {
        Self::new(config.require_api_key()?, &config.base_url, timeout)
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the full model catalog.
    ///
    /// The body must be an object whose `data` field is an array; anything
    /// else is a hard error. Individual entries without an `id` are skipped.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, TallyError> {
        let url = format!("{}/models", self.base_url);
        let body = self.get_json(&url).await?;

        let Some(data) = body.get("data").and_then(Value::as_array) else {
            return Err(TallyError::upstream("Invalid response from OpenRouter API"));
        };

        let models: Vec<ModelInfo> = data
            .iter()
            .filter_map(|raw| match serde_json::from_value::<ModelInfo>(raw.clone()) {
                Ok(model) if !model.id.is_empty() => Some(model),
                Ok(_) => None,
                Err(e) => {
                    debug!(error = %e, "skipping malformed model entry");
                    None
                }
            })
            .collect();

        debug!(count = models.len(), "model catalog fetched");
        Ok(models)
    }

    /// Looks up statistics for one generation.
    ///
    /// The stats are read from the `data` field when present, otherwise from
    /// the top-level object. The unwrapped JSON is returned alongside.
    pub async fn generation(
        &self,
        generation_id: &str,
    ) -> Result<(GenerationStats, Value), TallyError> {
        let url = Url::parse_with_params(
            &format!("{}/generation", self.base_url),
            &[("id", generation_id)],
        )
        .map_err(|e| TallyError::Config(format!("invalid OpenRouter base URL: {e}")))?;

        let body = self.get_json(url.as_str()).await?;
        let raw = match body {
            Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };

        let stats: GenerationStats =
            serde_json::from_value(raw.clone()).map_err(|e| TallyError::Upstream {
                message: format!("failed to parse generation stats: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok((stats, raw))
    }

    async fn get_json(&self, url: &str) -> Result<Value, TallyError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TallyError::Upstream {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url, "OpenRouter response received");

        let body = response.text().await.map_err(|e| TallyError::Upstream {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            warn!(status = %status, "OpenRouter request failed");
            return Err(TallyError::upstream(error_message(status, &body)));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| TallyError::Upstream {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !value.is_object() {
            return Err(TallyError::upstream("Invalid response from OpenRouter API"));
        }
        Ok(value)
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("OpenRouter API error ({status}): {}", api_err.error.message),
        Err(_) => format!("API returned {status}: {body}"),
    }
}

impl SourceAdapter for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }
}

#[async_trait]
impl PricingSource for OpenRouterClient {
    async fn fetch_pricing_table(&self) -> Result<Vec<PricingEntry>, TallyError> {
        let models = self.list_models().await?;
        Ok(models.iter().map(PricingEntry::from).collect())
    }
}

#[async_trait]
impl GenerationSource for OpenRouterClient {
    async fn fetch_generation(
        &self,
        generation_id: &str,
    ) -> Result<(GenerationStats, Value), TallyError> {
        self.generation(generation_id).await
    }
}
