// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the n8n public API executions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use serde_json::Value;
use tokentally_config::N8nConfig;
use tokentally_core::{ExecutionSource, SourceAdapter, TallyError};
use tracing::debug;

/// Path segment every n8n public API route lives under.
const API_PREFIX: &str = "/api/v1";

/// Strips trailing slashes and appends `/api/v1` unless the URL already has it.
pub fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.contains(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_PREFIX}")
    }
}

/// Client for `GET /executions/{id}`.
#[derive(Debug, Clone)]
pub struct ExecutionClient {
    client: reqwest::Client,
    base_url: String,
}

impl ExecutionClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, TallyError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| TallyError::Config(format!("invalid n8n API key header value: {e}")))?;
        key.set_sensitive(true);
        headers.insert("x-n8n-api-key", key);
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
            base_url: normalize_base_url(base_url),
        })
    }

    /// Creates a client from the `[n8n]` config section.
    pub fn from_config(config: &N8nConfig, timeout: Duration) -> Result<Self, TallyError> {
        let (api_key, base_url) = config.require_credentials()?;
        Self::new(api_key, base_url, timeout)
    }

    /// Returns the normalized base URL, always ending in `/api/v1`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn execution_url(&self, execution_id: &str) -> Result<Url, TallyError> {
        let mut url = Url::parse(&format!("{}/executions", self.base_url))
            .map_err(|e| TallyError::Config(format!("invalid n8n base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| TallyError::Config("n8n base URL cannot carry a path".into()))?
            .push(execution_id);
        url.query_pairs_mut().append_pair("includeData", "true");
        Ok(url)
    }

    /// Fetches one execution with its full run data.
    ///
    /// Transport and status failures are reported as
    /// `Failed to fetch execution data: ...`. The returned value is already
    /// unwrapped (see [`unwrap_execution`]).
    pub async fn execution(&self, execution_id: &str) -> Result<Value, TallyError> {
        if execution_id.trim().is_empty() {
            return Err(TallyError::InvalidInput("Execution ID is required".into()));
        }
        let url = self.execution_url(execution_id)?;

        let body = self
            .get_text(url)
            .await
            .map_err(|e| e.context("Failed to fetch execution data"))?;

        if body.trim().is_empty() {
            return Err(TallyError::upstream("No execution data returned"));
        }
        let value: Value = serde_json::from_str(&body).map_err(|e| TallyError::Upstream {
            message: format!("Failed to fetch execution data: invalid JSON: {e}"),
            source: Some(Box::new(e)),
        })?;
        if is_empty_body(&value) {
            return Err(TallyError::upstream("No execution data returned"));
        }
        Ok(unwrap_execution(value))
    }

    async fn get_text(&self, url: Url) -> Result<String, TallyError> {
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
        debug!(status = %status, "n8n response received");

        let body = response.text().await.map_err(|e| TallyError::Upstream {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(TallyError::upstream(format!(
                "n8n API returned {status}: {body}"
            )));
        }
        Ok(body)
    }
}

fn is_empty_body(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Selects the execution object from an API response.
///
/// An object carrying `id` is the execution itself; otherwise an object-valued
/// `data` field is; otherwise the body is used as-is.
pub fn unwrap_execution(body: Value) -> Value {
    match body {
        Value::Object(map) if map.contains_key("id") => Value::Object(map),
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

impl SourceAdapter for ExecutionClient {
    fn name(&self) -> &str {
        "n8n"
    }
}

#[async_trait]
impl ExecutionSource for ExecutionClient {
    async fn fetch_execution(&self, execution_id: &str) -> Result<Value, TallyError> {
        self.execution(execution_id).await
    }
}
