// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for tokentally.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use tokentally_core::TallyError;

/// Default OpenRouter API base URL.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Top-level tokentally configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    /// Process-wide runtime behavior.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Pricing and generation-stats provider credentials.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Workflow host API credentials for execution-log lookups.
    #[serde(default)]
    pub n8n: N8nConfig,
}

/// Runtime behavior shared by every command.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timeout applied to every outbound HTTP request.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Emit `{ "error": ... }` for a failed record instead of aborting the batch.
    #[serde(default)]
    pub continue_on_fail: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            http_timeout_secs: default_http_timeout_secs(),
            continue_on_fail: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

/// OpenRouter API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    /// Bearer token. Required by every command that touches pricing.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL, without a trailing endpoint path.
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openrouter_base_url(),
        }
    }
}

fn default_openrouter_base_url() -> String {
    DEFAULT_OPENROUTER_BASE_URL.to_string()
}

impl OpenRouterConfig {
    /// Returns the API key, or a configuration error naming the missing field.
    pub fn require_api_key(&self) -> Result<&str, TallyError> {
        non_empty(self.api_key.as_deref())
            .ok_or_else(|| TallyError::Config("OpenRouter API key is required (openrouter.api_key)".into()))
    }
}

/// Workflow host (n8n) API configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct N8nConfig {
    /// Value sent in the `X-N8N-API-KEY` header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Instance URL. `/api/v1` is appended when missing.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl N8nConfig {
    /// Returns `(api_key, base_url)`, or a configuration error naming both
    /// fields when either is missing.
    pub fn require_credentials(&self) -> Result<(&str, &str), TallyError> {
        match (non_empty(self.api_key.as_deref()), non_empty(self.base_url.as_deref())) {
            (Some(key), Some(url)) => Ok((key, url)),
            _ => Err(TallyError::Config(
                "n8n API credentials (n8n.api_key and n8n.base_url) are required".into(),
            )),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
