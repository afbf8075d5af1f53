// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, positive timeouts, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::TallyConfig;

/// Log levels accepted by `runtime.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TallyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.runtime.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "runtime.log_level `{}` must be one of: {}",
                config.runtime.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.runtime.http_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "runtime.http_timeout_secs must be greater than 0".to_string(),
        });
    }

    if let Some(message) = check_http_url("openrouter.base_url", &config.openrouter.base_url) {
        errors.push(ConfigError::Validation { message });
    }

    if let Some(url) = config.n8n.base_url.as_deref() {
        if let Some(message) = check_http_url("n8n.base_url", url) {
            errors.push(ConfigError::Validation { message });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(key: &str, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return Some(format!("{key} must not be empty"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Some(format!("{key} `{url}` must start with http:// or https://"));
    }
    None
}
