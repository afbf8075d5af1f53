// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tokentally.toml` > `~/.config/tokentally/tokentally.toml`
//! > `/etc/tokentally/tokentally.toml` with environment variable overrides via
//! the `TOKENTALLY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TallyConfig;

/// File name looked up in every layer of the hierarchy.
pub const CONFIG_FILE_NAME: &str = "tokentally.toml";

/// System-wide configuration path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/tokentally/tokentally.toml";

/// Path of the per-user configuration file, if a config dir is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tokentally").join(CONFIG_FILE_NAME))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tokentally/tokentally.toml` (system-wide)
/// 3. `~/.config/tokentally/tokentally.toml` (user XDG config)
/// 4. `./tokentally.toml` (local directory)
/// 5. `TOKENTALLY_*` environment variables
pub fn load_config() -> Result<TallyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TOKENTALLY_OPENROUTER_API_KEY` must map to
/// `openrouter.api_key`, not `openrouter.api.key`.
///
/// `TOKENTALLY_EXECUTION_ID` is host context consumed by the CLI, not a config
/// key, so it is filtered out here.
fn env_provider() -> Env {
    Env::prefixed("TOKENTALLY_")
        .filter(|key| !key.as_str().eq_ignore_ascii_case("execution_id"))
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("runtime_", "runtime.", 1)
                .replacen("openrouter_", "openrouter.", 1)
                .replacen("n8n_", "n8n.", 1);
            mapped.into()
        })
}
