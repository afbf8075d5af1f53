// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the tokentally configuration system.

use tokentally_config::diagnostic::ConfigError;
use tokentally_config::model::{DEFAULT_OPENROUTER_BASE_URL, TallyConfig};
use tokentally_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[runtime]
log_level = "debug"
http_timeout_secs = 10
continue_on_fail = true

[openrouter]
api_key = "sk-or-123"
base_url = "http://localhost:9000/api/v1"

[n8n]
api_key = "n8n-key"
base_url = "http://localhost:5678"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.runtime.log_level, "debug");
    assert_eq!(config.runtime.http_timeout_secs, 10);
    assert!(config.runtime.continue_on_fail);
    assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-or-123"));
    assert_eq!(config.openrouter.base_url, "http://localhost:9000/api/v1");
    assert_eq!(config.n8n.api_key.as_deref(), Some("n8n-key"));
    assert_eq!(config.n8n.base_url.as_deref(), Some("http://localhost:5678"));
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.runtime.log_level, "info");
    assert_eq!(config.runtime.http_timeout_secs, 30);
    assert!(!config.runtime.continue_on_fail);
    assert!(config.openrouter.api_key.is_none());
    assert_eq!(config.openrouter.base_url, DEFAULT_OPENROUTER_BASE_URL);
    assert!(config.n8n.api_key.is_none());
    assert!(config.n8n.base_url.is_none());
}

/// Unknown field in [openrouter] is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_openrouter_produces_error() {
    let toml = r#"
[openrouter]
api_kye = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("api_kye"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Dotted overrides land on the right section keys.
#[test]
fn dotted_override_sets_api_key() {
    use figment::{providers::Serialized, Figment};

    let config: TallyConfig = Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(("openrouter.api_key", "sk-from-env"))
        .extract()
        .expect("should set api_key via dot notation");

    assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-from-env"));
}

/// Unknown key produces an UnknownKey diagnostic with a suggestion.
#[test]
fn diagnostic_error_includes_unknown_key_and_suggestion() {
    let toml = r#"
[openrouter]
api_kye = "test"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "api_kye"
                && suggestion.as_deref() == Some("api_key")
                && valid_keys.contains("base_url")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'api_kye' with suggestion 'api_key', got: {errors:?}"
    );
}

/// Invalid type (string where number expected) produces a clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[runtime]
http_timeout_secs = "soon"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("http_timeout_secs"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// Validation errors surface through load_and_validate_str.
#[test]
fn validation_runs_after_deserialization() {
    let toml = r#"
[runtime]
http_timeout_secs = 0

[n8n]
base_url = "n8n.local"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// ConfigError renders with miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "api_kye".to_string(),
        suggestion: Some("api_key".to_string()),
        valid_keys: "api_key, base_url".to_string(),
        span: None,
        src: None,
    };

    let help = error.help().expect("should have help text").to_string();
    assert!(help.contains("did you mean `api_key`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("api_kye"));
}

/// load_and_validate_str with valid TOML returns Ok config.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[openrouter]
api_key = "sk-or-1"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-or-1"));
}
