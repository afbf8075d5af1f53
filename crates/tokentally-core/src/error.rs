// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every tokentally crate.

use thiserror::Error;

/// The primary error type returned by sources, transformers, and the CLI.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Missing or invalid configuration (API key, base URL, option values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream HTTP failures: network errors, non-2xx statuses, malformed bodies.
    #[error("{message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A model id did not resolve against the pricing table.
    #[error(
        "Model \"{model}\" not found in OpenRouter models list. Please check if the model ID is correct."
    )]
    ModelNotFound { model: String },

    /// An input record lacks a field the operation requires.
    #[error("{0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TallyError {
    /// Builds an [`TallyError::Upstream`] without an underlying source.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            source: None,
        }
    }

    /// Prefixes an upstream error message with `context`, keeping its source.
    ///
    /// Other variants are converted into an upstream error whose message is
    /// `"{context}: {self}"`.
    pub fn context(self, context: &str) -> Self {
        match self {
            Self::Upstream { message, source } => Self::Upstream {
                message: format!("{context}: {message}"),
                source,
            },
            other => Self::Upstream {
                message: format!("{context}: {other}"),
                source: Some(Box::new(other)),
            },
        }
    }
}
