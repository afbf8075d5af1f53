// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenRouter source adapter for tokentally.
//!
//! Fetches the model pricing catalog (`GET /models`) and per-generation
//! statistics (`GET /generation?id=`), both with bearer authentication.

pub mod client;
pub mod types;

pub use client::OpenRouterClient;
pub use types::ModelInfo;
