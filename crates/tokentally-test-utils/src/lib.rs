// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for tokentally.
//!
//! Mock implementations of the pricing, generation and execution sources plus
//! JSON fixtures shaped like real upstream responses, so transformer and
//! pipeline tests run without network access.

pub mod fixtures;
pub mod mock_source;

pub use mock_source::{MockExecutionSource, MockGenerationSource, MockPricingSource};
