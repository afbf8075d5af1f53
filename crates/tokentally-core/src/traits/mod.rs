// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source traits implemented by the HTTP clients and the test mocks.
//!
//! All async traits use `#[async_trait]` so transformers can hold them as
//! `Arc<dyn ...>` trait objects.

pub mod adapter;
pub mod execution;
pub mod pricing;

pub use adapter::SourceAdapter;
pub use execution::ExecutionSource;
pub use pricing::{GenerationSource, PricingSource};
