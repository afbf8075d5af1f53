// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source of per-model token prices.

use async_trait::async_trait;

use crate::error::TallyError;
use crate::traits::adapter::SourceAdapter;
use crate::types::{GenerationStats, PricingEntry};

/// Supplies the pricing table used by the cost calculators.
///
/// Implementations must refetch on every call; callers are responsible for
/// fetching at most once per batch.
#[async_trait]
pub trait PricingSource: SourceAdapter {
    /// Fetches every known model with its per-token prices, in source order.
    async fn fetch_pricing_table(&self) -> Result<Vec<PricingEntry>, TallyError>;
}

/// Supplies exact statistics for a single past generation.
#[async_trait]
pub trait GenerationSource: SourceAdapter {
    /// Looks up a generation by id.
    ///
    /// Returns the stats together with the raw response body so callers can
    /// attach it to their output.
    async fn fetch_generation(
        &self,
        generation_id: &str,
    ) -> Result<(GenerationStats, serde_json::Value), TallyError>;
}
