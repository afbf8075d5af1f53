// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog listing.

use serde::Serialize;
use tokentally_core::{PricingEntry, PricingSource, TallyError};
use tokentally_cost::PricingTable;

const PER_MILLION: f64 = 1_000_000.0;

/// One priced model, with prices per million tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub id: String,
    pub label: String,
    pub prompt_per_million: f64,
    pub completion_per_million: f64,
}

impl From<&PricingEntry> for ModelSummary {
    fn from(entry: &PricingEntry) -> Self {
        let name = if entry.name.is_empty() { &entry.id } else { &entry.name };
        Self {
            id: entry.id.clone(),
            label: format!("{name} ({})", entry.id),
            prompt_per_million: entry.prompt_price * PER_MILLION,
            completion_per_million: entry.completion_price * PER_MILLION,
        }
    }
}

/// Fetches the catalog and returns it sorted by label.
pub async fn list_models(source: &dyn PricingSource) -> Result<Vec<ModelSummary>, TallyError> {
    let entries = source
        .fetch_pricing_table()
        .await
        .map_err(|e| e.context("Failed to fetch pricing data"))?;
    let table = PricingTable::new(entries);
    let mut models: Vec<ModelSummary> = table.iter().map(ModelSummary::from).collect();
    models.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(models)
}
