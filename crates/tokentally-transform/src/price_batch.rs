// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch pricing of usage reports.
//!
//! Every record's `llmCalls` entries get a `cost` breakdown and the record
//! gets a `totalCost` aggregate. Lookup misses and missing usage price as
//! zero, so only a failed pricing fetch can fail the batch.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokentally_core::{CostBreakdown, PricingSource, TallyError, TokenCounts};
use tokentally_cost::{cost_for_entry, sum_costs, PricingTable};
use tracing::{debug, info, warn};

use crate::records::Record;

/// Prices usage reports against one pricing-table fetch per batch.
pub struct PriceCalculator {
    source: Arc<dyn PricingSource>,
}

impl PriceCalculator {
    pub fn new(source: Arc<dyn PricingSource>) -> Self {
        Self { source }
    }

    /// Fetches the pricing table, reporting failures as
    /// `Failed to fetch pricing data: ...`.
    pub async fn fetch_table(&self) -> Result<PricingTable, TallyError> {
        let entries = self
            .source
            .fetch_pricing_table()
            .await
            .map_err(|e| e.context("Failed to fetch pricing data"))?;
        let table = PricingTable::new(entries);
        debug!(source = self.source.name(), models = table.len(), "pricing table loaded");
        Ok(table)
    }

    pub async fn run(&self, records: Vec<Record>) -> Result<Vec<Value>, TallyError> {
        let table = self.fetch_table().await?;
        let priced: Vec<Value> = records
            .into_iter()
            .map(|record| price_record(&table, record))
            .collect();
        info!(records = priced.len(), "batch priced");
        Ok(priced)
    }
}

/// Attaches costs to one record. Never fails.
pub fn price_record(table: &PricingTable, mut record: Record) -> Value {
    let costs: Vec<CostBreakdown> = match record.get_mut("llmCalls") {
        Some(Value::Array(calls)) => calls
            .iter_mut()
            .filter_map(|call| {
                let call = call.as_object_mut()?;
                let cost = price_call(table, call);
                call.insert("cost".into(), breakdown_value(&cost));
                Some(cost)
            })
            .collect(),
        _ => Vec::new(),
    };
    record.insert("totalCost".into(), breakdown_value(&sum_costs(&costs)));
    Value::Object(record)
}

fn price_call(table: &PricingTable, call: &Map<String, Value>) -> CostBreakdown {
    let model = call.get("model").and_then(Value::as_str).filter(|m| !m.is_empty());
    let usage = call
        .get("tokenUsage")
        .and_then(Value::as_object)
        .map(TokenCounts::from_json);

    let (Some(model), Some(usage)) = (model, usage) else {
        return CostBreakdown::zero();
    };
    match table.lookup(model) {
        Some(entry) => cost_for_entry(&usage, entry),
        None => {
            warn!(model, "model not in pricing table, priced as zero");
            CostBreakdown::zero()
        }
    }
}

fn breakdown_value(cost: &CostBreakdown) -> Value {
    // CostBreakdown holds only numbers and a string.
    serde_json::to_value(cost).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokentally_test_utils::{fixtures, MockPricingSource};

    fn table() -> PricingTable {
        PricingTable::new(fixtures::pricing_entries())
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn prices_each_call_and_totals() {
        let out = price_record(
            &table(),
            record(json!({
                "execution_id": "981",
                "llmCalls": [
                    { "nodeName": "A", "model": "openai/gpt-4o",
                      "tokenUsage": { "promptTokens": 1000, "completionTokens": 500, "totalTokens": 1500 } },
                    { "nodeName": "B", "model": "gpt-4o",
                      "tokenUsage": { "promptTokens": 1000, "completionTokens": 500, "totalTokens": 1500 } }
                ]
            })),
        );
        assert_eq!(out["execution_id"], "981");
        let first = &out["llmCalls"][0]["cost"];
        assert_eq!(first["promptCost"], 0.005);
        assert_eq!(first["completionCost"], 0.0075);
        assert_eq!(first["totalCost"], 0.0125);
        assert_eq!(first["currency"], "USD");
        assert_eq!(out["llmCalls"][1]["cost"]["totalCost"], 0.0125);
        assert_eq!(out["llmCalls"][1]["nodeName"], "B");
        assert_eq!(out["totalCost"]["totalCost"], 0.025);
    }

    #[test]
    fn missing_model_usage_or_match_prices_zero() {
        let out = price_record(
            &table(),
            record(json!({
                "llmCalls": [
                    { "model": null, "tokenUsage": { "promptTokens": 10 } },
                    { "model": "openai/gpt-4o", "tokenUsage": null },
                    { "model": "acme/unknown-model", "tokenUsage": { "promptTokens": 10 } },
                    { "model": "meta-llama/llama-3.1-8b-instruct:free",
                      "tokenUsage": { "promptTokens": 10, "completionTokens": 10 } }
                ]
            })),
        );
        for call in out["llmCalls"].as_array().unwrap() {
            assert_eq!(call["cost"]["totalCost"], 0.0);
        }
        assert_eq!(out["totalCost"]["totalCost"], 0.0);
    }

    #[test]
    fn record_without_calls_passes_through_with_zero_total() {
        let out = price_record(&table(), record(json!({ "foo": "bar", "llmCalls": "nope" })));
        assert_eq!(out["foo"], "bar");
        assert_eq!(out["llmCalls"], "nope");
        assert_eq!(
            out["totalCost"],
            json!({ "promptCost": 0.0, "completionCost": 0.0, "totalCost": 0.0, "currency": "USD" })
        );
    }

    #[test]
    fn total_equals_sum_of_calls() {
        let out = price_record(
            &table(),
            record(json!({
                "llmCalls": [
                    { "model": "anthropic/claude-3.5-sonnet",
                      "tokenUsage": { "promptTokens": 200, "completionTokens": 100 } },
                    { "model": "openai/gpt-4o-mini",
                      "tokenUsage": { "promptTokens": 12345, "completionTokens": 678 } }
                ]
            })),
        );
        let sum: f64 = out["llmCalls"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["cost"]["totalCost"].as_f64().unwrap())
            .sum();
        let total = out["totalCost"]["totalCost"].as_f64().unwrap();
        assert!((sum - total).abs() < 1e-9, "sum {sum} total {total}");
    }

    #[test]
    fn loose_counts_still_price() {
        let out = price_record(
            &table(),
            record(json!({
                "llmCalls": [
                    { "model": "gpt-4o",
                      "tokenUsage": { "promptTokens": 1000, "completionTokens": 500, "totalTokens": null } },
                    { "model": "gpt-4o",
                      "tokenUsage": { "promptTokens": 1000, "completionTokens": 500, "totalTokens": 1500.0 } },
                    { "model": "gpt-4o",
                      "tokenUsage": { "promptTokens": "1000", "completionTokens": 500 } }
                ]
            })),
        );
        for call in out["llmCalls"].as_array().unwrap() {
            assert_eq!(call["cost"]["totalCost"], 0.0125);
        }
        assert_eq!(out["totalCost"]["totalCost"], 0.0375);
    }

    #[tokio::test]
    async fn fetches_pricing_once_per_batch() {
        let source = MockPricingSource::new(fixtures::pricing_entries());
        let calculator = PriceCalculator::new(Arc::new(source.clone()));
        let out = calculator
            .run(vec![record(json!({"a": 1})), record(json!({"b": 2})), record(json!({"c": 3}))])
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_batch() {
        let calculator = PriceCalculator::new(Arc::new(MockPricingSource::failing(
            "Invalid response from OpenRouter API",
        )));
        let err = calculator.run(vec![record(json!({}))]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to fetch pricing data: Invalid response from OpenRouter API"
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn unresolved_model_is_logged() {
        price_record(
            &table(),
            record(json!({
                "llmCalls": [ { "model": "acme/unknown-model", "tokenUsage": { "promptTokens": 1 } } ]
            })),
        );
        assert!(logs_contain("model not in pricing table"));
    }
}
