// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive cost tracking.
//!
//! Each record gets a `tokenCost` object computed in one of three modes:
//!
//! - [`TrackMode::FromInput`]: model and token counts read from the record
//! - [`TrackMode::Generation`]: stats looked up by generation id; the
//!   reported total cost replaces the computed one
//! - [`TrackMode::Manual`]: model and counts supplied by the operator
//!
//! Unlike the batch pricer, a model that does not resolve is an error here.
//! The pricing table is fetched lazily, at most once per batch.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokentally_core::{GenerationSource, PriceSource, PricingSource, TallyError};
use tokentally_cost::{CostParams, PricingTable, TokenCostResult};
use tracing::{debug, info};

use crate::input::extract_token_usage;
use crate::records::Record;
use crate::runner::BatchRunner;

/// Where a record's generation id comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationId {
    /// The same id for every record.
    Fixed(String),
    /// A string field of the record.
    Field(String),
}

impl GenerationId {
    fn resolve(&self, record: &Record) -> Result<String, TallyError> {
        let id = match self {
            Self::Fixed(id) => Some(id.as_str()),
            Self::Field(field) => record.get(field).and_then(Value::as_str),
        };
        id.map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| TallyError::InvalidInput("Generation ID is required".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackMode {
    FromInput,
    Generation(GenerationId),
    Manual {
        model: String,
        input_tokens: u64,
        output_tokens: u64,
    },
}

impl TrackMode {
    fn source(&self) -> PriceSource {
        match self {
            Self::FromInput => PriceSource::ModelsApi,
            Self::Generation(_) => PriceSource::GenerationApi,
            Self::Manual { .. } => PriceSource::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackOptions {
    /// Copy the input record's fields into the output.
    pub pass_through_input: bool,
    /// Attach the generation stats as `rawResponse` (generation mode only).
    pub include_raw_response: bool,
    pub continue_on_fail: bool,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            pass_through_input: true,
            include_raw_response: false,
            continue_on_fail: false,
        }
    }
}

/// Pricing table state for one batch.
enum TableSlot {
    Unfetched,
    Ready(PricingTable),
    Failed(String),
}

pub struct CostTracker {
    pricing: Arc<dyn PricingSource>,
    generations: Arc<dyn GenerationSource>,
    mode: TrackMode,
    options: TrackOptions,
}

impl CostTracker {
    pub fn new(
        pricing: Arc<dyn PricingSource>,
        generations: Arc<dyn GenerationSource>,
        mode: TrackMode,
        options: TrackOptions,
    ) -> Self {
        Self {
            pricing,
            generations,
            mode,
            options,
        }
    }

    /// Tracks every record in order.
    ///
    /// Without continue-on-fail the first failed record aborts the batch.
    pub async fn run(&self, records: Vec<Record>) -> Result<Vec<Value>, TallyError> {
        let runner = BatchRunner::new(self.options.continue_on_fail);
        let mut slot = TableSlot::Unfetched;
        let mut out = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let outcome = self.track_one(&mut slot, record).await;
            out.push(runner.settle(index, outcome)?);
        }
        info!(records = out.len(), mode = %self.mode.source(), "batch tracked");
        Ok(out)
    }

    async fn table<'s>(&self, slot: &'s mut TableSlot) -> Result<&'s PricingTable, TallyError> {
        if let TableSlot::Unfetched = slot {
            *slot = match self.pricing.fetch_pricing_table().await {
                Ok(entries) => {
                    let table = PricingTable::new(entries);
                    debug!(models = table.len(), "pricing table loaded");
                    TableSlot::Ready(table)
                }
                Err(e) => TableSlot::Failed(e.context("Failed to fetch pricing data").to_string()),
            };
        }
        match &*slot {
            TableSlot::Ready(table) => Ok(table),
            TableSlot::Failed(message) => Err(TallyError::upstream(message.clone())),
            TableSlot::Unfetched => Err(TallyError::Internal("pricing table not loaded".into())),
        }
    }

    async fn track_one(&self, slot: &mut TableSlot, record: Record) -> Result<Value, TallyError> {
        let (result, raw) = match &self.mode {
            TrackMode::FromInput => (self.from_input(slot, &record).await?, None),
            TrackMode::Generation(id) => {
                let generation_id = id.resolve(&record)?;
                let (result, raw) = self.from_generation(slot, &generation_id).await?;
                (result, Some(raw))
            }
            TrackMode::Manual {
                model,
                input_tokens,
                output_tokens,
            } => (
                self.priced(slot, model, *input_tokens, *output_tokens, None)
                    .await?,
                None,
            ),
        };

        let mut output = if self.options.pass_through_input {
            record
        } else {
            Map::new()
        };
        output.insert(
            "tokenCost".into(),
            serde_json::to_value(&result)
                .map_err(|e| TallyError::Internal(format!("failed to serialize cost: {e}")))?,
        );
        if let (true, Some(raw)) = (self.options.include_raw_response, raw) {
            output.insert("rawResponse".into(), raw);
        }
        Ok(Value::Object(output))
    }

    async fn from_input(
        &self,
        slot: &mut TableSlot,
        record: &Record,
    ) -> Result<TokenCostResult, TallyError> {
        let usage = extract_token_usage(record);
        let Some(model) = usage.model else {
            return Err(TallyError::InvalidInput(
                "Could not find \"model\" field in input record".into(),
            ));
        };
        let (Some(input), Some(output)) = (usage.input_tokens, usage.output_tokens) else {
            return Err(TallyError::InvalidInput(
                "Could not find token usage in input record. Expected \"usage.prompt_tokens\" \
                 and \"usage.completion_tokens\" (or \"usage.input_tokens\" and \
                 \"usage.output_tokens\")"
                    .into(),
            ));
        };
        self.priced(slot, &model, input, output, usage.generation_id)
            .await
    }

    /// Prices `model` strictly: a lookup miss is [`TallyError::ModelNotFound`].
    async fn priced(
        &self,
        slot: &mut TableSlot,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
        generation_id: Option<String>,
    ) -> Result<TokenCostResult, TallyError> {
        let table = self.table(slot).await?;
        let entry = table.lookup(model).ok_or_else(|| TallyError::ModelNotFound {
            model: model.to_string(),
        })?;
        let params = CostParams {
            model: model.to_string(),
            model_name: Some(entry.name.clone()),
            input_tokens,
            output_tokens,
            prompt_price: entry.prompt_price,
            completion_price: entry.completion_price,
            generation_id,
            ..Default::default()
        };
        Ok(TokenCostResult::build(params, self.mode.source(), Utc::now()))
    }

    async fn from_generation(
        &self,
        slot: &mut TableSlot,
        generation_id: &str,
    ) -> Result<(TokenCostResult, Value), TallyError> {
        let (stats, raw) = self.generations.fetch_generation(generation_id).await?;
        let table = self.table(slot).await?;
        let entry = table.lookup(&stats.model);
        if entry.is_none() {
            debug!(model = %stats.model, "generation model not in pricing table");
        }

        let params = CostParams {
            model: stats.model.clone(),
            model_name: entry.map(|e| e.name.clone()),
            input_tokens: stats.prompt_tokens(),
            output_tokens: stats.completion_tokens(),
            prompt_price: entry.map_or(0.0, |e| e.prompt_price),
            completion_price: entry.map_or(0.0, |e| e.completion_price),
            generation_id: Some(stats.id.clone()).filter(|id| !id.is_empty()),
            provider: stats.provider_name.clone(),
            latency: stats.latency,
            finish_reason: stats.finish_reason.clone(),
            cached_tokens: stats.native_tokens_cached,
            reasoning_tokens: stats.native_tokens_reasoning,
            total_cost_override: Some(stats.total_cost),
        };
        Ok((
            TokenCostResult::build(params, PriceSource::GenerationApi, Utc::now()),
            raw,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokentally_test_utils::{fixtures, MockGenerationSource, MockPricingSource};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn tracker(
        pricing: &MockPricingSource,
        generations: &MockGenerationSource,
        mode: TrackMode,
        options: TrackOptions,
    ) -> CostTracker {
        CostTracker::new(
            Arc::new(pricing.clone()),
            Arc::new(generations.clone()),
            mode,
            options,
        )
    }

    fn openai_response(model: &str) -> Record {
        record(json!({
            "id": "gen-abc",
            "model": model,
            "usage": { "prompt_tokens": 1000, "completion_tokens": 500 }
        }))
    }

    #[tokio::test]
    async fn from_input_prices_with_models_api() {
        let pricing = MockPricingSource::new(fixtures::pricing_entries());
        let t = tracker(
            &pricing,
            &MockGenerationSource::new(),
            TrackMode::FromInput,
            TrackOptions::default(),
        );
        let out = t.run(vec![openai_response("gpt-4o")]).await.unwrap();
        let cost = &out[0]["tokenCost"];

        assert_eq!(out[0]["id"], "gen-abc");
        assert_eq!(cost["model"], "gpt-4o");
        assert_eq!(cost["modelName"], "OpenAI: GPT-4o");
        assert_eq!(cost["tokens"], json!({ "input": 1000, "output": 500, "total": 1500 }));
        assert_eq!(cost["costs"]["inputCost"], 0.005);
        assert_eq!(cost["costs"]["outputCost"], 0.0075);
        assert_eq!(cost["costs"]["totalCost"], 0.0125);
        assert_eq!(cost["costs"]["formatted"], "$0.0125");
        assert_eq!(cost["pricing"]["source"], "models_api");
        assert_eq!(cost["metadata"]["generationId"], "gen-abc");
    }

    #[tokio::test]
    async fn pricing_fetched_once_for_many_records() {
        let pricing = MockPricingSource::new(fixtures::pricing_entries());
        let t = tracker(
            &pricing,
            &MockGenerationSource::new(),
            TrackMode::FromInput,
            TrackOptions::default(),
        );
        let batch = vec![openai_response("gpt-4o"); 4];
        assert_eq!(t.run(batch).await.unwrap().len(), 4);
        assert_eq!(pricing.calls(), 1);
    }

    #[tokio::test]
    async fn unknown_model_fails_batch_naming_model() {
        let t = tracker(
            &MockPricingSource::new(fixtures::pricing_entries()),
            &MockGenerationSource::new(),
            TrackMode::FromInput,
            TrackOptions::default(),
        );
        let err = t
            .run(vec![openai_response("acme/mystery-1")])
            .await
            .unwrap_err();
        assert!(matches!(err, TallyError::ModelNotFound { ref model } if model == "acme/mystery-1"));
    }

    #[tokio::test]
    async fn continue_on_fail_emits_error_records() {
        let pricing = MockPricingSource::new(fixtures::pricing_entries());
        let t = tracker(
            &pricing,
            &MockGenerationSource::new(),
            TrackMode::FromInput,
            TrackOptions {
                continue_on_fail: true,
                ..Default::default()
            },
        );
        let out = t
            .run(vec![
                record(json!({ "usage": { "prompt_tokens": 1, "completion_tokens": 1 } })),
                record(json!({ "model": "gpt-4o" })),
                openai_response("gpt-4o"),
            ])
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out[0]["error"].as_str().unwrap().contains("\"model\""));
        assert!(out[1]["error"].as_str().unwrap().contains("token usage"));
        assert_eq!(out[2]["tokenCost"]["costs"]["totalCost"], 0.0125);
    }

    #[tokio::test]
    async fn pass_through_can_be_disabled() {
        let t = tracker(
            &MockPricingSource::new(fixtures::pricing_entries()),
            &MockGenerationSource::new(),
            TrackMode::FromInput,
            TrackOptions {
                pass_through_input: false,
                ..Default::default()
            },
        );
        let out = t.run(vec![openai_response("gpt-4o")]).await.unwrap();
        let keys: Vec<_> = out[0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["tokenCost"]);
    }

    #[tokio::test]
    async fn generation_mode_uses_reported_cost() {
        let generations = MockGenerationSource::new();
        generations
            .insert("gen-1", fixtures::generation_stats("gen-1"))
            .await;
        let t = tracker(
            &MockPricingSource::new(fixtures::pricing_entries()),
            &generations,
            TrackMode::Generation(GenerationId::Field("generation".into())),
            TrackOptions {
                include_raw_response: true,
                ..Default::default()
            },
        );
        let out = t
            .run(vec![record(json!({ "generation": "gen-1" }))])
            .await
            .unwrap();
        let cost = &out[0]["tokenCost"];
        assert_eq!(cost["tokens"]["input"], 1000);
        assert_eq!(cost["tokens"]["output"], 500);
        assert_eq!(cost["tokens"]["cached"], 0);
        assert_eq!(cost["costs"]["totalCost"], 0.0125);
        assert_eq!(cost["pricing"]["source"], "generation_api");
        assert_eq!(cost["metadata"]["provider"], "OpenAI");
        assert_eq!(cost["metadata"]["finishReason"], "stop");
        assert_eq!(out[0]["rawResponse"]["id"], "gen-1");
    }

    #[tokio::test]
    async fn generation_pricing_miss_is_zero_prices() {
        let generations = MockGenerationSource::new();
        let mut stats = fixtures::generation_stats("gen-2");
        stats["model"] = json!("acme/unlisted");
        stats["total_cost"] = json!(0.42);
        generations.insert("gen-2", stats).await;

        let t = tracker(
            &MockPricingSource::new(fixtures::pricing_entries()),
            &generations,
            TrackMode::Generation(GenerationId::Fixed("gen-2".into())),
            TrackOptions::default(),
        );
        let out = t.run(vec![record(json!({}))]).await.unwrap();
        let cost = &out[0]["tokenCost"];
        assert_eq!(cost["pricing"]["promptPricePerToken"], 0.0);
        assert_eq!(cost["costs"]["inputCost"], 0.0);
        assert_eq!(cost["costs"]["totalCost"], 0.42);
        assert!(cost.get("modelName").is_none());
        assert!(out[0].get("rawResponse").is_none());
    }

    #[tokio::test]
    async fn generation_mode_requires_id() {
        let t = tracker(
            &MockPricingSource::new(fixtures::pricing_entries()),
            &MockGenerationSource::new(),
            TrackMode::Generation(GenerationId::Field("id".into())),
            TrackOptions::default(),
        );
        let err = t.run(vec![record(json!({ "id": "" }))]).await.unwrap_err();
        assert_eq!(err.to_string(), "Generation ID is required");
    }

    #[tokio::test]
    async fn manual_mode_prices_given_counts() {
        let t = tracker(
            &MockPricingSource::new(fixtures::pricing_entries()),
            &MockGenerationSource::new(),
            TrackMode::Manual {
                model: "anthropic/claude-3.5-sonnet".into(),
                input_tokens: 200,
                output_tokens: 100,
            },
            TrackOptions::default(),
        );
        let out = t.run(vec![record(json!({}))]).await.unwrap();
        let cost = &out[0]["tokenCost"];
        assert_eq!(cost["costs"]["totalCost"], 0.0021);
        assert_eq!(cost["pricing"]["source"], "manual");
        let per_million = cost["pricing"]["promptPricePerMillion"].as_f64().unwrap();
        assert!((per_million - 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn pricing_failure_is_fetched_once_under_continue_on_fail() {
        let pricing = MockPricingSource::failing("API returned 500");
        let t = tracker(
            &pricing,
            &MockGenerationSource::new(),
            TrackMode::FromInput,
            TrackOptions {
                continue_on_fail: true,
                ..Default::default()
            },
        );
        let out = t
            .run(vec![openai_response("gpt-4o"), openai_response("gpt-4o")])
            .await
            .unwrap();
        let expected = "Failed to fetch pricing data: API returned 500";
        assert_eq!(out[0]["error"], expected);
        assert_eq!(out[1]["error"], expected);
        assert_eq!(pricing.calls(), 1);
    }
}
