// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model usage extraction from n8n execution logs.
//!
//! The raw execution JSON is first read into a small typed schema
//! ([`ExecutionLog`] → [`NodeRun`] → [`LanguageModelOutput`] /
//! [`InputOverride`]). Every parser is total: a field with the wrong shape
//! becomes `None` or is skipped, so extraction never fails.

use serde::Serialize;
use serde_json::{Map, Value};
use tokentally_core::{token_count, TokenCounts, UsageRecord};

/// Warning emitted when an execution contains no language-model usage.
pub const NO_USAGE_WARNING: &str = "No token usage data found in this execution";

/// Connection type n8n uses for language-model sub-node traffic.
const LANGUAGE_MODEL_KEY: &str = "ai_languageModel";

/// `data.resultData.runData` of one execution, in host order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionLog {
    pub nodes: Vec<(String, Vec<NodeRun>)>,
}

/// One run of one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRun {
    pub outputs: Vec<LanguageModelOutput>,
    pub overrides: Vec<InputOverride>,
}

/// A `{ json }` record from `data.ai_languageModel`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageModelOutput {
    pub token_usage: Option<TokenCounts>,
}

/// A `{ json }` record from `inputOverride.ai_languageModel`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputOverride {
    pub model: Option<String>,
    pub messages: Option<Vec<String>>,
    pub estimated_tokens: Option<u64>,
}

impl ExecutionLog {
    /// Reads `data.resultData.runData`. Returns `None` if the path is missing.
    pub fn parse(execution: &Value) -> Option<Self> {
        let run_data = execution
            .get("data")?
            .get("resultData")?
            .get("runData")?
            .as_object()?;

        let nodes = run_data
            .iter()
            .filter_map(|(name, runs)| {
                let runs = runs.as_array()?;
                Some((name.clone(), runs.iter().map(NodeRun::parse).collect()))
            })
            .collect();
        Some(Self { nodes })
    }
}

impl NodeRun {
    pub fn parse(run: &Value) -> Self {
        let outputs = language_model_records(run.get("data"))
            .map(LanguageModelOutput::parse)
            .collect();
        let overrides = language_model_records(run.get("inputOverride"))
            .map(InputOverride::parse)
            .collect();
        Self { outputs, overrides }
    }

    /// Folds the run's input overrides into `(model, messages, estimated_tokens)`.
    ///
    /// The first override naming a model wins; for messages and the estimate
    /// the last override carrying one wins.
    fn request_context(&self) -> (Option<String>, Vec<String>, u64) {
        let mut model = None;
        let mut messages = Vec::new();
        let mut estimated = 0;
        for o in &self.overrides {
            if model.is_none() {
                model.clone_from(&o.model);
            }
            if let Some(m) = &o.messages {
                messages.clone_from(m);
            }
            if let Some(e) = o.estimated_tokens {
                estimated = e;
            }
        }
        (model, messages, estimated)
    }
}

impl LanguageModelOutput {
    pub fn parse(json: &Map<String, Value>) -> Self {
        let token_usage = json
            .get("tokenUsage")
            .and_then(Value::as_object)
            .map(TokenCounts::from_json);
        Self { token_usage }
    }
}

impl InputOverride {
    pub fn parse(json: &Map<String, Value>) -> Self {
        let model = json
            .get("options")
            .and_then(|o| o.get("model"))
            .and_then(|m| match m {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        let messages = json
            .get("messages")
            .and_then(Value::as_array)
            .map(|msgs| msgs.iter().map(stringify).collect());
        let estimated_tokens = json
            .get("estimatedTokens")
            .filter(|v| v.is_number())
            .map(|v| token_count(Some(v)));
        Self {
            model,
            messages,
            estimated_tokens,
        }
    }
}

/// Iterates the `{ json }` objects under `<parent>.ai_languageModel[][]`.
fn language_model_records(parent: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    parent
        .and_then(|p| p.get(LANGUAGE_MODEL_KEY))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|item| item.get("json")?.as_object())
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extracts one [`UsageRecord`] per language-model output carrying token
/// usage, in node order then run order.
pub fn extract_usage(execution: &Value) -> Vec<UsageRecord> {
    let Some(log) = ExecutionLog::parse(execution) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for (node_name, runs) in &log.nodes {
        for run in runs {
            let (model, messages, estimated_tokens) = run.request_context();
            records.extend(run.outputs.iter().filter_map(|out| {
                out.token_usage.map(|usage| UsageRecord {
                    node_name: node_name.clone(),
                    token_usage: Some(usage),
                    model: model.clone(),
                    messages: messages.clone(),
                    estimated_tokens,
                })
            }));
        }
    }
    records
}

/// Aggregated token usage of one execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub execution_id: String,
    #[serde(rename = "totalTokenUsage")]
    pub total_token_usage: TokenCounts,
    #[serde(rename = "llmCalls")]
    pub llm_calls: Vec<UsageRecord>,
}

impl UsageReport {
    /// Builds the report, or `None` when there are no records to report.
    pub fn from_records(execution_id: &str, records: Vec<UsageRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let total_token_usage = records
            .iter()
            .filter_map(|r| r.token_usage)
            .fold(TokenCounts::default(), TokenCounts::saturating_add);
        Some(Self {
            execution_id: execution_id.to_string(),
            total_token_usage,
            llm_calls: records,
        })
    }
}
