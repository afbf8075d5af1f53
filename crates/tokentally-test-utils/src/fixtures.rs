// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned upstream payloads.

use serde_json::{json, Value};
use tokentally_core::PricingEntry;

fn entry(id: &str, name: &str, prompt: f64, completion: f64) -> PricingEntry {
    PricingEntry {
        id: id.to_string(),
        name: name.to_string(),
        prompt_price: prompt,
        completion_price: completion,
    }
}

/// A small pricing table covering every lookup tier.
///
/// `openai/gpt-4o-mini` precedes `openai/gpt-4o` so that a substring match
/// on `gpt-4o` would pick the wrong entry if the exact/suffix tiers were
/// skipped.
pub fn pricing_entries() -> Vec<PricingEntry> {
    vec![
        entry("openai/gpt-4o-mini", "OpenAI: GPT-4o-mini", 0.000_000_15, 0.000_000_6),
        entry("openai/gpt-4o", "OpenAI: GPT-4o", 0.000_005, 0.000_015),
        entry(
            "anthropic/claude-3.5-sonnet",
            "Anthropic: Claude 3.5 Sonnet",
            0.000_003,
            0.000_015,
        ),
        entry(
            "meta-llama/llama-3.1-8b-instruct:free",
            "Meta: Llama 3.1 8B Instruct (free)",
            0.0,
            0.0,
        ),
    ]
}

/// The same table as a `/models` response body.
pub fn models_response() -> Value {
    let data: Vec<Value> = pricing_entries()
        .into_iter()
        .map(|e| {
            json!({
                "id": e.id,
                "name": e.name,
                "pricing": {
                    "prompt": e.prompt_price.to_string(),
                    "completion": e.completion_price.to_string(),
                },
            })
        })
        .collect();
    json!({ "data": data })
}

/// Raw generation stats for `id`: `openai/gpt-4o`, 1000 in / 500 out.
pub fn generation_stats(id: &str) -> Value {
    json!({
        "id": id,
        "model": "openai/gpt-4o",
        "total_cost": 0.0125,
        "tokens_prompt": 990,
        "tokens_completion": 480,
        "native_tokens_prompt": 1000,
        "native_tokens_completion": 500,
        "native_tokens_cached": 0,
        "native_tokens_reasoning": 0,
        "latency": 1250.0,
        "finish_reason": "stop",
        "provider_name": "OpenAI",
    })
}

/// An execution with two language-model calls on two nodes.
pub fn execution(id: &str) -> Value {
    json!({
        "id": id,
        "finished": true,
        "data": { "resultData": { "runData": {
            "When chat message received": [
                { "data": { "main": [[ { "json": { "chatInput": "hello" } } ]] } }
            ],
            "OpenAI Chat Model": [ {
                "data": { "ai_languageModel": [[ { "json": {
                    "response": { "generations": [] },
                    "tokenUsage": { "promptTokens": 1000, "completionTokens": 500, "totalTokens": 1500 }
                } } ]] },
                "inputOverride": { "ai_languageModel": [[ { "json": {
                    "messages": ["System: You are a helpful assistant", "Human: hello"],
                    "estimatedTokens": 980,
                    "options": { "model": "gpt-4o" }
                } } ]] }
            } ],
            "Claude Chat Model": [ {
                "data": { "ai_languageModel": [[ { "json": {
                    "tokenUsage": { "promptTokens": 200, "completionTokens": 100, "totalTokens": 300 }
                } } ]] },
                "inputOverride": { "ai_languageModel": [[ { "json": {
                    "messages": ["Human: summarize"],
                    "estimatedTokens": 190,
                    "options": { "model": "anthropic/claude-3.5-sonnet" }
                } } ]] }
            } ]
        } } }
    })
}

/// An execution whose nodes made no language-model calls.
pub fn execution_without_usage(id: &str) -> Value {
    json!({
        "id": id,
        "data": { "resultData": { "runData": {
            "Webhook": [ { "data": { "main": [[ { "json": { "ok": true } } ]] } } ]
        } } }
    })
}
