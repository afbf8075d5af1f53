// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock source adapters with canned responses and call counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use tokentally_core::{
    ExecutionSource, GenerationSource, GenerationStats, PricingEntry, PricingSource,
    SourceAdapter, TallyError,
};

/// A pricing source returning a fixed table, or a fixed failure.
#[derive(Clone, Default)]
pub struct MockPricingSource {
    entries: Vec<PricingEntry>,
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockPricingSource {
    pub fn new(entries: Vec<PricingEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    /// A source whose every fetch fails with an upstream error.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Number of times the table has been fetched.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SourceAdapter for MockPricingSource {
    fn name(&self) -> &str {
        "mock-pricing"
    }
}

#[async_trait]
impl PricingSource for MockPricingSource {
    async fn fetch_pricing_table(&self) -> Result<Vec<PricingEntry>, TallyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(TallyError::upstream(message.clone())),
            None => Ok(self.entries.clone()),
        }
    }
}

/// A generation source keyed by generation id.
///
/// Unknown ids fail with an upstream 404-style error.
#[derive(Clone, Default)]
pub struct MockGenerationSource {
    generations: Arc<Mutex<HashMap<String, Value>>>,
    calls: Arc<AtomicUsize>,
}

impl MockGenerationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the raw stats JSON returned for `id`.
    pub async fn insert(&self, id: &str, raw: Value) {
        self.generations.lock().await.insert(id.to_string(), raw);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SourceAdapter for MockGenerationSource {
    fn name(&self) -> &str {
        "mock-generation"
    }
}

#[async_trait]
impl GenerationSource for MockGenerationSource {
    async fn fetch_generation(
        &self,
        generation_id: &str,
    ) -> Result<(GenerationStats, Value), TallyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let raw = self
            .generations
            .lock()
            .await
            .get(generation_id)
            .cloned()
            .ok_or_else(|| {
                TallyError::upstream(format!("API returned 404 Not Found: {generation_id}"))
            })?;
        let stats = serde_json::from_value(raw.clone())
            .map_err(|e| TallyError::upstream(format!("failed to parse generation stats: {e}")))?;
        Ok((stats, raw))
    }
}

/// An execution source keyed by execution id.
#[derive(Clone, Default)]
pub struct MockExecutionSource {
    executions: Arc<Mutex<HashMap<String, Value>>>,
}

impl MockExecutionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: &str, execution: Value) {
        self.executions.lock().await.insert(id.to_string(), execution);
    }
}

impl SourceAdapter for MockExecutionSource {
    fn name(&self) -> &str {
        "mock-execution"
    }
}

#[async_trait]
impl ExecutionSource for MockExecutionSource {
    async fn fetch_execution(&self, execution_id: &str) -> Result<Value, TallyError> {
        if execution_id.is_empty() {
            return Err(TallyError::InvalidInput("Execution ID is required".into()));
        }
        self.executions
            .lock()
            .await
            .get(execution_id)
            .cloned()
            .ok_or_else(|| TallyError::upstream("No execution data returned"))
    }
}
