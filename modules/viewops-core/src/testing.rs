// Test doubles for the three trait seams.
//
// - MockSelector (ToolSelector): fixed tool call, no call, or failure
// - MockEmbedder (TextEmbedder): deterministic byte-derived vectors
// - MockStore (OperationalStore): canned results, records every call
//
// Plus sample_batch() for building realistic batch rows.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use serde_json::{json, Value};

use ai_client::{ToolCall, ToolDefinition};
use viewops_common::{NewNote, RawData};
use viewops_graphql::QueryExecutionError;

use crate::traits::{OperationalStore, TextEmbedder, ToolSelector};

/// A batch row, in the engine's JSON shape, with plausible metrics for `batch_number`.
pub fn sample_batch(batch_number: i32) -> Value {
    let id = Uuid::from_u128(0x1a4f09f6_125d_48ee_a5a2_000000000000 + batch_number as u128);
    json!({
        "id": id,
        "batch_number": batch_number,
        "scheme": "Angus Scheme",
        "kill_date": "2024-03-14",
        "cost_per_kg": 6.42,
        "cold_weight_kg": 10450.5,
        "yield_percentage": 54.1
    })
}

// ---------------------------------------------------------------------------
// MockSelector
// ---------------------------------------------------------------------------

/// What the selector saw on one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorRequest {
    pub system: String,
    pub prompt: String,
    pub tool_names: Vec<String>,
}

enum Selection {
    Call(ToolCall),
    Nothing,
    Fail(String),
}

pub struct MockSelector {
    selection: Selection,
    requests: Mutex<Vec<SelectorRequest>>,
}

impl MockSelector {
    fn with(selection: Selection) -> Self {
        Self {
            selection,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with a function call to `name` with `arguments`.
    pub fn function(name: &str, arguments: serde_json::Value) -> Self {
        Self::with(Selection::Call(ToolCall::function(name, arguments.to_string())))
    }

    /// Always answer with `call` verbatim (raw arguments, any call type).
    pub fn returning(call: ToolCall) -> Self {
        Self::with(Selection::Call(call))
    }

    /// The model returns no tool call.
    pub fn nothing() -> Self {
        Self::with(Selection::Nothing)
    }

    /// The model API fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self::with(Selection::Fail(message.to_string()))
    }

    pub fn requests(&self) -> Vec<SelectorRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolSelector for MockSelector {
    async fn select_tool(
        &self,
        system: &str,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Option<ToolCall>> {
        self.requests.lock().unwrap().push(SelectorRequest {
            system: system.to_string(),
            prompt: prompt.to_string(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });

        match &self.selection {
            Selection::Call(call) => Ok(Some(call.clone())),
            Selection::Nothing => Ok(None),
            Selection::Fail(message) => bail!("{message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockEmbedder
// ---------------------------------------------------------------------------

/// Deterministic embedder: the first bytes of the text scaled into [0, 1],
/// zero-padded to `dimensions`.
pub struct MockEmbedder {
    dimensions: usize,
    failing: HashSet<String>,
    texts: Mutex<Vec<String>>,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            failing: HashSet::new(),
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Fail whenever asked to embed exactly `text`.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Every text passed to `embed`, in order.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextEmbedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.texts.lock().unwrap().push(text.to_string());
        if self.failing.contains(text) {
            bail!("MockEmbedder: embedding service unavailable for {text:?}");
        }
        let mut v = vec![0.0f32; self.dimensions];
        for (i, b) in text.bytes().take(self.dimensions).enumerate() {
            v[i] = b as f32 / 255.0;
        }
        Ok(v)
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

fn weight_aggregate(cold_weight_kg: Value, count: i64) -> Value {
    json!({
        "batches_aggregate": {
            "aggregate": { "sum": { "cold_weight_kg": cold_weight_kg }, "count": count }
        }
    })
}

/// One call made against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    BatchByNumber(i32),
    WeightByScheme(String),
    SearchNotes {
        dimensions: usize,
        match_threshold: String,
        match_count: i64,
    },
    InsertNote {
        batch_id: Uuid,
        content: String,
        dimensions: usize,
    },
}

pub struct MockStore {
    batches: Vec<Value>,
    weight: Value,
    notes: Vec<Value>,
    fail_all: bool,
    failing_inserts: HashSet<Uuid>,
    calls: Mutex<Vec<StoreCall>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
            weight: weight_aggregate(Value::Null, 0),
            notes: Vec::new(),
            fail_all: false,
            failing_inserts: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a batch row; lookups match on its `batch_number` field.
    pub fn with_batch(mut self, batch: Value) -> Self {
        self.batches.push(batch);
        self
    }

    /// Aggregate returned by every scheme query. `cold_weight_kg` is taken
    /// as-is, so strings and nulls can be served too.
    pub fn with_weight(mut self, cold_weight_kg: impl Into<Value>, count: i64) -> Self {
        self.weight = weight_aggregate(cold_weight_kg.into(), count);
        self
    }

    pub fn with_note(mut self, note_content: &str, batch: Option<Value>) -> Self {
        self.notes.push(json!({
            "note_content": note_content,
            "batch": batch,
        }));
        self
    }

    /// Every call fails as if the engine were unreachable.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Inserts for `batch_id` fail; everything else succeeds.
    pub fn failing_insert_for(mut self, batch_id: Uuid) -> Self {
        self.failing_inserts.insert(batch_id);
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) -> Result<(), QueryExecutionError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_all {
            return Err(QueryExecutionError);
        }
        Ok(())
    }
}

#[async_trait]
impl OperationalStore for MockStore {
    async fn batch_by_number(&self, batch_number: i32) -> Result<RawData, QueryExecutionError> {
        self.record(StoreCall::BatchByNumber(batch_number))?;
        let batches: Vec<Value> = self
            .batches
            .iter()
            .filter(|b| b["batch_number"].as_i64() == Some(i64::from(batch_number)))
            .cloned()
            .collect();
        Ok(json!({ "batches": batches }))
    }

    async fn weight_by_scheme(&self, pattern: &str) -> Result<RawData, QueryExecutionError> {
        self.record(StoreCall::WeightByScheme(pattern.to_string()))?;
        Ok(self.weight.clone())
    }

    async fn search_notes(
        &self,
        query_vector: &[f32],
        match_threshold: &str,
        match_count: i64,
    ) -> Result<RawData, QueryExecutionError> {
        self.record(StoreCall::SearchNotes {
            dimensions: query_vector.len(),
            match_threshold: match_threshold.to_string(),
            match_count,
        })?;
        let limit = usize::try_from(match_count).unwrap_or(0);
        let notes: Vec<Value> = self.notes.iter().take(limit).cloned().collect();
        Ok(json!({ "search_batch_notes": notes }))
    }

    async fn insert_note(&self, note: &NewNote) -> Result<Uuid, QueryExecutionError> {
        self.record(StoreCall::InsertNote {
            batch_id: note.batch_id,
            content: note.content.clone(),
            dimensions: note.embedding.len(),
        })?;
        if self.failing_inserts.contains(&note.batch_id) {
            return Err(QueryExecutionError);
        }
        Ok(Uuid::new_v4())
    }
}
