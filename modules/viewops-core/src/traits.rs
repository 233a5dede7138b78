// Trait abstractions for the external collaborators of an AI query.
//
// ToolSelector: the chat model choosing one tool from the catalog.
// TextEmbedder: text to fixed-length vector.
// OperationalStore: the four operations the GraphQL engine exposes.
//
// Handlers hold these as Arc<dyn ...>, so tests swap in the mocks from
// `testing` with no network and no database.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use ai_client::{OpenAi, ToolCall, ToolDefinition};
use viewops_common::{NewNote, RawData};
use viewops_graphql::{GraphqlClient, QueryExecutionError};

/// Tool selection is deterministic as far as the provider allows.
pub const SELECTION_TEMPERATURE: f32 = 0.0;

// ---------------------------------------------------------------------------
// ToolSelector
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ToolSelector: Send + Sync {
    /// Ask the model to choose one of `tools` for `prompt`. `Ok(None)` means
    /// the model returned no tool call at all.
    async fn select_tool(
        &self,
        system: &str,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Option<ToolCall>>;
}

#[async_trait]
impl ToolSelector for OpenAi {
    async fn select_tool(
        &self,
        system: &str,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Option<ToolCall>> {
        Ok(OpenAi::select_tool(self, system, prompt, tools, SELECTION_TEMPERATURE).await?)
    }
}

// ---------------------------------------------------------------------------
// TextEmbedder
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

// ---------------------------------------------------------------------------
// OperationalStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait OperationalStore: Send + Sync {
    /// Exact lookup by human-readable batch number.
    async fn batch_by_number(&self, batch_number: i32) -> Result<RawData, QueryExecutionError>;

    /// Sum and count of cold weight over batches whose scheme matches `pattern`
    /// case-insensitively. `pattern` already carries its wildcards.
    async fn weight_by_scheme(&self, pattern: &str) -> Result<RawData, QueryExecutionError>;

    /// Notes whose embeddings are within `match_threshold` of `query_vector`,
    /// at most `match_count` of them.
    async fn search_notes(
        &self,
        query_vector: &[f32],
        match_threshold: &str,
        match_count: i64,
    ) -> Result<RawData, QueryExecutionError>;

    /// Write a note with its embedding; returns the new note id.
    async fn insert_note(&self, note: &NewNote) -> Result<Uuid, QueryExecutionError>;
}

#[async_trait]
impl OperationalStore for GraphqlClient {
    async fn batch_by_number(&self, batch_number: i32) -> Result<RawData, QueryExecutionError> {
        GraphqlClient::batch_by_number(self, batch_number).await
    }

    async fn weight_by_scheme(&self, pattern: &str) -> Result<RawData, QueryExecutionError> {
        GraphqlClient::weight_by_scheme(self, pattern).await
    }

    async fn search_notes(
        &self,
        query_vector: &[f32],
        match_threshold: &str,
        match_count: i64,
    ) -> Result<RawData, QueryExecutionError> {
        GraphqlClient::search_notes(self, query_vector, match_threshold, match_count).await
    }

    async fn insert_note(&self, note: &NewNote) -> Result<Uuid, QueryExecutionError> {
        GraphqlClient::insert_note(self, note).await
    }
}
