use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use ai_client::ToolDefinition;
use viewops_common::{RawData, ViewOpsError};

use crate::tools::{catalog, ToolInvocation};
use crate::traits::{OperationalStore, TextEmbedder, ToolSelector};

/// Similarity threshold sent to `search_batch_notes`. The engine function
/// declares this argument as a string.
pub const MATCH_THRESHOLD: &str = "0.3";

/// Maximum number of notes returned by a semantic search.
pub const MATCH_COUNT: i64 = 3;

pub const SYSTEM_INSTRUCTION: &str = "You are ViewOps, an intelligent interface for operational data. \
Analyze the user prompt and select the appropriate tool. \
Do not guess parameters; extract them precisely from the prompt.";

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const NO_TOOL_SELECTED: &str =
    "I couldn't determine which operational tool to use for that request.";

// --- Response envelope ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiResponse {
    pub success: bool,
    pub intent: Intent,
    pub data: QueryData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub tool_used: String,
    pub parameters: Value,
}

/// Result of whichever query ran, forwarded exactly as the engine returned it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryData {
    Batches(RawData),
    SchemeWeight(RawData),
    Notes(RawData),
}

impl QueryData {
    pub fn raw(&self) -> &RawData {
        match self {
            Self::Batches(data) | Self::SchemeWeight(data) | Self::Notes(data) => data,
        }
    }
}

impl AiResponse {
    pub fn new(invocation: &ToolInvocation, data: QueryData) -> Self {
        Self {
            success: true,
            intent: Intent {
                tool_used: invocation.name().to_string(),
                parameters: invocation.parameters(),
            },
            data,
        }
    }
}

// --- Service ---

/// Turns a free-text prompt into one database query.
///
/// Holds only request-independent handles, so one instance serves every
/// request concurrently.
pub struct IntentService {
    selector: Arc<dyn ToolSelector>,
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn OperationalStore>,
    tools: Vec<ToolDefinition>,
}

impl IntentService {
    pub fn new(
        selector: Arc<dyn ToolSelector>,
        embedder: Arc<dyn TextEmbedder>,
        store: Arc<dyn OperationalStore>,
    ) -> Self {
        Self {
            selector,
            embedder,
            store,
            tools: catalog(),
        }
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Resolve `prompt` to a tool call and run the matching query.
    pub async fn resolve(&self, prompt: &str) -> Result<AiResponse, ViewOpsError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ViewOpsError::bad_request(PROMPT_REQUIRED));
        }

        let call = self
            .selector
            .select_tool(SYSTEM_INSTRUCTION, prompt, &self.tools)
            .await
            .map_err(|e| {
                error!(error = %e, "Language model tool selection failed");
                ViewOpsError::internal("Failed to resolve intent with the language model.")
            })?
            .ok_or_else(|| ViewOpsError::bad_request(NO_TOOL_SELECTED))?;

        if !call.is_function() {
            return Err(ViewOpsError::bad_request(format!(
                "Unsupported tool type: {}",
                call.call_type
            )));
        }

        let invocation = ToolInvocation::from_call(&call.name, &call.arguments)?;
        info!(
            tool = invocation.name(),
            prompt_chars = prompt.chars().count(),
            "Resolved intent"
        );

        let data = self.execute(&invocation).await?;
        Ok(AiResponse::new(&invocation, data))
    }

    /// Run the single query that corresponds to `invocation`.
    pub async fn execute(&self, invocation: &ToolInvocation) -> Result<QueryData, ViewOpsError> {
        let data = match invocation {
            ToolInvocation::BatchDetails(args) => {
                QueryData::Batches(self.store.batch_by_number(args.batch_number).await?)
            }
            ToolInvocation::SchemeWeight(args) => {
                QueryData::SchemeWeight(self.store.weight_by_scheme(&args.pattern()).await?)
            }
            ToolInvocation::NoteSearch(args) => {
                let vector = self.embedder.embed(&args.search_query).await.map_err(|e| {
                    error!(error = %e, "Embedding generation failed");
                    ViewOpsError::internal("Failed to generate embedding for search query.")
                })?;
                QueryData::Notes(
                    self.store
                        .search_notes(&vector, MATCH_THRESHOLD, MATCH_COUNT)
                        .await?,
                )
            }
        };
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_batch, MockEmbedder, MockSelector, MockStore, StoreCall};
    use crate::tools::{BatchDetailsArgs, NoteSearchArgs, SchemeWeightArgs};

    fn service(store: Arc<MockStore>, embedder: Arc<MockEmbedder>) -> IntentService {
        IntentService::new(Arc::new(MockSelector::nothing()), embedder, store)
    }

    #[tokio::test]
    async fn batch_details_runs_exact_lookup() {
        let store = Arc::new(MockStore::new().with_batch(sample_batch(662)));
        let svc = service(store.clone(), Arc::new(MockEmbedder::new(8)));

        let data = svc
            .execute(&ToolInvocation::BatchDetails(BatchDetailsArgs { batch_number: 662 }))
            .await
            .unwrap();

        assert_eq!(store.calls(), vec![StoreCall::BatchByNumber(662)]);
        let QueryData::Batches(raw) = data else {
            panic!("expected batches");
        };
        assert_eq!(raw["batches"][0]["batch_number"], 662);
    }

    #[tokio::test]
    async fn scheme_weight_wraps_pattern() {
        let store = Arc::new(MockStore::new());
        let svc = service(store.clone(), Arc::new(MockEmbedder::new(8)));

        svc.execute(&ToolInvocation::SchemeWeight(SchemeWeightArgs {
            scheme: "Angus".into(),
        }))
        .await
        .unwrap();

        assert_eq!(store.calls(), vec![StoreCall::WeightByScheme("%Angus%".into())]);
    }

    #[tokio::test]
    async fn note_search_embeds_then_searches_with_fixed_limits() {
        let store = Arc::new(MockStore::new());
        let embedder = Arc::new(MockEmbedder::new(8));
        let svc = service(store.clone(), embedder.clone());

        svc.execute(&ToolInvocation::NoteSearch(NoteSearchArgs {
            search_query: "contamination concerns".into(),
        }))
        .await
        .unwrap();

        assert_eq!(embedder.texts(), vec!["contamination concerns".to_string()]);
        assert_eq!(
            store.calls(),
            vec![StoreCall::SearchNotes {
                dimensions: 8,
                match_threshold: "0.3".into(),
                match_count: 3,
            }]
        );
    }

    #[tokio::test]
    async fn embedding_failure_skips_search() {
        let store = Arc::new(MockStore::new());
        let embedder = Arc::new(MockEmbedder::new(8).failing_on("anything"));
        let svc = service(store.clone(), embedder);

        let err = svc
            .execute(&ToolInvocation::NoteSearch(NoteSearchArgs {
                search_query: "anything".into(),
            }))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ViewOpsError::internal("Failed to generate embedding for search query.")
        );
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_query_execution() {
        let store = Arc::new(MockStore::new().failing());
        let svc = service(store, Arc::new(MockEmbedder::new(8)));

        let err = svc
            .execute(&ToolInvocation::BatchDetails(BatchDetailsArgs { batch_number: 1 }))
            .await
            .unwrap_err();
        assert_eq!(err, ViewOpsError::QueryExecution);
    }

    #[tokio::test]
    async fn batch_row_is_forwarded_verbatim() {
        let row = serde_json::json!({
            "id": "1a4f09f6-125d-48ee-a5a2-d1e13f035d5c",
            "batch_number": 662,
            "scheme": "Angus Scheme",
            "kill_date": "2024-03-14T00:00:00+00:00",
            "cost_per_kg": "6.42",
            "cold_weight_kg": null,
            "yield_percentage": 54.1
        });
        let store = Arc::new(MockStore::new().with_batch(row.clone()));
        let svc = service(store, Arc::new(MockEmbedder::new(8)));

        let data = svc
            .execute(&ToolInvocation::BatchDetails(BatchDetailsArgs { batch_number: 662 }))
            .await
            .unwrap();

        assert_eq!(data.raw(), &serde_json::json!({ "batches": [row] }));
    }

    #[test]
    fn envelope_uses_camel_case_intent() {
        let invocation = ToolInvocation::BatchDetails(BatchDetailsArgs { batch_number: 662 });
        let response = AiResponse::new(
            &invocation,
            QueryData::Batches(serde_json::json!({ "batches": [] })),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["intent"]["toolUsed"], "get_batch_details");
        assert_eq!(value["intent"]["parameters"]["batch_number"], 662);
        assert_eq!(value["data"], serde_json::json!({ "batches": [] }));
    }
}
