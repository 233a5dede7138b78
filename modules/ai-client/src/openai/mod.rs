mod client;
pub(crate) mod schema;
pub(crate) mod types;

pub use schema::tool_parameters;

use crate::error::AiError;
use crate::tool::{ToolCall, ToolDefinition};
use crate::traits::EmbedAgent;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use client::OpenAiClient;
use types::{ChatRequest, ChatResponse, ToolDefinitionWire, WireMessage};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

// =============================================================================
// OpenAi Agent
// =============================================================================

/// Handle to the OpenAI API. Cheap to clone; the underlying HTTP connection
/// pool is shared between clones.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    embedding_model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self, AiError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AiError::Config("OPENAI_API_KEY environment variable not set".into()))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Get the chat model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the embedding model name.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key, self.http.clone());
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Ask the model to pick exactly one of `tools` for `prompt`.
    ///
    /// The request sets `tool_choice: "required"`, so a free-text answer is
    /// never accepted. Returns the first tool call of the first choice, or
    /// `None` if the model still produced none.
    pub async fn select_tool(
        &self,
        system: &str,
        prompt: &str,
        tools: &[ToolDefinition],
        temperature: f32,
    ) -> Result<Option<ToolCall>, AiError> {
        let mut request = ChatRequest::new(&self.model)
            .message(WireMessage::system(system))
            .message(WireMessage::user(prompt));

        if types::supports_temperature(&self.model) {
            request = request.temperature(temperature);
        }

        for tool in tools {
            request = request.tool(ToolDefinitionWire::function(
                &tool.name,
                &tool.description,
                tool.parameters.clone(),
            ));
        }

        let response = self.client().chat(&request.require_tool()).await?;
        let call = first_tool_call(response)?;

        debug!(tool = call.as_ref().map(|c| c.name.as_str()), "OpenAI tool selection");
        Ok(call)
    }

    /// Create an embedding for `text` with the configured embedding model.
    pub async fn create_embedding(&self, text: &str) -> Result<Vec<f32>, AiError> {
        self.client().embed(&self.embedding_model, text).await
    }
}

/// Pull the first tool call out of a chat response.
///
/// A response without choices is an error; a choice without tool calls is `None`.
/// Non-function calls carry no `function` body and come back with empty name
/// and arguments, leaving the type check to the caller.
fn first_tool_call(response: ChatResponse) -> Result<Option<ToolCall>, AiError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::EmptyResponse("no choices in response".to_string()))?;

    Ok(choice
        .message
        .tool_calls
        .and_then(|calls| calls.into_iter().next())
        .map(|wire| {
            let (name, arguments) = wire
                .function
                .map(|f| (f.name, f.arguments))
                .unwrap_or_default();
            ToolCall {
                id: wire.id,
                call_type: wire.call_type,
                name,
                arguments,
            }
        }))
}

// =============================================================================
// EmbedAgent Implementation
// =============================================================================

#[async_trait]
impl EmbedAgent for OpenAi {
    async fn embed(&self, text: impl Into<String> + Send) -> Result<Vec<f32>> {
        Ok(self.create_embedding(&text.into()).await?)
    }
}
