use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::Deserialize;
use tracing::debug;

use viewops_common::ViewOpsError;
use viewops_core::intent::PROMPT_REQUIRED;
use viewops_core::AiResponse;

use super::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AiQueryRequest {
    #[serde(default)]
    prompt: Option<String>,
}

/// `POST /api/ai-query`: one prompt in, one query result out.
pub async fn api_ai_query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AiQueryRequest>, JsonRejection>,
) -> Result<Json<AiResponse>, ApiError> {
    let prompt = match body {
        Ok(Json(AiQueryRequest {
            prompt: Some(prompt),
        })) => prompt,
        Ok(_) => return Err(ViewOpsError::bad_request(PROMPT_REQUIRED).into()),
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable AI query body");
            return Err(ViewOpsError::bad_request(PROMPT_REQUIRED).into());
        }
    };

    let response = state.service.resolve(&prompt).await?;
    Ok(Json(response))
}
