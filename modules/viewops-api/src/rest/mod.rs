pub mod ai_query;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use viewops_common::ViewOpsError;

/// Wraps `ViewOpsError` so it can be returned straight from a handler.
#[derive(Debug)]
pub struct ApiError(pub ViewOpsError);

impl From<ViewOpsError> for ApiError {
    fn from(err: ViewOpsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self.0, "AI query failed");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.0.client_message() })),
        )
            .into_response()
    }
}
