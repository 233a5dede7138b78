use thiserror::Error;

/// Every way an AI query can fail, as seen by the caller.
///
/// Messages are safe to return to clients. Raw transport and database errors
/// are logged where they occur and never carried in these variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewOpsError {
    /// The prompt is unusable or the model produced no actionable tool call.
    #[error("{0}")]
    BadRequest(String),

    /// The model picked a tool that has no execution path.
    #[error("{0}")]
    NotImplemented(String),

    #[error("Failed to fetch data from operational database.")]
    QueryExecution,

    #[error("{0}")]
    Internal(String),
}

impl ViewOpsError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code this error maps onto.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotImplemented(_) => 501,
            Self::QueryExecution | Self::Internal(_) => 500,
        }
    }

    /// Message for the `error` field of the response body.
    pub fn client_message(&self) -> String {
        match self {
            Self::BadRequest(_) | Self::NotImplemented(_) => self.to_string(),
            Self::QueryExecution | Self::Internal(_) => {
                format!("Internal server error: {self}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ViewOpsError::bad_request("x").status_code(), 400);
        assert_eq!(ViewOpsError::NotImplemented("x".into()).status_code(), 501);
        assert_eq!(ViewOpsError::QueryExecution.status_code(), 500);
        assert_eq!(ViewOpsError::internal("x").status_code(), 500);
    }

    #[test]
    fn client_errors_pass_message_through() {
        let err = ViewOpsError::bad_request("Prompt is required");
        assert_eq!(err.client_message(), "Prompt is required");
    }

    #[test]
    fn server_errors_are_prefixed() {
        assert_eq!(
            ViewOpsError::QueryExecution.client_message(),
            "Internal server error: Failed to fetch data from operational database."
        );
        assert_eq!(
            ViewOpsError::internal("boom").client_message(),
            "Internal server error: boom"
        );
    }
}
