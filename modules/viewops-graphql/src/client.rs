use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use viewops_common::{InsertedNote, NewNote, RawData, ViewOpsError};

use crate::queries;

pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// The single failure kind of the database access layer.
///
/// Deliberately carries no detail: the cause is logged where it happens.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Failed to fetch data from operational database.")]
pub struct QueryExecutionError;

impl From<QueryExecutionError> for ViewOpsError {
    fn from(_: QueryExecutionError) -> Self {
        ViewOpsError::QueryExecution
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// GraphQL-over-HTTP client authenticated with the Hasura admin secret.
///
/// Reuses a single `reqwest::Client` for connection pooling.
#[derive(Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    admin_secret: String,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>, admin_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            admin_secret: admin_secret.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers(&self) -> Result<HeaderMap, QueryExecutionError> {
        let mut headers = HeaderMap::new();
        let secret = HeaderValue::from_str(&self.admin_secret).map_err(|e| {
            error!(error = %e, "Hasura admin secret is not a valid header value");
            QueryExecutionError
        })?;
        headers.insert(ADMIN_SECRET_HEADER, secret);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Run one query or mutation and decode its `data` object into `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<Value>,
    ) -> Result<T, QueryExecutionError> {
        let operation = queries::operation_name(document).unwrap_or("anonymous");
        debug!(operation, "Hasura request");

        let body = GraphqlRequest {
            query: document,
            variables,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(operation, error = %e, "Hasura query error: request failed");
                QueryExecutionError
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            error!(operation, error = %e, "Hasura query error: unreadable body");
            QueryExecutionError
        })?;

        decode_response(operation, status, &text)
    }

    pub async fn batch_by_number(&self, batch_number: i32) -> Result<RawData, QueryExecutionError> {
        self.execute(
            &queries::get_batch_by_number(),
            Some(serde_json::json!({ "batch_number": batch_number })),
        )
        .await
    }

    /// `pattern` is passed to `_ilike` untouched; callers add the wildcards.
    pub async fn weight_by_scheme(&self, pattern: &str) -> Result<RawData, QueryExecutionError> {
        self.execute(
            queries::GET_WEIGHT_BY_SCHEME,
            Some(serde_json::json!({ "scheme": pattern })),
        )
        .await
    }

    pub async fn search_notes(
        &self,
        query_vector: &[f32],
        match_threshold: &str,
        match_count: i64,
    ) -> Result<RawData, QueryExecutionError> {
        self.execute(
            &queries::search_notes(),
            Some(serde_json::json!({
                "query_vector": vector_literal(query_vector),
                "match_threshold": match_threshold,
                "match_count": match_count,
            })),
        )
        .await
    }

    pub async fn insert_note(&self, note: &NewNote) -> Result<Uuid, QueryExecutionError> {
        #[derive(Deserialize)]
        struct Inserted {
            insert_batch_notes_one: InsertedNote,
        }

        let inserted: Inserted = self
            .execute(
                queries::INSERT_BATCH_NOTE,
                Some(serde_json::json!({
                    "batch_id": note.batch_id,
                    "content": note.content,
                    "embedding": vector_literal(&note.embedding),
                })),
            )
            .await?;
        Ok(inserted.insert_batch_notes_one.id)
    }
}

/// Text form of a vector accepted by the engine's `vector` scalar: `[0.1,0.2,...]`.
pub fn vector_literal(vector: &[f32]) -> String {
    serde_json::to_string(vector).unwrap_or_else(|_| "[]".to_string())
}

fn decode_response<T: DeserializeOwned>(
    operation: &str,
    status: u16,
    body: &str,
) -> Result<T, QueryExecutionError> {
    if !(200..300).contains(&status) {
        error!(operation, status, body, "Hasura query error: HTTP failure");
        return Err(QueryExecutionError);
    }

    let response: GraphqlResponse<T> = serde_json::from_str(body).map_err(|e| {
        error!(operation, error = %e, "Hasura query error: malformed response");
        QueryExecutionError
    })?;

    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        error!(operation, errors = ?messages, "Hasura query error: GraphQL errors");
        return Err(QueryExecutionError);
    }

    response.data.ok_or_else(|| {
        error!(operation, "Hasura query error: response without data");
        QueryExecutionError
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data_object() {
        let body = r#"{"data":{"batches_aggregate":{"aggregate":{"sum":{"cold_weight_kg":1200.5},"count":4}}}}"#;
        let data: RawData = decode_response("GetWeightByScheme", 200, body).unwrap();
        assert_eq!(data["batches_aggregate"]["aggregate"]["sum"]["cold_weight_kg"], 1200.5);
        assert_eq!(data["batches_aggregate"]["aggregate"]["count"], 4);
    }

    #[test]
    fn timestamp_and_string_columns_pass_through_untouched() {
        let body = r#"{"data":{"batches":[{
            "id":"1a4f09f6-125d-48ee-a5a2-d1e13f035d5c",
            "batch_number":662,
            "scheme":"Angus Scheme",
            "kill_date":"2024-03-14T00:00:00+00:00",
            "cost_per_kg":"6.42",
            "cold_weight_kg":"10450.50",
            "yield_percentage":null
        }]}}"#;
        let data: RawData = decode_response("GetBatchByNumber", 200, body).unwrap();

        let expected: Value = serde_json::from_str::<Value>(body).unwrap()["data"].clone();
        assert_eq!(data, expected);
        assert_eq!(data["batches"][0]["kill_date"], "2024-03-14T00:00:00+00:00");
        assert_eq!(data["batches"][0]["cold_weight_kg"], "10450.50");
    }

    #[test]
    fn stringified_aggregate_sum_is_accepted() {
        let body = r#"{"data":{"batches_aggregate":{"aggregate":{"sum":{"cold_weight_kg":"31250.75"},"count":3}}}}"#;
        let data: RawData = decode_response("GetWeightByScheme", 200, body).unwrap();
        assert_eq!(
            data["batches_aggregate"]["aggregate"]["sum"]["cold_weight_kg"],
            "31250.75"
        );
    }

    #[test]
    fn graphql_errors_collapse_to_generic_error() {
        let body = r#"{"errors":[{"message":"field 'batchez' not found in type: 'query_root'","extensions":{"code":"validation-failed"}}]}"#;
        let err = decode_response::<Value>("GetBatchByNumber", 200, body).unwrap_err();
        assert_eq!(err, QueryExecutionError);
        assert_eq!(
            err.to_string(),
            "Failed to fetch data from operational database."
        );
    }

    #[test]
    fn http_failure_is_query_error() {
        let body = r#"{"error":"invalid x-hasura-admin-secret/x-hasura-access-key","code":"access-denied"}"#;
        assert!(decode_response::<Value>("GetBatchByNumber", 401, body).is_err());
    }

    #[test]
    fn malformed_body_is_query_error() {
        assert!(decode_response::<Value>("SearchNotes", 200, "<html>bad gateway</html>").is_err());
    }

    #[test]
    fn missing_data_is_query_error() {
        assert!(decode_response::<Value>("SearchNotes", 200, r#"{"data":null}"#).is_err());
    }

    #[test]
    fn partial_data_with_errors_is_rejected() {
        let body = r#"{"data":{"batches":[]},"errors":[{"message":"boom"}]}"#;
        assert!(decode_response::<RawData>("GetBatchByNumber", 200, body).is_err());
    }

    #[test]
    fn vector_literal_is_json_array_text() {
        assert_eq!(vector_literal(&[0.5, -1.0, 0.25]), "[0.5,-1.0,0.25]");
        assert_eq!(vector_literal(&[]), "[]");
    }

    #[test]
    fn query_error_maps_to_taxonomy() {
        let err: ViewOpsError = QueryExecutionError.into();
        assert_eq!(err, ViewOpsError::QueryExecution);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_query_error() {
        let client = GraphqlClient::new("http://127.0.0.1:9/v1/graphql", "secret");
        let result = client.batch_by_number(662).await;
        assert_eq!(result.unwrap_err(), QueryExecutionError);
    }

    #[tokio::test]
    async fn invalid_secret_header_is_query_error() {
        let client = GraphqlClient::new("http://127.0.0.1:9/v1/graphql", "bad\nsecret");
        let result = client.weight_by_scheme("%Angus%").await;
        assert_eq!(result.unwrap_err(), QueryExecutionError);
    }
}
