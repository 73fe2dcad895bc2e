//! Error types for the server

use crate::error::ReadmitError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ReadmitError> for ServerError {
    fn from(err: ReadmitError) -> Self {
        match err {
            e if e.is_client_error() => ServerError::BadRequest(e.to_string()),
            e @ (ReadmitError::SchemaMismatch { .. } | ReadmitError::ColumnOrderMismatch { .. }) => {
                ServerError::SchemaMismatch(e.to_string())
            }
            e => ServerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::SchemaMismatch(msg) => {
                tracing::error!(detail = %msg, "Request produced features outside the model schema");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_maps_to_bad_request() {
        let err: ServerError = ReadmitError::InputError("Age must be a number".to_string()).into();
        assert!(matches!(err, ServerError::BadRequest(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err: ServerError = ReadmitError::ModelNotFitted.into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ServerError = ReadmitError::SchemaMismatch { missing: vec!["Age".into()], extra: vec![] }.into();
        assert!(matches!(err, ServerError::SchemaMismatch(_)));
    }
}
