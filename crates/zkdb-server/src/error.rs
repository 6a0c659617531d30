//! Server error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use zkdb_common::ErrorCode;
use zkdb_sql::SqlError;
use zkdb_storage::StorageError;

/// Errors surfaced by the database facade and the HTTP API.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Statement or table operation failed.
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// A request body could not be decoded against the table schema.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Unexpected failure, such as a panicked worker task.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::Sql(e) => e.code(),
            ServerError::InvalidPayload(_) => ErrorCode::InvalidArgument,
            ServerError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::SyntaxError
            | ErrorCode::SchemaError
            | ErrorCode::ColumnMismatch
            | ErrorCode::TypeConversion
            | ErrorCode::UnknownColumn
            | ErrorCode::TableExists
            | ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::UnknownTable | ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::SequenceConflict => StatusCode::CONFLICT,
            ErrorCode::TransientFetch => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(e: StorageError) -> Self {
        ServerError::Sql(SqlError::from(e))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.code();
        let body = json!({
            "error": {
                "code": code.to_string(),
                "category": code.category(),
                "message": self.to_string(),
            }
        });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Server result type.
pub type ServerResult<T> = Result<T, ServerError>;
