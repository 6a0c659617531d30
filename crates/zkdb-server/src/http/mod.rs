//! HTTP API.
//!
//! | route                        | body                           | response                                   |
//! |------------------------------|--------------------------------|--------------------------------------------|
//! | `POST /entity`               | `{entity_name, data}`          | `{id, table_name, sequence_cid}`           |
//! | `POST /append-data`          | `{table_name, data}`           | `{id, table_name, sequence_cid}`           |
//! | `POST /sequence/name`        | `{entity_name}`                | `{id, table_name, sequence_cid}`           |
//! | `POST /convert-to-embedding` | `{text}`                       | `{embedding}`                              |
//! | `POST /query`                | `{query, proof?}`              | `{result}` / `{result, circuit, proof}` / `{result, proof_error}` |
//!
//! `data` is one table's share of a chunk:
//! `{columns, column_types, rows, indexes?}`. Errors are returned as
//! `{"error": {"code", "category", "message"}}` with a status derived from
//! the error code.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::net::TcpListener;
use tracing::debug;
use zkdb_proof::ProofOutcome;
use zkdb_storage::{SequencePointer, TablePayload};

use crate::database::Database;
use crate::error::{ServerError, ServerResult};

#[derive(Clone)]
struct AppState {
    db: Arc<Database>,
}

/// Body of `POST /entity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRequest {
    /// Table to create.
    pub entity_name: String,
    /// Schema and initial rows.
    pub data: TablePayload,
}

/// Body of `POST /append-data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendRequest {
    /// Table to extend.
    pub table_name: String,
    /// Rows to append, with the table's schema.
    pub data: TablePayload,
}

/// Body of `POST /sequence/name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRequest {
    /// Table to resolve.
    pub entity_name: String,
}

/// Body of `POST /convert-to-embedding`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Text to embed.
    pub text: String,
}

/// Response of `POST /convert-to-embedding`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// Embedding vector.
    pub embedding: Vec<f64>,
}

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// One SQL statement.
    pub query: String,
    /// Request a membership proof. Defaults to the server setting.
    #[serde(default)]
    pub proof: Option<bool>,
}

/// Response of `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Rows, or groups of rows for `GROUP BY`.
    pub result: JsonValue,
    /// Hex-encoded circuit, when a proof was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit: Option<String>,
    /// Hex-encoded proof, when a proof was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
    /// Why a requested proof could not be produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_error: Option<String>,
}

/// Builds the API router.
pub fn router(db: Arc<Database>) -> Router {
    Router::new()
        .route("/entity", post(handle_create_entity))
        .route("/append-data", post(handle_append_data))
        .route("/sequence/name", post(handle_sequence_by_name))
        .route("/convert-to-embedding", post(handle_convert_to_embedding))
        .route("/query", post(handle_query))
        .with_state(AppState { db })
}

/// Serves the API on `listener` until `shutdown` completes.
pub async fn serve(
    listener: TcpListener,
    db: Arc<Database>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(db))
        .with_graceful_shutdown(shutdown)
        .await
}

// --- POST /entity ---

async fn handle_create_entity(
    State(state): State<AppState>,
    Json(request): Json<EntityRequest>,
) -> ServerResult<Json<SequencePointer>> {
    let pointer = blocking(move || {
        state
            .db
            .create_entity(&request.entity_name, request.data)
    })
    .await?;
    Ok(Json(pointer))
}

// --- POST /append-data ---

async fn handle_append_data(
    State(state): State<AppState>,
    Json(request): Json<AppendRequest>,
) -> ServerResult<Json<SequencePointer>> {
    let pointer =
        blocking(move || state.db.append_data(&request.table_name, request.data)).await?;
    Ok(Json(pointer))
}

// --- POST /sequence/name ---

async fn handle_sequence_by_name(
    State(state): State<AppState>,
    Json(request): Json<SequenceRequest>,
) -> ServerResult<Json<SequencePointer>> {
    let pointer = blocking(move || state.db.sequence_by_name(&request.entity_name)).await?;
    Ok(Json(pointer))
}

// --- POST /convert-to-embedding ---

async fn handle_convert_to_embedding(
    State(state): State<AppState>,
    Json(request): Json<EmbeddingRequest>,
) -> Json<EmbeddingResponse> {
    Json(EmbeddingResponse {
        embedding: state.db.embed(&request.text),
    })
}

// --- POST /query ---

async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> ServerResult<Json<QueryResponse>> {
    debug!(query = %request.query, proof = ?request.proof, "query request");
    let output = blocking(move || state.db.execute(&request.query, request.proof)).await?;

    let mut response = QueryResponse {
        result: output.result.to_json(),
        circuit: None,
        proof: None,
        proof_error: None,
    };
    match output.proof {
        Some(ProofOutcome::Proven { circuit, proof }) => {
            response.circuit = Some(circuit.to_hex());
            response.proof = Some(proof.to_hex());
        }
        Some(ProofOutcome::Failed { reason }) => response.proof_error = Some(reason),
        None => {}
    }
    Ok(Json(response))
}

async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}
