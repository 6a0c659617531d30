//! HTTP workflows against the API router.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value as JsonValue};
use tempfile::TempDir;
use tower::ServiceExt;
use zkdb_server::{http, Database, ServerConfig};

async fn post(app: &Router, uri: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null))
}

fn app_for(config: &ServerConfig) -> Router {
    http::router(Arc::new(Database::open(config).unwrap()))
}

#[tokio::test]
async fn test_ingest_query_and_restart() {
    let temp_dir = TempDir::new().unwrap();
    let config = ServerConfig::builder().data_dir(temp_dir.path()).build();
    let app = app_for(&config);

    let (status, created) = post(
        &app,
        "/entity",
        json!({
            "entity_name": "docs",
            "data": {
                "columns": ["id", "body", "embedding"],
                "column_types": {"id": "int", "body": "string", "embedding": "list[float]"},
                "rows": [[1, "red apple", [1.0, 0.0]], [2, "green pear", [0.0, 1.0]]],
                "indexes": {}
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["id"], 1);

    let (status, _) = post(
        &app,
        "/append-data",
        json!({
            "table_name": "docs",
            "data": {
                "columns": ["id", "body", "embedding"],
                "column_types": {"id": "int", "body": "string", "embedding": "list[float]"},
                "rows": [[3, "red cherry", [0.9, 0.1]]]
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &app,
        "/query",
        json!({"query": "SELECT id FROM docs LIMIT 2 COSINE SIMILARITY embedding WITH [1.0, 0.0]"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!([[1, [1.0, 0.0]], [3, [0.9, 0.1]]]));

    // A new process over the same directory sees the same table.
    drop(app);
    let app = app_for(&config);
    let (status, pointer) = post(&app, "/sequence/name", json!({"entity_name": "docs"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pointer["table_name"], "docs");
    assert_ne!(pointer["sequence_cid"], created["sequence_cid"]);

    let (_, body) = post(&app, "/query", json!({"query": "SELECT id FROM docs"})).await;
    assert_eq!(body["result"], json!([[1], [2], [3]]));
}

#[tokio::test]
async fn test_embedding_feeds_vector_queries() {
    let app = app_for(&ServerConfig::builder().embedding_dimension(64).build());

    let (_, apple) = post(&app, "/convert-to-embedding", json!({"text": "apple pie"})).await;
    let (_, pear) = post(&app, "/convert-to-embedding", json!({"text": "pear tart"})).await;
    let apple = apple["embedding"].clone();
    let pear = pear["embedding"].clone();
    assert_eq!(apple.as_array().unwrap().len(), 64);

    post(
        &app,
        "/query",
        json!({"query": "CREATE TABLE recipes (id int, embedding list[float])"}),
    )
    .await;
    let insert = format!(
        "INSERT INTO recipes (id, embedding) VALUES (1, {}), (2, {})",
        pear, apple
    );
    let (status, _) = post(&app, "/query", json!({ "query": insert })).await;
    assert_eq!(status, StatusCode::OK);

    let query = format!(
        "SELECT id FROM recipes LIMIT 1 COSINE SIMILARITY embedding WITH {}",
        apple
    );
    let (status, body) = post(&app, "/query", json!({ "query": query })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0][0], 2);
}

#[tokio::test]
async fn test_query_proof_payloads() {
    let app = app_for(&ServerConfig::builder().prove_by_default(true).build());
    post(
        &app,
        "/query",
        json!({"query": "CREATE TABLE t (id int, name string)"}),
    )
    .await;
    post(
        &app,
        "/query",
        json!({"query": "INSERT INTO t (id, name) VALUES (1, 'a'), (2, 'b')"}),
    )
    .await;

    let (_, proven) = post(&app, "/query", json!({"query": "SELECT name FROM t WHERE id = 2"})).await;
    assert_eq!(proven["result"], json!([["b"]]));
    assert!(proven["circuit"].is_string());
    assert!(proven["proof"].is_string());

    let (_, plain) = post(
        &app,
        "/query",
        json!({"query": "SELECT name FROM t WHERE id = 2", "proof": false}),
    )
    .await;
    assert_eq!(plain, json!({"result": [["b"]]}));

    let (status, body) = post(&app, "/query", json!({"query": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["category"], "Query");
}
