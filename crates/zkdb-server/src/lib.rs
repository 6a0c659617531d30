//! # zkdb-server
//!
//! Database facade, HTTP API, and server daemon for zkdb.
//!
//! This crate provides:
//!
//! - **Database**: one entry point that wires the SQL engine, the
//!   content-addressed table store, the sequence registry, the proof
//!   backend, and the text embedder. Use it directly to embed zkdb.
//!
//! - **HTTP API**: an axum router exposing table creation, appends,
//!   sequence lookup, embeddings, and (optionally proven) queries.
//!
//! - **Configuration**: TOML server configuration with defaults.
//!
//! # Quick Start
//!
//! ```
//! use zkdb_server::Database;
//!
//! let db = Database::open_memory();
//! db.execute("CREATE TABLE docs (id int, body string)", None).unwrap();
//! db.execute("INSERT INTO docs (id, body) VALUES (1, 'hello')", None).unwrap();
//!
//! let out = db.execute("SELECT body FROM docs", None).unwrap();
//! assert_eq!(out.result.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Database facade - the main entry point for zkdb.
pub mod database;

/// Text embedders.
pub mod embedding;

/// HTTP API.
pub mod http;

/// Server configuration.
pub mod config;

mod error;

// Re-export commonly used types
pub use config::ServerConfig;
pub use database::Database;
pub use embedding::{Embedder, HashingEmbedder};
pub use error::{ServerError, ServerResult};
