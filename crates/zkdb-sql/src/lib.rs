//! # zkdb-sql
//!
//! SQL parsing and execution for zkdb.
//!
//! Tables live in content-addressed storage as chains of immutable chunks.
//! The [`Engine`] resolves a table's current sequence through a
//! [`SequenceRegistry`](zkdb_storage::SequenceRegistry), replays it into an
//! in-memory table, evaluates the statement, writes any new chunk, repoints
//! the registry and, on request, attaches a membership proof.
//!
//! ```text
//!   SQL text ──► Parser ──► Statement
//!                              │
//!                              ▼
//!   Engine ── lookup ──► SequenceRegistry
//!      │ replay / write
//!      ▼
//!   TableStore ──► SequenceTracker ──► BlobStore
//!      │
//!      ▼ (optional)
//!   generate_membership_proof ──► ProofBackend
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use zkdb_sql::{Engine, ExecuteOptions};
//! use zkdb_storage::{MemoryRegistry, MemoryStore};
//!
//! let engine = Engine::new(Arc::new(MemoryStore::new()), Arc::new(MemoryRegistry::new()));
//! let opts = ExecuteOptions::default();
//! engine.execute("CREATE TABLE users (id int, name string)", &opts).unwrap();
//! engine.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')", &opts).unwrap();
//! let out = engine.execute("SELECT name FROM users WHERE id = 1", &opts).unwrap();
//! assert_eq!(out.result.to_json(), serde_json::json!([["Alice"]]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod error;
mod literal;
mod result;
mod select;
mod similarity;

pub mod parser;

pub use engine::{Engine, ExecuteOptions, StatementOutput};
pub use error::{SqlError, SqlResult};
pub use literal::{convert_literal, parse_vector, strip_quotes};
pub use result::QueryResult;
pub use select::{execute_select, SelectOutput};
pub use similarity::cosine_similarity;
