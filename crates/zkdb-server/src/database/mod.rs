//! # zkdb Database
//!
//! The [`Database`] wires together everything a zkdb service needs:
//!
//! - SQL parsing and execution (`zkdb-sql`)
//! - Content-addressed table storage and the name→sequence registry
//!   (`zkdb-storage`)
//! - Membership proofs (`zkdb-proof`)
//! - A text embedder for vector columns
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Database                            │
//! │                                                              │
//! │   execute(sql)   create_entity   append_data   embed(text)   │
//! │        │               │              │             │        │
//! │        ▼               ▼              ▼             ▼        │
//! │   ┌─────────┐    ┌──────────────────────────┐  ┌──────────┐  │
//! │   │ Engine  │───►│ TableStore + Registry    │  │ Embedder │  │
//! │   └─────────┘    └──────────────────────────┘  └──────────┘  │
//! │                              │                               │
//! │                              ▼                               │
//! │          MemoryStore  |  RetryingStore<DirectoryStore>       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```
//! use zkdb_server::database::Database;
//!
//! let db = Database::open_memory();
//! db.execute("CREATE TABLE users (id int, name string)", None).unwrap();
//! db.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')", None).unwrap();
//!
//! let out = db.execute("SELECT name FROM users WHERE id = 1", Some(true)).unwrap();
//! assert_eq!(out.result.to_json(), serde_json::json!([["Alice"]]));
//! assert!(out.proof.unwrap().is_proven());
//! ```

mod engine;

pub use engine::{Database, OBJECTS_DIR, REGISTRY_FILE};
