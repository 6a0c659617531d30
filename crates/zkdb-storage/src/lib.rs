//! # zkdb-storage
//!
//! Content-addressed, append-only table storage for zkdb.
//!
//! Tables are never stored as a single mutable file. Every mutation writes an
//! immutable *chunk* (a full table on CREATE, only the new rows on INSERT) to
//! a content-addressed blob store, and appends the chunk's address to the
//! table's *sequence*, which is itself an immutable blob. Reading a table
//! means replaying its sequence.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TableStore                             │
//! │   load(handle) / write_full / write_delta / write_index     │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SequenceTracker                          │
//! │   load(address) / append(chunk) / replay(table)             │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 BlobStore (put / get)                       │
//! │   MemoryStore · DirectoryStore · RetryingStore<S>           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The only mutable state is the name→sequence pointer held by a
//! [`SequenceRegistry`], which callers update after each successful write.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod canonical;
mod chunk;
mod error;
mod sequence;
mod table;

/// Blob store implementations.
pub mod store;

/// Table name → sequence address registries.
pub mod registry;

pub use address::ContentAddress;
pub use canonical::{canonical_bytes, sha256_hex};
pub use chunk::{Chunk, TablePayload};
pub use error::{StorageError, StorageResult};
pub use registry::{FileRegistry, MemoryRegistry, SequencePointer, SequenceRegistry};
pub use sequence::{AppendOutcome, ChunkHistoryEntry, CidSequence, SequenceEntry, SequenceTracker};
pub use store::{BlobStore, DirectoryStore, MemoryStore, RetryPolicy, RetryingStore};
pub use table::{Commit, StorageHandle, TableStore};
