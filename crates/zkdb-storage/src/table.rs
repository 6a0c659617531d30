//! Table Store.
//!
//! Every call takes an explicit [`StorageHandle`] naming the table and the
//! sequence to read from or extend. The store holds no "current" pointer of
//! its own.

use std::sync::Arc;

use zkdb_common::{Index, Row, Table};

use crate::chunk::TablePayload;
use crate::error::StorageResult;
use crate::sequence::SequenceTracker;
use crate::store::BlobStore;
use crate::ContentAddress;

/// Names a table and the sequence that holds its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHandle {
    /// Table name.
    pub table_name: String,
    /// Sequence address, or the sentinel for a table with no history.
    pub sequence_address: ContentAddress,
}

impl StorageHandle {
    /// Creates a handle.
    pub fn new(table_name: impl Into<String>, sequence_address: ContentAddress) -> Self {
        Self {
            table_name: table_name.into(),
            sequence_address,
        }
    }

    /// Creates a handle for a table with no history yet.
    pub fn fresh(table_name: impl Into<String>) -> Self {
        Self::new(table_name, ContentAddress::sentinel())
    }
}

/// Addresses written by one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Address of the new chunk.
    pub chunk_address: ContentAddress,
    /// Address of the new sequence. Publish this to the registry.
    pub sequence_address: ContentAddress,
}

/// Reconstructs tables from their sequences and writes new chunks.
#[derive(Debug, Clone)]
pub struct TableStore {
    tracker: SequenceTracker,
}

impl TableStore {
    /// Creates a table store over `store`.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            tracker: SequenceTracker::new(store),
        }
    }

    /// Returns the sequence tracker.
    pub fn tracker(&self) -> &SequenceTracker {
        &self.tracker
    }

    /// Replays the handle's sequence into a table.
    pub fn load(&self, handle: &StorageHandle) -> StorageResult<Table> {
        self.tracker.replay(&handle.table_name, &handle.sequence_address)
    }

    /// Writes a full snapshot of `table`.
    pub fn write_full(&self, handle: &StorageHandle, table: &Table) -> StorageResult<Commit> {
        self.commit(handle, TablePayload::from_table(table))
    }

    /// Writes a delta chunk carrying only `rows`.
    pub fn write_delta(
        &self,
        handle: &StorageHandle,
        table: &Table,
        rows: &[Row],
    ) -> StorageResult<Commit> {
        self.commit(handle, TablePayload::delta(table, rows))
    }

    /// Writes a chunk carrying a single index and no rows.
    pub fn write_index(
        &self,
        handle: &StorageHandle,
        table: &Table,
        name: &str,
        index: &Index,
    ) -> StorageResult<Commit> {
        self.commit(handle, TablePayload::index(table, name, index))
    }

    fn commit(&self, handle: &StorageHandle, payload: TablePayload) -> StorageResult<Commit> {
        let outcome = self
            .tracker
            .append(&handle.table_name, payload, &handle.sequence_address)?;
        Ok(Commit {
            chunk_address: outcome.chunk_address,
            sequence_address: outcome.sequence_address,
        })
    }
}
