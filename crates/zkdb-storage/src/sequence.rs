//! Sequence Tracker.
//!
//! A sequence is the ordered list of chunk addresses that, replayed in order,
//! rebuilds a table. Sequences are immutable CAS objects: appending a chunk
//! writes a new sequence object and returns its address; the previous
//! sequence is left untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zkdb_common::Table;

use crate::canonical::{canonical_bytes, sha256_hex};
use crate::chunk::{Chunk, TablePayload};
use crate::error::{StorageError, StorageResult};
use crate::store::BlobStore;
use crate::ContentAddress;

/// One appended chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEntry {
    /// Address of the chunk object.
    pub chunk_id: ContentAddress,
    /// SHA-256 of the table payload alone, without the table-name key.
    pub chunk_hash: String,
}

/// Audit record of every time a chunk address was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkHistoryEntry {
    /// Address of the chunk object.
    pub chunk_id: ContentAddress,
    /// One element per append of this address.
    pub versions: Vec<ContentAddress>,
}

/// A table's full history, persisted as a CAS object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CidSequence {
    /// Chunks in append order.
    #[serde(default)]
    pub default_sequence: Vec<SequenceEntry>,
    /// Append-only audit log keyed by chunk address.
    #[serde(default)]
    pub chunk_history: Vec<ChunkHistoryEntry>,
    /// Most recently appended chunk.
    #[serde(default)]
    pub latest_chunk: Option<ContentAddress>,
}

impl CidSequence {
    /// Returns the number of chunks in the sequence.
    pub fn len(&self) -> usize {
        self.default_sequence.len()
    }

    /// Returns true if no chunk has been appended.
    pub fn is_empty(&self) -> bool {
        self.default_sequence.is_empty()
    }

    fn record(&mut self, chunk_id: ContentAddress, chunk_hash: String) {
        self.default_sequence.push(SequenceEntry {
            chunk_id: chunk_id.clone(),
            chunk_hash,
        });
        match self
            .chunk_history
            .iter_mut()
            .find(|entry| entry.chunk_id == chunk_id)
        {
            Some(entry) => entry.versions.push(chunk_id.clone()),
            None => self.chunk_history.push(ChunkHistoryEntry {
                chunk_id: chunk_id.clone(),
                versions: vec![chunk_id.clone()],
            }),
        }
        self.latest_chunk = Some(chunk_id);
    }
}

/// Result of appending a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    /// Address of the newly written chunk.
    pub chunk_address: ContentAddress,
    /// Address of the newly written sequence.
    pub sequence_address: ContentAddress,
    /// The new sequence.
    pub sequence: CidSequence,
}

/// Reads, extends and replays table sequences.
#[derive(Clone)]
pub struct SequenceTracker {
    store: Arc<dyn BlobStore>,
}

impl SequenceTracker {
    /// Creates a tracker over `store`.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying blob store.
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Loads a sequence. The sentinel address yields an empty sequence.
    pub fn load(&self, address: &ContentAddress) -> StorageResult<CidSequence> {
        if address.is_sentinel() {
            return Ok(CidSequence::default());
        }
        Ok(serde_json::from_value(self.store.get(address)?)?)
    }

    /// Writes `payload` as a chunk for `table_name` and appends it to the
    /// sequence at `previous`.
    ///
    /// Nothing is repointed: the caller publishes the returned sequence
    /// address to its registry.
    pub fn append(
        &self,
        table_name: &str,
        payload: TablePayload,
        previous: &ContentAddress,
    ) -> StorageResult<AppendOutcome> {
        let mut sequence = self.load(previous)?;

        let chunk_hash = sha256_hex(&canonical_bytes(&payload)?);
        let chunk = Chunk::single(table_name, payload);
        let chunk_address = self.store.put(&chunk.to_json()?)?;

        sequence.record(chunk_address.clone(), chunk_hash);
        let sequence_address = self.store.put(&serde_json::to_value(&sequence)?)?;

        debug!(
            table = table_name,
            chunk = %chunk_address,
            sequence = %sequence_address,
            chunks = sequence.len(),
            "appended chunk"
        );

        Ok(AppendOutcome {
            chunk_address,
            sequence_address,
            sequence,
        })
    }

    /// Rebuilds `table_name` by replaying every chunk of the sequence.
    ///
    /// Column metadata comes from the first chunk carrying the table; rows
    /// are concatenated in sequence order; indexes are merged, later
    /// definitions replacing earlier ones of the same name.
    pub fn replay(&self, table_name: &str, address: &ContentAddress) -> StorageResult<Table> {
        let sequence = self.load(address)?;
        let mut table: Option<Table> = None;

        for entry in &sequence.default_sequence {
            let chunk = Chunk::from_json(self.store.get(&entry.chunk_id)?)?;
            let Some(payload) = chunk.take(table_name) else {
                continue;
            };
            match table.as_mut() {
                None => table = Some(payload.into_table(table_name)?),
                Some(acc) => {
                    let rows = payload.decode_rows(&acc.columns)?;
                    let indexes = payload.decode_indexes(&acc.columns)?;
                    acc.rows.extend(rows);
                    acc.indexes.extend(indexes);
                }
            }
        }

        let table = table.ok_or_else(|| StorageError::UnknownTable(table_name.to_string()))?;
        debug!(
            table = table_name,
            chunks = sequence.len(),
            rows = table.num_rows(),
            "replayed table"
        );
        Ok(table)
    }
}

impl std::fmt::Debug for SequenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceTracker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use zkdb_common::{Column, ColumnType, Row, Scalar};

    fn tracker() -> SequenceTracker {
        SequenceTracker::new(Arc::new(MemoryStore::new()))
    }

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", ColumnType::Int64),
                Column::new("name", ColumnType::Utf8String),
            ],
        )
    }

    fn row(id: i64, name: &str) -> Row {
        Row::new(vec![Scalar::Int(id), Scalar::from(name)])
    }

    #[test]
    fn test_sentinel_loads_empty_sequence() {
        let sequence = tracker().load(&ContentAddress::sentinel()).unwrap();
        assert_eq!(sequence, CidSequence::default());
        assert_eq!(
            serde_json::to_value(&sequence).unwrap(),
            json!({"default_sequence": [], "chunk_history": [], "latest_chunk": null})
        );
    }

    #[test]
    fn test_append_links_chunks() {
        let tracker = tracker();
        let table = users();

        let first = tracker
            .append("users", TablePayload::from_table(&table), &ContentAddress::sentinel())
            .unwrap();
        let second = tracker
            .append(
                "users",
                TablePayload::delta(&table, &[row(1, "Alice")]),
                &first.sequence_address,
            )
            .unwrap();

        let sequence = tracker.load(&second.sequence_address).unwrap();
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.default_sequence[0].chunk_id, first.chunk_address);
        assert_eq!(sequence.latest_chunk, Some(second.chunk_address.clone()));
        assert_eq!(sequence.chunk_history.len(), 2);

        // the earlier sequence object is untouched
        assert_eq!(tracker.load(&first.sequence_address).unwrap().len(), 1);
    }

    #[test]
    fn test_chunk_hash_covers_payload_only() {
        let tracker = tracker();
        let payload = TablePayload::from_table(&users());
        let expected = sha256_hex(&canonical_bytes(&payload).unwrap());

        let outcome = tracker
            .append("users", payload, &ContentAddress::sentinel())
            .unwrap();
        assert_eq!(outcome.sequence.default_sequence[0].chunk_hash, expected);
        assert_ne!(outcome.chunk_address.as_str(), expected);
    }

    #[test]
    fn test_repeated_chunk_extends_history_versions() {
        let tracker = tracker();
        let table = users();
        let delta = TablePayload::delta(&table, &[row(1, "Alice")]);

        let first = tracker
            .append("users", delta.clone(), &ContentAddress::sentinel())
            .unwrap();
        let second = tracker
            .append("users", delta, &first.sequence_address)
            .unwrap();

        assert_eq!(second.chunk_address, first.chunk_address);
        assert_eq!(second.sequence.chunk_history.len(), 1);
        assert_eq!(second.sequence.chunk_history[0].versions.len(), 2);
    }

    #[test]
    fn test_replay_concatenates_rows_in_order() {
        let tracker = tracker();
        let table = users();
        let mut address = tracker
            .append("users", TablePayload::from_table(&table), &ContentAddress::sentinel())
            .unwrap()
            .sequence_address;
        for batch in [vec![row(1, "Alice"), row(2, "Bob")], vec![row(3, "Carol")]] {
            address = tracker
                .append("users", TablePayload::delta(&table, &batch), &address)
                .unwrap()
                .sequence_address;
        }

        let replayed = tracker.replay("users", &address).unwrap();
        assert_eq!(replayed.column_names(), vec!["id", "name"]);
        assert_eq!(
            replayed.rows,
            vec![row(1, "Alice"), row(2, "Bob"), row(3, "Carol")]
        );
    }

    #[test]
    fn test_replay_unknown_table() {
        let tracker = tracker();
        let address = tracker
            .append("users", TablePayload::from_table(&users()), &ContentAddress::sentinel())
            .unwrap()
            .sequence_address;

        assert!(matches!(
            tracker.replay("orders", &address),
            Err(StorageError::UnknownTable(_))
        ));
        assert!(matches!(
            tracker.replay("users", &ContentAddress::sentinel()),
            Err(StorageError::UnknownTable(_))
        ));
    }
}
