//! Table name → sequence address registries.
//!
//! The registry holds the only mutable state in the storage layer: for each
//! table, the address of its latest sequence. Writers read the pointer,
//! append a chunk, and then [`SequenceRegistry::repoint`] with the pointer
//! they started from. A writer that lost a race gets `SequenceConflict`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::ContentAddress;

mod file;
mod memory;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;

/// A registered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePointer {
    /// Registration id, assigned sequentially from 1.
    pub id: u64,
    /// Table name.
    pub table_name: String,
    /// Address of the table's latest sequence.
    pub sequence_cid: ContentAddress,
}

/// Name → pointer registry.
pub trait SequenceRegistry: Send + Sync {
    /// Returns the pointer for `table_name`, if registered.
    fn lookup(&self, table_name: &str) -> StorageResult<Option<SequencePointer>>;

    /// Registers a new table. Fails with `TableExists` if already registered.
    fn create(&self, table_name: &str, address: ContentAddress)
        -> StorageResult<SequencePointer>;

    /// Moves the pointer from `expected` to `new`.
    ///
    /// Fails with `SequenceConflict` if the current pointer is not
    /// `expected`, and with `UnknownTable` if the table is not registered.
    fn repoint(
        &self,
        table_name: &str,
        expected: &ContentAddress,
        new: ContentAddress,
    ) -> StorageResult<SequencePointer>;

    /// Returns every registered table, ordered by name.
    fn list(&self) -> StorageResult<Vec<SequencePointer>>;
}

/// Registry contents shared by the registry implementations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RegistryState {
    next_id: u64,
    pointers: BTreeMap<String, SequencePointer>,
}

impl RegistryState {
    pub(crate) fn lookup(&self, table_name: &str) -> Option<SequencePointer> {
        self.pointers.get(table_name).cloned()
    }

    pub(crate) fn create(
        &mut self,
        table_name: &str,
        address: ContentAddress,
    ) -> StorageResult<SequencePointer> {
        if self.pointers.contains_key(table_name) {
            return Err(StorageError::TableExists(table_name.to_string()));
        }
        self.next_id = self.next_id.max(self.pointers.len() as u64) + 1;
        let pointer = SequencePointer {
            id: self.next_id,
            table_name: table_name.to_string(),
            sequence_cid: address,
        };
        self.pointers.insert(table_name.to_string(), pointer.clone());
        info!(table = table_name, id = pointer.id, sequence = %pointer.sequence_cid, "registered table");
        Ok(pointer)
    }

    pub(crate) fn repoint(
        &mut self,
        table_name: &str,
        expected: &ContentAddress,
        new: ContentAddress,
    ) -> StorageResult<SequencePointer> {
        let pointer = self
            .pointers
            .get_mut(table_name)
            .ok_or_else(|| StorageError::UnknownTable(table_name.to_string()))?;
        if &pointer.sequence_cid != expected {
            return Err(StorageError::SequenceConflict {
                table: table_name.to_string(),
                expected: expected.clone(),
                actual: pointer.sequence_cid.clone(),
            });
        }
        info!(table = table_name, from = %expected, to = %new, "repointed sequence");
        pointer.sequence_cid = new;
        Ok(pointer.clone())
    }

    pub(crate) fn list(&self) -> Vec<SequencePointer> {
        self.pointers.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut state = RegistryState::default();
        let a = state.create("a", ContentAddress::new("x")).unwrap();
        let b = state.create("b", ContentAddress::new("y")).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[test]
    fn test_create_twice_fails() {
        let mut state = RegistryState::default();
        state.create("a", ContentAddress::new("x")).unwrap();
        assert!(matches!(
            state.create("a", ContentAddress::new("z")),
            Err(StorageError::TableExists(_))
        ));
    }

    #[test]
    fn test_repoint_is_compare_and_swap() {
        let mut state = RegistryState::default();
        state.create("a", ContentAddress::new("v1")).unwrap();

        let moved = state
            .repoint("a", &ContentAddress::new("v1"), ContentAddress::new("v2"))
            .unwrap();
        assert_eq!(moved.sequence_cid, ContentAddress::new("v2"));

        let stale = state.repoint("a", &ContentAddress::new("v1"), ContentAddress::new("v3"));
        assert!(matches!(stale, Err(StorageError::SequenceConflict { .. })));
        assert_eq!(
            state.lookup("a").unwrap().sequence_cid,
            ContentAddress::new("v2")
        );
    }

    #[test]
    fn test_repoint_unknown_table() {
        let mut state = RegistryState::default();
        let result = state.repoint("ghost", &ContentAddress::sentinel(), ContentAddress::new("v"));
        assert!(matches!(result, Err(StorageError::UnknownTable(_))));
    }
}
