//! In-memory registry.

use parking_lot::Mutex;

use super::{RegistryState, SequencePointer, SequenceRegistry};
use crate::error::StorageResult;
use crate::ContentAddress;

/// Process-local registry. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    state: Mutex<RegistryState>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SequenceRegistry for MemoryRegistry {
    fn lookup(&self, table_name: &str) -> StorageResult<Option<SequencePointer>> {
        Ok(self.state.lock().lookup(table_name))
    }

    fn create(
        &self,
        table_name: &str,
        address: ContentAddress,
    ) -> StorageResult<SequencePointer> {
        self.state.lock().create(table_name, address)
    }

    fn repoint(
        &self,
        table_name: &str,
        expected: &ContentAddress,
        new: ContentAddress,
    ) -> StorageResult<SequencePointer> {
        self.state.lock().repoint(table_name, expected, new)
    }

    fn list(&self) -> StorageResult<Vec<SequencePointer>> {
        Ok(self.state.lock().list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_repoint_has_one_winner() {
        let registry = Arc::new(MemoryRegistry::new());
        let base = ContentAddress::new("base");
        registry.create("t", base.clone()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let base = base.clone();
                thread::spawn(move || {
                    registry
                        .repoint("t", &base, ContentAddress::new(format!("next-{}", i)))
                        .is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_list_orders_by_name() {
        let registry = MemoryRegistry::new();
        registry.create("zeta", ContentAddress::new("1")).unwrap();
        registry.create("alpha", ContentAddress::new("2")).unwrap();
        let names: Vec<_> = registry
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.table_name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
