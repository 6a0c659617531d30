//! Process-local blob store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::BlobStore;
use crate::error::{StorageError, StorageResult};
use crate::ContentAddress;

/// In-memory blob store.
///
/// Objects live for the lifetime of the store. Useful for tests and for
/// running the engine without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<ContentAddress, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns true if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Returns true if `address` is stored.
    pub fn contains(&self, address: &ContentAddress) -> bool {
        self.objects.read().contains_key(address)
    }
}

impl BlobStore for MemoryStore {
    fn put_object(&self, address: &ContentAddress, bytes: &[u8]) -> StorageResult<()> {
        self.objects
            .write()
            .entry(address.clone())
            .or_insert_with(|| bytes.to_vec());
        Ok(())
    }

    fn get_object(&self, address: &ContentAddress) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(address.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_is_idempotent() {
        let store = MemoryStore::new();
        let payload = json!({"users": {"rows": [[1, "Alice"]]}});

        let first = store.put(&payload).unwrap();
        let second = store.put(&payload).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_get_round_trip() {
        let store = MemoryStore::new();
        let payload = json!({"b": 1, "a": [true, null]});
        let address = store.put(&payload).unwrap();
        assert!(address.is_digest());
        assert_eq!(store.get(&address).unwrap(), payload);
    }

    #[test]
    fn test_key_order_does_not_change_address() {
        let store = MemoryStore::new();
        let a: serde_json::Value = serde_json::from_str(r#"{"x":1,"y":2}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"y":2, "x":1}"#).unwrap();
        assert_eq!(store.put(&a).unwrap(), store.put(&b).unwrap());
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get(&ContentAddress::new("missing")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
