//! Directory-backed blob store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::BlobStore;
use crate::error::{StorageError, StorageResult};
use crate::ContentAddress;

/// Blob store keeping one `<address>.json` file per object under a root
/// directory.
///
/// Writes go to a uniquely named temporary file that is renamed into place,
/// so readers never observe a partially written object and concurrent
/// writers of the same object do not share a temporary file.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, address: &ContentAddress) -> Option<PathBuf> {
        address
            .is_digest()
            .then(|| self.root.join(format!("{}.json", address)))
    }
}

impl BlobStore for DirectoryStore {
    fn put_object(&self, address: &ContentAddress, bytes: &[u8]) -> StorageResult<()> {
        let path = self.object_path(address).ok_or_else(|| {
            StorageError::Encoding(format!("refusing to store non-digest address {}", address))
        })?;
        if path.exists() {
            return Ok(());
        }

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        if let Err(e) = tmp.persist(&path) {
            // another writer stored the same object first
            if !path.exists() {
                return Err(e.error.into());
            }
        }
        debug!(%address, bytes = bytes.len(), "stored object");
        Ok(())
    }

    fn get_object(&self, address: &ContentAddress) -> StorageResult<Vec<u8>> {
        let path = self
            .object_path(address)
            .ok_or_else(|| StorageError::NotFound(address.clone()))?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(address.clone()),
            _ => StorageError::TransientFetch {
                address: address.clone(),
                message: e.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_directory_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::open(dir.path()).unwrap();
        let payload = json!({"t": {"columns": ["id"], "rows": [[1]]}});

        let address = store.put(&payload).unwrap();
        assert!(dir.path().join(format!("{}.json", address)).exists());
        assert_eq!(store.get(&address).unwrap(), payload);
    }

    #[test]
    fn test_directory_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let address = {
            let store = DirectoryStore::open(dir.path()).unwrap();
            store.put(&json!([1, 2, 3])).unwrap()
        };
        let store = DirectoryStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&address).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_concurrent_puts_of_same_object() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(DirectoryStore::open(dir.path()).unwrap());
        let payload = json!({"t": {"columns": ["id"], "rows": [[7]]}});

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let payload = payload.clone();
                thread::spawn(move || store.put(&payload))
            })
            .collect();
        let addresses: Vec<ContentAddress> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.get(&addresses[0]).unwrap(), payload);

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_directory_store_rejects_foreign_addresses() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::open(dir.path()).unwrap();
        let err = store.get(&ContentAddress::new("../secret")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        let missing = ContentAddress::new("0".repeat(64));
        assert!(matches!(
            store.get(&missing).unwrap_err(),
            StorageError::NotFound(_)
        ));
    }
}
