//! JSON-file registry.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;

use super::{RegistryState, SequencePointer, SequenceRegistry};
use crate::error::StorageResult;
use crate::ContentAddress;

/// Registry persisted as a single JSON file.
///
/// The file is rewritten (write to a temporary file, then rename) after every
/// successful mutation. Writers within one process are serialized by an
/// in-process lock; separate processes sharing one file are not coordinated.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    state: Mutex<RegistryState>,
}

impl FileRegistry {
    /// Opens the registry at `path`, starting empty if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let state = if path.exists() {
            serde_json::from_slice(&fs::read(&path)?)?
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            RegistryState::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Returns the registry file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &RegistryState) -> StorageResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(state)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut RegistryState) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut state = self.state.lock();
        let mut next = state.clone();
        let result = f(&mut next)?;
        self.persist(&next)?;
        *state = next;
        Ok(result)
    }
}

impl SequenceRegistry for FileRegistry {
    fn lookup(&self, table_name: &str) -> StorageResult<Option<SequencePointer>> {
        Ok(self.state.lock().lookup(table_name))
    }

    fn create(
        &self,
        table_name: &str,
        address: ContentAddress,
    ) -> StorageResult<SequencePointer> {
        self.mutate(|state| state.create(table_name, address))
    }

    fn repoint(
        &self,
        table_name: &str,
        expected: &ContentAddress,
        new: ContentAddress,
    ) -> StorageResult<SequencePointer> {
        self.mutate(|state| state.repoint(table_name, expected, new))
    }

    fn list(&self) -> StorageResult<Vec<SequencePointer>> {
        Ok(self.state.lock().list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_registry_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        {
            let registry = FileRegistry::open(&path).unwrap();
            registry.create("users", ContentAddress::new("v1")).unwrap();
            registry
                .repoint("users", &ContentAddress::new("v1"), ContentAddress::new("v2"))
                .unwrap();
        }

        let registry = FileRegistry::open(&path).unwrap();
        let pointer = registry.lookup("users").unwrap().unwrap();
        assert_eq!(pointer.id, 1);
        assert_eq!(pointer.sequence_cid, ContentAddress::new("v2"));

        let next = registry.create("orders", ContentAddress::new("o1")).unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_failed_mutation_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("registry.json");
        let registry = FileRegistry::open(&path).unwrap();
        registry.create("users", ContentAddress::new("v1")).unwrap();
        let before = fs::read(&path).unwrap();

        assert!(registry
            .repoint("users", &ContentAddress::new("stale"), ContentAddress::new("v9"))
            .is_err());
        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
