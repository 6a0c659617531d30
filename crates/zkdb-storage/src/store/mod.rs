//! Blob stores.
//!
//! A blob store maps immutable JSON payloads to content addresses. There is
//! no mutation API: `put` of identical canonical bytes always yields the same
//! address, and an address once written always resolves to the same bytes.

use serde_json::Value as JsonValue;

use crate::canonical::{canonical_bytes, sha256_hex};
use crate::error::StorageResult;
use crate::ContentAddress;

mod directory;
mod memory;
mod retry;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use retry::{RetryPolicy, RetryingStore};

/// A content-addressed store of immutable objects.
///
/// Implementations provide raw object access; `put` and `get` handle
/// canonical encoding and address derivation.
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `address`. Writing an existing address is a no-op.
    fn put_object(&self, address: &ContentAddress, bytes: &[u8]) -> StorageResult<()>;

    /// Fetches the bytes stored under `address`.
    ///
    /// Fails with `NotFound` for unknown addresses and `TransientFetch` for
    /// transport failures that may succeed on retry.
    fn get_object(&self, address: &ContentAddress) -> StorageResult<Vec<u8>>;

    /// Stores a payload and returns its content address.
    fn put(&self, payload: &JsonValue) -> StorageResult<ContentAddress> {
        let bytes = canonical_bytes(payload)?;
        let address = ContentAddress::new(sha256_hex(&bytes));
        self.put_object(&address, &bytes)?;
        Ok(address)
    }

    /// Fetches and decodes the payload stored under `address`.
    fn get(&self, address: &ContentAddress) -> StorageResult<JsonValue> {
        let bytes = self.get_object(address)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl<S: BlobStore + ?Sized> BlobStore for std::sync::Arc<S> {
    fn put_object(&self, address: &ContentAddress, bytes: &[u8]) -> StorageResult<()> {
        (**self).put_object(address, bytes)
    }

    fn get_object(&self, address: &ContentAddress) -> StorageResult<Vec<u8>> {
        (**self).get_object(address)
    }
}
