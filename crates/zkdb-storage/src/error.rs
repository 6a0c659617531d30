//! Storage error types.

use thiserror::Error;
use zkdb_common::ErrorCode;

use crate::ContentAddress;

/// Storage error type.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The address is not present in the blob store.
    #[error("object not found: {0}")]
    NotFound(ContentAddress),

    /// Retryable transport failure while fetching an object.
    #[error("transient fetch error for {address}: {message}")]
    TransientFetch {
        /// Address being fetched.
        address: ContentAddress,
        /// Transport error description.
        message: String,
    },

    /// A persisted object could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// I/O error while writing an object or registry file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The table has no chunks in the given sequence.
    #[error("table not found: {0}")]
    UnknownTable(String),

    /// The table already has a live sequence.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// The sequence pointer moved between read and repoint.
    #[error("sequence for '{table}' moved: expected {expected}, found {actual}")]
    SequenceConflict {
        /// Table name.
        table: String,
        /// Pointer the writer started from.
        expected: ContentAddress,
        /// Pointer currently registered.
        actual: ContentAddress,
    },
}

impl StorageError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            StorageError::NotFound(_) => ErrorCode::NotFound,
            StorageError::TransientFetch { .. } => ErrorCode::TransientFetch,
            StorageError::Encoding(_) => ErrorCode::Encoding,
            StorageError::Io(_) => ErrorCode::Io,
            StorageError::UnknownTable(_) => ErrorCode::UnknownTable,
            StorageError::TableExists(_) => ErrorCode::TableExists,
            StorageError::SequenceConflict { .. } => ErrorCode::SequenceConflict,
        }
    }

    /// Returns true if the failed fetch may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::TransientFetch { .. })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Encoding(e.to_string())
    }
}

/// Storage result type.
pub type StorageResult<T> = Result<T, StorageError>;
