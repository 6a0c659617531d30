//! Stable error codes.

use std::fmt;

/// Error codes for categorizing errors.
///
/// These codes are used for programmatic error handling (HTTP status
/// mapping, CLI exit messages) and are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Internal error (bug).
    Internal = 0x0001,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,
    /// Operation timed out.
    Timeout = 0x0004,
    /// General I/O error.
    Io = 0x0100,

    // Storage errors (0x0200 - 0x02FF)
    /// Content address not present in the blob store.
    NotFound = 0x0200,
    /// Retryable transport failure while fetching from the blob store.
    TransientFetch = 0x0201,
    /// A persisted object could not be encoded or decoded.
    Encoding = 0x0202,
    /// Another writer moved the table's sequence pointer first.
    SequenceConflict = 0x0203,

    // Query errors (0x0600 - 0x06FF)
    /// Malformed statement.
    SyntaxError = 0x0600,
    /// Unsupported column type in a table definition.
    SchemaError = 0x0601,
    /// INSERT column list differs from the schema's column list.
    ColumnMismatch = 0x0602,
    /// Table not found.
    UnknownTable = 0x0603,
    /// Column not found.
    UnknownColumn = 0x0604,
    /// Literal does not parse as the declared column type.
    TypeConversion = 0x0605,
    /// Table already has a live sequence.
    TableExists = 0x0606,

    // Proof errors (0x0700 - 0x07FF)
    /// Encoder or prover could not produce a valid witness.
    ProofFailure = 0x0700,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "I/O",
            0x02 => "Storage",
            0x06 => "Query",
            0x07 => "Proof",
            _ => "Unknown",
        }
    }

    /// Returns true if retrying the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::TransientFetch | ErrorCode::Timeout)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
