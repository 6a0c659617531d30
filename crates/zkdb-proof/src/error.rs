//! Proof error types.

use std::time::Duration;

use thiserror::Error;
use zkdb_common::ErrorCode;

/// Errors raised while encoding, compiling or proving.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProofError {
    /// The table has no columns, so there is nothing to prove against.
    #[error("cannot prove membership in a table without columns")]
    EmptyTable,

    /// A value could not be encoded as a field element.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// A projected column does not exist in the table.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// The prover refused the circuit.
    #[error("prover rejected circuit: {0}")]
    Rejected(String),

    /// Proof generation did not finish in time.
    #[error("proof generation timed out after {0:?}")]
    Timeout(Duration),

    /// Every prover thread slot is taken.
    #[error("prover busy: {0} proofs already in flight")]
    Busy(usize),

    /// The proving worker failed unexpectedly.
    #[error("proof worker failed: {0}")]
    Worker(String),
}

impl ProofError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ProofError::Timeout(_) => ErrorCode::Timeout,
            ProofError::Worker(_) => ErrorCode::Internal,
            _ => ErrorCode::ProofFailure,
        }
    }
}

/// Proof result type.
pub type ProofResult<T> = Result<T, ProofError>;
