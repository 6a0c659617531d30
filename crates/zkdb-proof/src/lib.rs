//! # zkdb-proof
//!
//! Membership proofs for zkdb query results.
//!
//! Given a table snapshot and a set of rows claimed to come from it, this
//! crate encodes every cell as a field element, evaluates the table and
//! record polynomials at a challenge point, and assembles a witness that is
//! zero exactly when the record roots divide the table roots. The witness is
//! handed to a [`ProofBackend`] which compiles and proves it.
//!
//! ```text
//!   Table ──► table_polynomial ──► P = Π (r − e)  ┐
//!                                                  ├─► witness ─► compile ─► prove
//!   Rows  ──► record_polynomial ─► Q = Π (r − e)  ┘
//! ```
//!
//! The challenge `r` is drawn at random per proof unless
//! [`ChallengeMode::Transcript`] is selected. Neither mode makes the
//! construction a sound non-interactive argument on its own; see
//! [`ChallengeMode`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod encode;
mod error;
mod field;
mod membership;
mod witness;

pub use backend::{Circuit, ProofBackend, ProofBytes, TranscriptBackend};
pub use encode::{encode_cell, encode_scalar, record_polynomial, table_polynomial};
pub use error::{ProofError, ProofResult};
pub use field::{ChallengeMode, FieldParams};
pub use membership::{generate_membership_proof, ProofOptions, ProofOutcome, MAX_PROVER_THREADS};
pub use witness::{build_witness, draw_challenge, Witness};
