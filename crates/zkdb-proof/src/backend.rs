//! Circuit compiler and prover capability.
//!
//! The engine never depends on a concrete proving system. It hands a
//! [`Witness`] to a [`ProofBackend`], which compiles it into a [`Circuit`]
//! and proves it. [`TranscriptBackend`] is the reference implementation: it
//! checks the arithmetic and emits a hash transcript, which is enough to
//! exercise the engine end to end but carries no zero-knowledge guarantee.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use num_bigint::BigInt;
use num_traits::Zero;
use sha2::{Digest, Sha256};

use crate::error::{ProofError, ProofResult};
use crate::field::FieldParams;
use crate::witness::Witness;

const CIRCUIT_MAGIC: &[u8; 4] = b"ZKC1";
const GATE_SUB: u8 = 0x01;
const TRANSCRIPT_DOMAIN: &[u8] = b"zkdb-transcript-v1";

/// A single-gate circuit asserting `lhs − rhs = output`, with the prover
/// required to show `output = 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    /// Left input.
    pub lhs: BigInt,
    /// Right input.
    pub rhs: BigInt,
    /// Gate output.
    pub output: BigInt,
}

impl Circuit {
    /// Builds the subtraction circuit for a witness.
    pub fn subtraction(witness: &Witness) -> Self {
        Self {
            lhs: witness.lhs.clone(),
            rhs: witness.rhs.clone(),
            output: witness.value(),
        }
    }

    /// Re-evaluates the gate from its inputs.
    pub fn evaluate(&self) -> BigInt {
        &self.lhs - &self.rhs
    }

    /// Returns true if the stored output matches the inputs and is zero.
    pub fn is_satisfied(&self) -> bool {
        self.output.is_zero() && self.evaluate() == self.output
    }

    /// Serializes the circuit.
    ///
    /// Layout: magic `ZKC1`, gate tag, then `lhs`, `rhs`, `output`, each as a
    /// u32 big-endian length followed by two's-complement big-endian bytes.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(128);
        buf.put_slice(CIRCUIT_MAGIC);
        buf.put_u8(GATE_SUB);
        for value in [&self.lhs, &self.rhs, &self.output] {
            let bytes = value.to_signed_bytes_be();
            buf.put_u32(bytes.len() as u32);
            buf.put_slice(&bytes);
        }
        buf.freeze()
    }

    /// Returns the serialized circuit as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Opaque proof bytes produced by a backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ProofBytes(Bytes);

impl ProofBytes {
    /// Wraps raw proof bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the proof as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Returns the proof length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the proof is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ProofBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofBytes({})", self.to_hex())
    }
}

/// Compiles witnesses into circuits and proves them.
pub trait ProofBackend: Send + Sync {
    /// Returns the field the backend operates over.
    fn field(&self) -> &FieldParams;

    /// Compiles a witness expression into a circuit.
    fn compile(&self, witness: &Witness) -> ProofResult<Circuit>;

    /// Proves a circuit.
    fn prove(&self, circuit: &Circuit) -> ProofResult<ProofBytes>;

    /// Checks a proof against a circuit.
    fn verify(&self, circuit: &Circuit, proof: &ProofBytes) -> ProofResult<bool>;
}

/// Reference backend emitting a SHA-256 transcript of the circuit.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBackend {
    params: FieldParams,
}

impl TranscriptBackend {
    /// Creates a backend over `params`.
    pub fn new(params: FieldParams) -> Self {
        Self { params }
    }

    fn transcript(circuit: &Circuit) -> ProofBytes {
        let mut hasher = Sha256::new();
        hasher.update(TRANSCRIPT_DOMAIN);
        hasher.update(circuit.to_bytes());
        ProofBytes::new(hasher.finalize().to_vec())
    }
}

impl ProofBackend for TranscriptBackend {
    fn field(&self) -> &FieldParams {
        &self.params
    }

    fn compile(&self, witness: &Witness) -> ProofResult<Circuit> {
        Ok(Circuit::subtraction(witness))
    }

    fn prove(&self, circuit: &Circuit) -> ProofResult<ProofBytes> {
        if !circuit.is_satisfied() {
            return Err(ProofError::Rejected(format!(
                "witness evaluates to {}, expected 0",
                circuit.evaluate()
            )));
        }
        Ok(Self::transcript(circuit))
    }

    fn verify(&self, circuit: &Circuit, proof: &ProofBytes) -> ProofResult<bool> {
        Ok(circuit.is_satisfied() && Self::transcript(circuit) == *proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn witness(lhs: i64, rhs: i64) -> Witness {
        Witness {
            challenge: BigUint::from(3u32),
            lhs: BigInt::from(lhs),
            rhs: BigInt::from(rhs),
        }
    }

    #[test]
    fn test_prove_and_verify_zero_witness() {
        let backend = TranscriptBackend::default();
        let circuit = backend.compile(&witness(11, 11)).unwrap();
        let proof = backend.prove(&circuit).unwrap();

        assert_eq!(proof.len(), 32);
        assert!(backend.verify(&circuit, &proof).unwrap());
    }

    #[test]
    fn test_prove_rejects_nonzero_witness() {
        let backend = TranscriptBackend::default();
        let circuit = backend.compile(&witness(11, 10)).unwrap();
        assert!(matches!(
            backend.prove(&circuit),
            Err(ProofError::Rejected(_))
        ));
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let backend = TranscriptBackend::default();
        let circuit = backend.compile(&witness(5, 5)).unwrap();
        let proof = backend.prove(&circuit).unwrap();

        let other = backend.compile(&witness(6, 6)).unwrap();
        assert!(!backend.verify(&other, &proof).unwrap());

        let mut forged = circuit.clone();
        forged.lhs = BigInt::from(9);
        assert!(!backend.verify(&forged, &proof).unwrap());
    }

    #[test]
    fn test_circuit_bytes_layout() {
        let circuit = Circuit::subtraction(&witness(1, 1));
        let bytes = circuit.to_bytes();
        assert_eq!(&bytes[..4], b"ZKC1");
        assert_eq!(bytes[4], GATE_SUB);
        // lhs: len 1, value 0x01
        assert_eq!(&bytes[5..10], &[0, 0, 0, 1, 1]);
        assert_eq!(circuit.to_hex().len(), bytes.len() * 2);
    }
}
