//! Field parameters and challenge selection.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Decimal order of the BN254 scalar field.
const BN254_SCALAR_ORDER: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Moduli used by the encoder and the circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParams {
    /// Prime order of the field cells are reduced into.
    pub curve_order: BigUint,
    /// Modulus the circuit applies to the witness operands.
    pub scale: BigUint,
}

impl FieldParams {
    /// Creates parameters from explicit moduli.
    pub fn new(curve_order: BigUint, scale: BigUint) -> Self {
        Self { curve_order, scale }
    }

    /// BN254 scalar field for both the curve order and the circuit scale.
    pub fn bn254() -> Self {
        let order = BigUint::parse_bytes(BN254_SCALAR_ORDER.as_bytes(), 10).unwrap_or_default();
        Self {
            curve_order: order.clone(),
            scale: order,
        }
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Self::bn254()
    }
}

/// How the evaluation point `r` is chosen.
///
/// `Random` draws `r` independently for every proof, so a proof is not bound
/// to the table it claims membership in. `Transcript` derives `r` from a
/// SHA-256 of both polynomials (a Fiat–Shamir-style binding). It is opt-in
/// and still lacks a commitment scheme, so neither mode should be treated as
/// adversarially sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeMode {
    /// Uniformly random challenge per proof.
    #[default]
    Random,
    /// Challenge derived from the encoded table and records.
    Transcript,
}
