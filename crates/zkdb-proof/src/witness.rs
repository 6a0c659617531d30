//! Witness assembly.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Signed, Zero};
use sha2::{Digest, Sha256};
use zkdb_common::{Row, Table};

use crate::encode::{record_polynomial, table_polynomial};
use crate::error::{ProofError, ProofResult};
use crate::field::{ChallengeMode, FieldParams};

/// The two circuit operands whose difference must be zero.
///
/// `lhs = P mod scale` and `rhs = (Q × ⌊P / Q⌋) mod scale`, where `P` and
/// `Q` are the table and record polynomials evaluated at `challenge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    /// Evaluation point.
    pub challenge: BigUint,
    /// Left operand.
    pub lhs: BigInt,
    /// Right operand.
    pub rhs: BigInt,
}

impl Witness {
    /// Returns `lhs − rhs`.
    pub fn value(&self) -> BigInt {
        &self.lhs - &self.rhs
    }

    /// Returns true if the membership claim holds at this challenge.
    pub fn is_zero(&self) -> bool {
        self.lhs == self.rhs
    }
}

/// Chooses the evaluation point in `[0, curve_order)`.
pub fn draw_challenge(
    mode: ChallengeMode,
    table_roots: &[BigUint],
    record_roots: &[BigUint],
    params: &FieldParams,
) -> BigUint {
    match mode {
        ChallengeMode::Random => rand::thread_rng().gen_biguint_below(&params.curve_order),
        ChallengeMode::Transcript => {
            let mut hasher = Sha256::new();
            for (label, roots) in [(&b"table"[..], table_roots), (&b"record"[..], record_roots)] {
                hasher.update(label);
                hasher.update((roots.len() as u64).to_be_bytes());
                for root in roots {
                    let bytes = root.to_bytes_be();
                    hasher.update((bytes.len() as u32).to_be_bytes());
                    hasher.update(&bytes);
                }
            }
            BigUint::from_bytes_be(&hasher.finalize()) % &params.curve_order
        }
    }
}

/// Builds the membership witness for `rows` drawn from `table`.
///
/// An empty table polynomial evaluates to 1, as does an empty record set.
pub fn build_witness(
    table: &Table,
    rows: &[Row],
    projected_columns: &[String],
    params: &FieldParams,
    mode: ChallengeMode,
) -> ProofResult<Witness> {
    let table_roots = table_polynomial(table, params)?;
    let record_roots = record_polynomial(rows, table, projected_columns, params)?;
    let challenge = draw_challenge(mode, &table_roots, &record_roots, params);
    assemble(challenge, &table_roots, &record_roots, params)
}

fn assemble(
    challenge: BigUint,
    table_roots: &[BigUint],
    record_roots: &[BigUint],
    params: &FieldParams,
) -> ProofResult<Witness> {
    let r = BigInt::from(challenge.clone());
    let evaluate = |roots: &[BigUint]| {
        roots.iter().fold(BigInt::one(), |acc, e| acc * (&r - BigInt::from(e.clone())))
    };
    let p = evaluate(table_roots);
    let q = evaluate(record_roots);
    if q.is_zero() {
        return Err(ProofError::Encoding(
            "challenge coincides with a record root".to_string(),
        ));
    }

    let scale = BigInt::from(params.scale.clone());
    let quotient = floor_div(&p, &q);
    Ok(Witness {
        challenge,
        lhs: mod_floor(&p, &scale),
        rhs: mod_floor(&(&q * &quotient), &scale),
    })
}

fn floor_div(a: &BigInt, b: &BigInt) -> BigInt {
    let quotient = a / b;
    let remainder = a - &quotient * b;
    if !remainder.is_zero() && (remainder.is_negative() != b.is_negative()) {
        quotient - 1
    } else {
        quotient
    }
}

fn mod_floor(a: &BigInt, m: &BigInt) -> BigInt {
    let r = a % m;
    if r.is_negative() {
        r + m
    } else {
        r
    }
}
