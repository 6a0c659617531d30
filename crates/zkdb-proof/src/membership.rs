//! Best-effort membership proof generation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use zkdb_common::{Row, Table};

use crate::backend::{Circuit, ProofBackend, ProofBytes};
use crate::error::{ProofError, ProofResult};
use crate::field::ChallengeMode;
use crate::witness::build_witness;

/// Options for one proof request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProofOptions {
    /// How the challenge is chosen.
    pub challenge: ChallengeMode,
    /// Upper bound on compile + prove. `None` waits indefinitely.
    ///
    /// A timed-out worker thread is detached, not cancelled: it keeps running
    /// until the backend returns. At most [`MAX_PROVER_THREADS`] workers run
    /// at once; further requests fail as busy until one finishes.
    pub timeout: Option<Duration>,
}

/// Maximum number of prover worker threads alive at once, counting workers
/// whose requests already timed out.
pub const MAX_PROVER_THREADS: usize = 8;

static PROVER_SLOTS: ProverSlots = ProverSlots::new(MAX_PROVER_THREADS);

/// Counts live prover worker threads against a fixed limit.
#[derive(Debug)]
struct ProverSlots {
    in_flight: AtomicUsize,
    max: usize,
}

impl ProverSlots {
    const fn new(max: usize) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max,
        }
    }

    fn try_acquire(&'static self) -> ProofResult<SlotGuard> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max).then_some(n + 1)
            })
            .map(|_| SlotGuard { slots: self })
            .map_err(ProofError::Busy)
    }

    fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases its slot when the worker thread exits.
struct SlotGuard {
    slots: &'static ProverSlots,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slots.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Result of a proof request.
///
/// Proof generation never fails the statement it accompanies: errors are
/// reported as `Failed` alongside the unproven result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofOutcome {
    /// The backend produced a proof.
    Proven {
        /// Compiled circuit.
        circuit: Circuit,
        /// Proof bytes.
        proof: ProofBytes,
    },
    /// No proof could be produced.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

impl ProofOutcome {
    /// Returns true if a proof was produced.
    pub fn is_proven(&self) -> bool {
        matches!(self, ProofOutcome::Proven { .. })
    }

    fn from_result(result: ProofResult<(Circuit, ProofBytes)>) -> Self {
        match result {
            Ok((circuit, proof)) => ProofOutcome::Proven { circuit, proof },
            Err(e) => ProofOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// Proves that `rows` (holding `projected_columns`) are drawn from `table`.
///
/// With a timeout, compile and prove run on a worker thread; on expiry the
/// outcome is `Failed` and the worker's eventual result is discarded.
pub fn generate_membership_proof(
    backend: Arc<dyn ProofBackend>,
    table: &Table,
    rows: &[Row],
    projected_columns: &[String],
    options: &ProofOptions,
) -> ProofOutcome {
    let start = Instant::now();
    let result = match options.timeout {
        None => prove(backend.as_ref(), table, rows, projected_columns, options.challenge),
        Some(timeout) => prove_with_timeout(
            backend,
            table.clone(),
            rows.to_vec(),
            projected_columns.to_vec(),
            options.challenge,
            timeout,
            &PROVER_SLOTS,
        ),
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => debug!(table = %table.name, rows = rows.len(), elapsed_ms, "membership proof generated"),
        Err(e) => warn!(table = %table.name, rows = rows.len(), elapsed_ms, error = %e, "membership proof failed"),
    }
    ProofOutcome::from_result(result)
}

fn prove(
    backend: &dyn ProofBackend,
    table: &Table,
    rows: &[Row],
    projected_columns: &[String],
    challenge: ChallengeMode,
) -> ProofResult<(Circuit, ProofBytes)> {
    if table.num_columns() == 0 {
        return Err(ProofError::EmptyTable);
    }
    let witness = build_witness(table, rows, projected_columns, backend.field(), challenge)?;
    let circuit = backend.compile(&witness)?;
    let proof = backend.prove(&circuit)?;
    Ok((circuit, proof))
}

fn prove_with_timeout(
    backend: Arc<dyn ProofBackend>,
    table: Table,
    rows: Vec<Row>,
    projected_columns: Vec<String>,
    challenge: ChallengeMode,
    timeout: Duration,
    slots: &'static ProverSlots,
) -> ProofResult<(Circuit, ProofBytes)> {
    let slot = slots.try_acquire()?;
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("zkdb-prover".to_string())
        .spawn(move || {
            let _slot = slot;
            let result = prove(backend.as_ref(), &table, &rows, &projected_columns, challenge);
            // receiver may have timed out
            let _ = tx.send(result);
        })
        .map_err(|e| ProofError::Worker(e.to_string()))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(ProofError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => {
            Err(ProofError::Worker("prover thread exited without a result".to_string()))
        }
    }
}
