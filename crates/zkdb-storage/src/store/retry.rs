//! Bounded exponential-backoff retries for blob store reads.

use std::thread;
use std::time::Duration;

use tracing::warn;

use super::BlobStore;
use crate::error::StorageResult;
use crate::ContentAddress;

/// Retry schedule for transient fetch failures.
///
/// Attempt `n` (0-based) that fails transiently sleeps
/// `min(initial_backoff * 2^n, max_backoff)` before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            max_attempts: 8,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            max_attempts: 1,
        }
    }

    /// Returns the delay to apply after failed attempt `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }
}

/// A blob store wrapper that retries transient read failures.
///
/// Writes pass straight through: a failed `put` is surfaced to the caller
/// unchanged.
#[derive(Debug)]
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: BlobStore> RetryingStore<S> {
    /// Wraps `inner` with the given retry policy.
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<S: BlobStore> BlobStore for RetryingStore<S> {
    fn put_object(&self, address: &ContentAddress, bytes: &[u8]) -> StorageResult<()> {
        self.inner.put_object(address, bytes)
    }

    fn get_object(&self, address: &ContentAddress) -> StorageResult<Vec<u8>> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match self.inner.get_object(address) {
                Err(e) if e.is_transient() && attempt + 1 < attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(%address, attempt = attempt + 1, ?delay, error = %e, "fetch failed, retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
