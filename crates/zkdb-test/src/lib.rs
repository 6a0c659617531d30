//! # zkdb-test
//!
//! End-to-end tests for zkdb.
//!
//! This crate contains:
//! - SQL workflows driven through the `Database` facade
//! - Proof and encoding properties over replayed tables
//! - Storage fault injection (transient fetch failures)
//! - HTTP workflows against the axum router

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test utilities and helpers
pub mod utils;
