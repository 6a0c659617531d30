//! # zkdb-common
//!
//! Common types, error codes, and constants for zkdb.
//!
//! This crate provides the foundational types shared by every zkdb component:
//!
//! - **Types**: column types, tagged scalar values, rows, and the in-memory
//!   `Table` that is rebuilt from storage chunks for each statement
//! - **Errors**: the stable `ErrorCode` taxonomy surfaced to API and CLI callers
//! - **Constants**: wire-format sentinels and encoding parameters
//!
//! ## Example
//!
//! ```rust
//! use zkdb_common::types::{Column, ColumnType, Row, Scalar, Table};
//!
//! let mut table = Table::new(
//!     "users",
//!     vec![
//!         Column::new("id", ColumnType::Int64),
//!         Column::new("name", ColumnType::Utf8String),
//!     ],
//! );
//! table
//!     .push_row(Row::new(vec![Scalar::Int(1), Scalar::from("Alice")]))
//!     .unwrap();
//! assert_eq!(table.num_rows(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use error::ErrorCode;
pub use types::{
    format_timestamp, format_vector, parse_timestamp, Column, ColumnType, Index, Row, Scalar, Table,
    TableError,
};
