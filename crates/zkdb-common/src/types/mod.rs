//! Core data model.
//!
//! - `ColumnType` / `Column`: the closed set of column types and named columns
//! - `Scalar`: a tagged cell value checked against its column type
//! - `Row`: an ordered tuple of scalars
//! - `Table` / `Index`: the in-memory table rebuilt from storage per statement

mod column;
mod row;
mod scalar;
mod table;

pub use column::{Column, ColumnType};
pub use row::Row;
pub use scalar::{format_timestamp, format_vector, parse_timestamp, Scalar};
pub use table::{Index, Table, TableError};
