//! SQL execution errors.

use thiserror::Error;
use zkdb_common::{ColumnType, ErrorCode};
use zkdb_storage::StorageError;

use crate::parser::ParseError;

/// Errors raised while executing a statement.
#[derive(Debug, Error)]
pub enum SqlError {
    /// The statement did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// INSERT column list is not exactly the schema's column list.
    #[error("column list ({}) does not match table columns ({})", .got.join(", "), .expected.join(", "))]
    ColumnMismatch {
        /// Schema columns in order.
        expected: Vec<String>,
        /// Columns named by the statement.
        got: Vec<String>,
    },

    /// Table not found.
    #[error("table not found: {0}")]
    UnknownTable(String),

    /// Column not found.
    #[error("column not found: {column} in table {table}")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Literal does not parse as the column's type.
    #[error("cannot convert {literal} to {ty} for column '{column}'")]
    TypeConversion {
        /// Column name.
        column: String,
        /// Column type.
        ty: ColumnType,
        /// Literal as written.
        literal: String,
    },

    /// Table already exists.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// Storage or registry failure.
    #[error(transparent)]
    Storage(StorageError),

    /// Invariant violation inside the engine.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SqlError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SqlError::Parse(e) => e.code(),
            SqlError::ColumnMismatch { .. } => ErrorCode::ColumnMismatch,
            SqlError::UnknownTable(_) => ErrorCode::UnknownTable,
            SqlError::UnknownColumn { .. } => ErrorCode::UnknownColumn,
            SqlError::TypeConversion { .. } => ErrorCode::TypeConversion,
            SqlError::TableExists(_) => ErrorCode::TableExists,
            SqlError::Storage(e) => e.code(),
            SqlError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        SqlError::Parse(ParseError::Syntax(message.into()))
    }

    pub(crate) fn unknown_column(table: &str, column: &str) -> Self {
        SqlError::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

impl From<StorageError> for SqlError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UnknownTable(name) => SqlError::UnknownTable(name),
            StorageError::TableExists(name) => SqlError::TableExists(name),
            other => SqlError::Storage(other),
        }
    }
}

/// Result type for SQL execution.
pub type SqlResult<T> = Result<T, SqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            SqlError::syntax("bad").code(),
            ErrorCode::SyntaxError
        );
        assert_eq!(
            SqlError::from(ParseError::Schema("x".into())).code(),
            ErrorCode::SchemaError
        );
        assert_eq!(
            SqlError::unknown_column("t", "c").code(),
            ErrorCode::UnknownColumn
        );
    }

    #[test]
    fn test_storage_errors_are_lifted() {
        let err = SqlError::from(StorageError::UnknownTable("t".into()));
        assert!(matches!(err, SqlError::UnknownTable(_)));
        let err = SqlError::from(StorageError::Encoding("bad".into()));
        assert_eq!(err.code(), ErrorCode::Encoding);
    }

    #[test]
    fn test_column_mismatch_message() {
        let err = SqlError::ColumnMismatch {
            expected: vec!["id".into(), "name".into()],
            got: vec!["name".into(), "id".into()],
        };
        assert_eq!(
            err.to_string(),
            "column list (name, id) does not match table columns (id, name)"
        );
    }
}
