//! In-memory tables and snapshot indexes.
//!
//! A `Table` is never persisted as a standalone object. It is rebuilt by
//! replaying a table's chunks and lives only for the duration of one
//! statement.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use super::{Column, ColumnType, Row};

/// Errors raised when a row or schema does not fit a table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Two columns share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// The row has the wrong number of values.
    #[error("row has {got} values, table has {expected} columns")]
    ArityMismatch {
        /// Number of columns in the schema.
        expected: usize,
        /// Number of values in the row.
        got: usize,
    },

    /// A value does not match its column's type.
    #[error("column '{column}' expects {expected}, got {got}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Declared type.
        expected: ColumnType,
        /// Type of the offending value.
        got: ColumnType,
    },
}

/// A snapshot index: canonical key text to the rows carrying that key.
///
/// An index is built once from the rows present at creation time and is not
/// kept in sync with later inserts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index {
    buckets: BTreeMap<String, Vec<Row>>,
}

impl Index {
    /// Creates an index from prebuilt buckets.
    pub fn from_buckets(buckets: BTreeMap<String, Vec<Row>>) -> Self {
        Self { buckets }
    }

    /// Builds an index over the column at `column_index` of `rows`.
    pub fn build<'a>(rows: impl IntoIterator<Item = &'a Row>, column_index: usize) -> Self {
        let mut buckets: BTreeMap<String, Vec<Row>> = BTreeMap::new();
        for row in rows {
            if let Some(key) = row.get(column_index) {
                buckets.entry(key.to_string()).or_default().push(row.clone());
            }
        }
        Self { buckets }
    }

    /// Returns the buckets in key order.
    pub fn buckets(&self) -> &BTreeMap<String, Vec<Row>> {
        &self.buckets
    }

    /// Returns every indexed row, bucket by bucket in key order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.buckets.values().flatten()
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if the index has no keys.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// A table: schema, rows in insertion order, and snapshot indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Ordered columns; names are unique.
    pub columns: Vec<Column>,
    /// Rows in insertion order.
    pub rows: Vec<Row>,
    /// Indexes by index name.
    pub indexes: BTreeMap<String, Index>,
}

impl Table {
    /// Creates an empty table without validating the column list.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            indexes: BTreeMap::new(),
        }
    }

    /// Creates an empty table, rejecting duplicate column names.
    pub fn try_new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self::new(name, columns))
    }

    /// Returns a copy of this table's schema with no rows or indexes.
    pub fn empty_like(&self) -> Self {
        Self::new(self.name.clone(), self.columns.clone())
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks a row's arity and per-position types against the schema.
    pub fn validate_row(&self, row: &Row) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::ArityMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(row.iter()) {
            if !value.matches_type(column.ty) {
                return Err(TableError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.ty,
                    got: value.column_type(),
                });
            }
        }
        Ok(())
    }

    /// Appends a validated row.
    pub fn push_row(&mut self, row: Row) -> Result<(), TableError> {
        self.validate_row(&row)?;
        self.rows.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scalar;

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", ColumnType::Int64),
                Column::new("name", ColumnType::Utf8String),
            ],
        )
    }

    #[test]
    fn test_try_new_rejects_duplicates() {
        let result = Table::try_new(
            "t",
            vec![
                Column::new("a", ColumnType::Int64),
                Column::new("a", ColumnType::Bool),
            ],
        );
        assert_eq!(result, Err(TableError::DuplicateColumn("a".to_string())));
    }

    #[test]
    fn test_push_row_validates_shape() {
        let mut table = users();
        table
            .push_row(Row::new(vec![Scalar::Int(1), Scalar::from("Alice")]))
            .unwrap();

        let err = table.push_row(Row::new(vec![Scalar::Int(2)])).unwrap_err();
        assert!(matches!(err, TableError::ArityMismatch { expected: 2, got: 1 }));

        let err = table
            .push_row(Row::new(vec![Scalar::from("2"), Scalar::from("Bob")]))
            .unwrap_err();
        assert!(matches!(err, TableError::TypeMismatch { .. }));
        assert_eq!(table.num_rows(), 1);
    }

    #[test]
    fn test_column_lookup() {
        let table = users();
        assert_eq!(table.column_index("name"), Some(1));
        assert_eq!(table.column_index("age"), None);
        assert_eq!(table.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_index_build_groups_rows_by_key() {
        let mut table = users();
        for (id, name) in [(1, "Bob"), (2, "Alice"), (3, "Bob")] {
            table
                .push_row(Row::new(vec![Scalar::Int(id), Scalar::from(name)]))
                .unwrap();
        }
        let index = Index::build(&table.rows, 1);
        assert_eq!(index.len(), 2);
        assert_eq!(index.buckets()["Bob"].len(), 2);
        let ids: Vec<_> = index.rows().map(|r| r.get(0).cloned().unwrap()).collect();
        assert_eq!(ids, vec![Scalar::Int(2), Scalar::Int(1), Scalar::Int(3)]);
    }
}
