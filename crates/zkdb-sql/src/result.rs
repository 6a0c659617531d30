//! Query results.

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use zkdb_common::Row;

/// Rows returned by a statement.
///
/// `GROUP BY` changes the result shape from a list of rows to a list of
/// groups, each a list of rows.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Flat rows.
    Rows(Vec<Row>),
    /// Grouped rows, groups in first-appearance order.
    Groups(Vec<Vec<Row>>),
}

impl QueryResult {
    /// An empty flat result.
    pub fn empty() -> Self {
        QueryResult::Rows(Vec::new())
    }

    /// Returns the number of top-level entries (rows or groups).
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Rows(rows) => rows.len(),
            QueryResult::Groups(groups) => groups.len(),
        }
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns every row, with groups flattened in order.
    pub fn rows(&self) -> Vec<&Row> {
        match self {
            QueryResult::Rows(rows) => rows.iter().collect(),
            QueryResult::Groups(groups) => groups.iter().flatten().collect(),
        }
    }

    /// Returns every row by value, with groups flattened in order.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            QueryResult::Rows(rows) => rows,
            QueryResult::Groups(groups) => groups.into_iter().flatten().collect(),
        }
    }

    /// Returns the JSON form: `[[..], ..]` or `[[[..], ..], ..]`.
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueryResult::Rows(rows) => rows.serialize(serializer),
            QueryResult::Groups(groups) => groups.serialize(serializer),
        }
    }
}
