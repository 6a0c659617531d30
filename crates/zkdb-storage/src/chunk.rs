//! Chunk wire format.
//!
//! A chunk is a JSON object keyed by table name whose value is a
//! [`TablePayload`]:
//!
//! ```text
//! { "<table>": { "columns": [..], "column_types": {..}, "rows": [[..]], "indexes": {} } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use zkdb_common::{Column, ColumnType, Index, Row, Scalar, Table};

use crate::error::{StorageError, StorageResult};

/// Wire form of an index: key text to encoded rows.
pub type IndexPayload = BTreeMap<String, Vec<Vec<JsonValue>>>;

/// One table's share of a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    /// Column names in schema order.
    pub columns: Vec<String>,
    /// Column name to wire type name.
    pub column_types: BTreeMap<String, ColumnType>,
    /// Encoded rows, each in schema order.
    pub rows: Vec<Vec<JsonValue>>,
    /// Indexes carried by this chunk.
    #[serde(default)]
    pub indexes: BTreeMap<String, IndexPayload>,
}

impl TablePayload {
    /// Encodes a complete table: schema, every row and every index.
    pub fn from_table(table: &Table) -> Self {
        let mut payload = Self::schema_only(table);
        payload.rows = table.rows.iter().map(encode_row).collect();
        payload.indexes = table
            .indexes
            .iter()
            .map(|(name, index)| (name.clone(), encode_index(index)))
            .collect();
        payload
    }

    /// Encodes the schema of `table` plus only the given rows.
    pub fn delta(table: &Table, rows: &[Row]) -> Self {
        let mut payload = Self::schema_only(table);
        payload.rows = rows.iter().map(encode_row).collect();
        payload
    }

    /// Encodes the schema of `table`, no rows, and a single index.
    pub fn index(table: &Table, name: &str, index: &Index) -> Self {
        let mut payload = Self::schema_only(table);
        payload.indexes.insert(name.to_string(), encode_index(index));
        payload
    }

    fn schema_only(table: &Table) -> Self {
        Self {
            columns: table.columns.iter().map(|c| c.name.clone()).collect(),
            column_types: table
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.ty))
                .collect(),
            rows: Vec::new(),
            indexes: BTreeMap::new(),
        }
    }

    /// Decodes the payload's schema into typed columns.
    pub fn schema(&self) -> StorageResult<Vec<Column>> {
        self.columns
            .iter()
            .map(|name| {
                self.column_types
                    .get(name)
                    .map(|ty| Column::new(name.clone(), *ty))
                    .ok_or_else(|| {
                        StorageError::Encoding(format!("column '{}' has no declared type", name))
                    })
            })
            .collect()
    }

    /// Decodes every row against `columns`.
    pub fn decode_rows(&self, columns: &[Column]) -> StorageResult<Vec<Row>> {
        self.rows.iter().map(|row| decode_row(columns, row)).collect()
    }

    /// Decodes every index against `columns`.
    pub fn decode_indexes(&self, columns: &[Column]) -> StorageResult<BTreeMap<String, Index>> {
        self.indexes
            .iter()
            .map(|(name, buckets)| {
                let decoded = buckets
                    .iter()
                    .map(|(key, rows)| {
                        let rows = rows
                            .iter()
                            .map(|row| decode_row(columns, row))
                            .collect::<StorageResult<Vec<_>>>()?;
                        Ok((key.clone(), rows))
                    })
                    .collect::<StorageResult<BTreeMap<_, _>>>()?;
                Ok((name.clone(), Index::from_buckets(decoded)))
            })
            .collect()
    }

    /// Decodes the payload as a standalone table named `name`.
    pub fn into_table(self, name: &str) -> StorageResult<Table> {
        let columns = self.schema()?;
        let mut table = Table::try_new(name, columns)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        table.rows = self.decode_rows(&table.columns)?;
        table.indexes = self.decode_indexes(&table.columns)?;
        Ok(table)
    }
}

fn encode_row(row: &Row) -> Vec<JsonValue> {
    row.iter().map(Scalar::to_json).collect()
}

fn encode_index(index: &Index) -> IndexPayload {
    index
        .buckets()
        .iter()
        .map(|(key, rows)| (key.clone(), rows.iter().map(encode_row).collect()))
        .collect()
}

fn decode_row(columns: &[Column], cells: &[JsonValue]) -> StorageResult<Row> {
    if cells.len() != columns.len() {
        return Err(StorageError::Encoding(format!(
            "row has {} cells, schema has {} columns",
            cells.len(),
            columns.len()
        )));
    }
    columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| {
            Scalar::from_json(column.ty, cell)
                .map_err(|e| StorageError::Encoding(format!("column '{}': {}", column.name, e)))
        })
        .collect::<StorageResult<Vec<_>>>()
        .map(Row::new)
}

/// A chunk: table name to payload.
///
/// Chunks written by this crate always carry exactly one table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chunk(BTreeMap<String, TablePayload>);

impl Chunk {
    /// Creates a chunk carrying one table's payload.
    pub fn single(table_name: impl Into<String>, payload: TablePayload) -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(table_name.into(), payload);
        Self(tables)
    }

    /// Returns the payload for `table_name`, if this chunk carries it.
    pub fn get(&self, table_name: &str) -> Option<&TablePayload> {
        self.0.get(table_name)
    }

    /// Consumes the chunk, returning the payload for `table_name`.
    pub fn take(mut self, table_name: &str) -> Option<TablePayload> {
        self.0.remove(table_name)
    }

    /// Returns the table names carried by this chunk.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Decodes a chunk from its JSON form.
    pub fn from_json(value: JsonValue) -> StorageResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Encodes the chunk to its JSON form.
    pub fn to_json(&self) -> StorageResult<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}
