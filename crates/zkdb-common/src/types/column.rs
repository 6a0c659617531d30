//! Column types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{
    TYPE_NAME_BOOL, TYPE_NAME_DATETIME, TYPE_NAME_FLOAT, TYPE_NAME_FLOAT_LIST, TYPE_NAME_INT,
    TYPE_NAME_STRING,
};

/// The closed set of column types a table may declare.
///
/// `FloatVector` carries no dimension: the first inserted value establishes
/// it and later inserts are not re-validated against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 text.
    Utf8String,
    /// Point in time, stored with second precision or finer.
    Timestamp,
    /// Variable-length vector of 64-bit floats.
    FloatVector,
}

impl ColumnType {
    /// All column types, in declaration order.
    pub const ALL: [ColumnType; 6] = [
        ColumnType::Int64,
        ColumnType::Float64,
        ColumnType::Bool,
        ColumnType::Utf8String,
        ColumnType::Timestamp,
        ColumnType::FloatVector,
    ];

    /// Returns the name used for this type in persisted chunks.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            ColumnType::Int64 => TYPE_NAME_INT,
            ColumnType::Float64 => TYPE_NAME_FLOAT,
            ColumnType::Bool => TYPE_NAME_BOOL,
            ColumnType::Utf8String => TYPE_NAME_STRING,
            ColumnType::Timestamp => TYPE_NAME_DATETIME,
            ColumnType::FloatVector => TYPE_NAME_FLOAT_LIST,
        }
    }

    /// Resolves a type name as written in a `CREATE TABLE` statement.
    ///
    /// Matching is case-insensitive and accepts the wire names as well as a
    /// few common SQL spellings.
    pub fn from_sql_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let ty = match lowered.as_str() {
            "int" | "int64" | "integer" | "bigint" => ColumnType::Int64,
            "float" | "float64" | "double" | "real" => ColumnType::Float64,
            "bool" | "boolean" => ColumnType::Bool,
            "string" | "utf8string" | "text" | "varchar" => ColumnType::Utf8String,
            "datetime" | "timestamp" => ColumnType::Timestamp,
            "list[float]" | "floatvector" | "vector" => ColumnType::FloatVector,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnType::ALL
            .into_iter()
            .find(|ty| ty.wire_name() == s)
            .ok_or_else(|| format!("unsupported column type '{}'", s))
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    pub ty: ColumnType,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}
