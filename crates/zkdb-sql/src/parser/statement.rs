//! Parsed statement types.

use zkdb_common::Column;

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `CREATE TABLE`.
    CreateTable(CreateTableStatement),
    /// `CREATE INDEX`.
    CreateIndex(CreateIndexStatement),
    /// `INSERT INTO`.
    Insert(InsertStatement),
    /// `SELECT`.
    Select(SelectStatement),
}

impl Statement {
    /// Returns the name of the table the statement targets.
    pub fn table_name(&self) -> &str {
        match self {
            Statement::CreateTable(s) => &s.name,
            Statement::CreateIndex(s) => &s.table,
            Statement::Insert(s) => &s.table,
            Statement::Select(s) => &s.table,
        }
    }

    /// Returns a short statement kind for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::CreateIndex(_) => "CREATE INDEX",
            Statement::Insert(_) => "INSERT",
            Statement::Select(_) => "SELECT",
        }
    }
}

/// `CREATE TABLE <name> (<col> <type>, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name.
    pub name: String,
    /// Column definitions in declaration order.
    pub columns: Vec<Column>,
}

/// `CREATE INDEX <name> ON <table> (<column>)`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    /// Index name.
    pub name: String,
    /// Table name.
    pub table: String,
    /// Indexed column.
    pub column: String,
}

/// `INSERT INTO <table> (<col>, ...) VALUES (<lit>, ...), ...`
///
/// Literals are kept as raw text; they are converted against the table
/// schema at execution time.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Table name.
    pub table: String,
    /// Column list as written.
    pub columns: Vec<String>,
    /// One entry per value group.
    pub rows: Vec<Vec<String>>,
}

/// SELECT projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`
    All,
    /// Explicit column list.
    Columns(Vec<String>),
}

/// `WHERE <column> = <literal>`
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// Filtered column.
    pub column: String,
    /// Raw literal text.
    pub literal: String,
}

/// `COSINE SIMILARITY <column> WITH [<f64>, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityClause {
    /// Vector column.
    pub column: String,
    /// Query vector.
    pub vector: Vec<f64>,
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Table name.
    pub table: String,
    /// Projected columns.
    pub projection: Projection,
    /// Equality filter.
    pub selection: Option<WhereClause>,
    /// Grouping column.
    pub group_by: Option<String>,
    /// Sort column, ascending.
    pub order_by: Option<String>,
    /// Maximum number of result entries.
    pub limit: Option<usize>,
    /// Similarity ranking.
    pub similarity: Option<SimilarityClause>,
}
