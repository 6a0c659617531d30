//! SELECT evaluation.
//!
//! Pipeline, in order:
//!
//! 1. resolve the projection (`*` is every column) and every clause column
//! 2. index short-circuit: a single output column (after the similarity
//!    column is appended) with an index of the same name returns every
//!    indexed row, skipping the remaining steps
//! 3. WHERE equality filter
//! 4. GROUP BY partition (groups keep first-appearance order)
//! 5. ORDER BY stable ascending sort, within each group
//! 6. cosine ranking, descending, within each group; undefined similarities
//!    rank last
//! 7. LIMIT, counting rows or groups

use std::cmp::Ordering;
use std::collections::HashMap;

use zkdb_common::{ColumnType, Row, Scalar, Table};

use crate::error::{SqlError, SqlResult};
use crate::literal::strip_quotes;
use crate::parser::{Projection, SelectStatement, WhereClause};
use crate::result::QueryResult;
use crate::similarity::cosine_similarity;

/// Evaluated SELECT.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOutput {
    /// Output column names, in result order.
    pub columns: Vec<String>,
    /// Result rows.
    pub result: QueryResult,
}

enum Predicate {
    Int(usize, i64),
    Text(usize, String),
}

impl Predicate {
    fn compile(table: &Table, clause: &WhereClause) -> SqlResult<Self> {
        let index = resolve(table, &clause.column)?;
        match table.columns[index].ty {
            ColumnType::Int64 => {
                let literal = clause.literal.trim();
                literal.parse().map(|v| Predicate::Int(index, v)).map_err(|_| {
                    SqlError::syntax(format!(
                        "column '{}' is int, '{}' is not an integer literal",
                        clause.column, literal
                    ))
                })
            }
            _ => Ok(Predicate::Text(index, strip_quotes(&clause.literal).to_string())),
        }
    }

    fn matches(&self, row: &Row) -> bool {
        match self {
            Predicate::Int(i, expected) => matches!(row.get(*i), Some(Scalar::Int(v)) if v == expected),
            Predicate::Text(i, expected) => row.get(*i).and_then(Scalar::as_str) == Some(expected.as_str()),
        }
    }
}

fn resolve(table: &Table, column: &str) -> SqlResult<usize> {
    table
        .column_index(column)
        .ok_or_else(|| SqlError::unknown_column(&table.name, column))
}

/// Evaluates `stmt` against a replayed table.
pub fn execute_select(table: &Table, stmt: &SelectStatement) -> SqlResult<SelectOutput> {
    let mut output: Vec<usize> = match &stmt.projection {
        Projection::All => (0..table.num_columns()).collect(),
        Projection::Columns(columns) => columns
            .iter()
            .map(|c| resolve(table, c))
            .collect::<SqlResult<_>>()?,
    };

    let similarity = match &stmt.similarity {
        Some(clause) => Some((resolve(table, &clause.column)?, clause.vector.as_slice())),
        None => None,
    };
    if let Some((column, _)) = similarity {
        if !output.contains(&column) {
            output.push(column);
        }
    }
    let predicate = stmt
        .selection
        .as_ref()
        .map(|clause| Predicate::compile(table, clause))
        .transpose()?;
    let group_by = stmt
        .group_by
        .as_deref()
        .map(|c| resolve(table, c))
        .transpose()?;
    let order_by = stmt
        .order_by
        .as_deref()
        .map(|c| resolve(table, c))
        .transpose()?;

    if let [column] = output.as_slice() {
        let name = &table.columns[*column].name;
        if let Some(index) = table.indexes.get(name) {
            return Ok(SelectOutput {
                columns: vec![name.clone()],
                result: QueryResult::Rows(index.rows().map(|r| r.project(&output)).collect()),
            });
        }
    }

    let rows: Vec<Row> = table
        .rows
        .iter()
        .filter(|row| predicate.as_ref().map_or(true, |p| p.matches(row)))
        .cloned()
        .collect();

    let mut buckets = match group_by {
        Some(column) => partition(rows, column),
        None => vec![rows],
    };
    for bucket in &mut buckets {
        if let Some(column) = order_by {
            bucket.sort_by(|a, b| compare_cells(a, b, column));
        }
        if let Some((column, query)) = similarity {
            rank_by_similarity(bucket, column, query);
        }
    }

    let project = |bucket: Vec<Row>| -> Vec<Row> {
        bucket.iter().map(|row| row.project(&output)).collect()
    };
    let result = if group_by.is_some() {
        if let Some(limit) = stmt.limit {
            buckets.truncate(limit);
        }
        QueryResult::Groups(buckets.into_iter().map(project).collect())
    } else {
        let mut rows = buckets.pop().unwrap_or_default();
        if let Some(limit) = stmt.limit {
            rows.truncate(limit);
        }
        QueryResult::Rows(project(rows))
    };

    Ok(SelectOutput {
        columns: output
            .iter()
            .map(|&i| table.columns[i].name.clone())
            .collect(),
        result,
    })
}

fn partition(rows: Vec<Row>, column: usize) -> Vec<Vec<Row>> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<Row>> = Vec::new();
    for row in rows {
        let key = row.get(column).map(Scalar::to_string).unwrap_or_default();
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row);
    }
    groups
}

fn compare_cells(a: &Row, b: &Row, column: usize) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(x), Some(y)) => x.total_cmp(y),
        _ => Ordering::Equal,
    }
}

fn rank_by_similarity(rows: &mut Vec<Row>, column: usize, query: &[f64]) {
    let mut keyed: Vec<(Option<f64>, Row)> = rows
        .drain(..)
        .map(|row| {
            let score = row
                .get(column)
                .and_then(Scalar::as_vector)
                .and_then(|v| cosine_similarity(v, query));
            (score, row)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows.extend(keyed.into_iter().map(|(_, row)| row));
}
