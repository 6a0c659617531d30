//! Parser for the zkdb SQL dialect.
//!
//! # Supported SQL
//!
//! ```text
//! CREATE TABLE <name> ( <col> <type> [, ...] )
//! CREATE INDEX <index> ON <table> ( <col> )
//! INSERT INTO <name> ( <col> [, ...] ) VALUES ( <lit> [, ...] ) [, ( ... ) ...]
//! SELECT <col,...|*> FROM <name>
//!   [WHERE <col> = <lit>]
//!   [GROUP BY <col>]
//!   [ORDER BY <col>]
//!   [LIMIT <n>]
//!   [COSINE SIMILARITY <col> WITH <vector-lit>]
//! ```
//!
//! Keywords are case-sensitive and SELECT clauses must appear in the order
//! shown. Whitespace outside quoted literals is insignificant.
//!
//! # Usage
//!
//! ```
//! use zkdb_sql::parser::{Parser, Statement};
//!
//! let stmt = Parser::parse("SELECT name FROM users WHERE id = 1").unwrap();
//! assert!(matches!(stmt, Statement::Select(_)));
//! ```

use thiserror::Error;
use zkdb_common::{Column, ColumnType, ErrorCode};

mod scan;
mod statement;

pub use statement::*;

use crate::literal::parse_vector;
use scan::{
    count_keyword, find_keyword, identifier, normalize, paren_groups, parenthesized,
    split_top_level,
};

/// Errors that can occur during parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Malformed statement.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Unsupported or invalid column definition.
    #[error("schema error: {0}")]
    Schema(String),

    /// Nothing to parse.
    #[error("empty query")]
    EmptyQuery,
}

impl ParseError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::Schema(_) => ErrorCode::SchemaError,
            ParseError::Syntax(_) | ParseError::EmptyQuery => ErrorCode::SyntaxError,
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// SELECT clause keywords in their required order.
const SELECT_CLAUSES: [&str; 5] = ["WHERE", "GROUP BY", "ORDER BY", "LIMIT", "COSINE SIMILARITY"];

/// Parser for the zkdb dialect.
pub struct Parser;

impl Parser {
    /// Parses a single statement.
    pub fn parse(sql: &str) -> ParseResult<Statement> {
        let sql = normalize(sql);
        if sql.is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        if let Some(rest) = sql.strip_prefix("CREATE TABLE ") {
            parse_create_table(rest).map(Statement::CreateTable)
        } else if let Some(rest) = sql.strip_prefix("CREATE INDEX ") {
            parse_create_index(rest).map(Statement::CreateIndex)
        } else if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
            parse_insert(rest).map(Statement::Insert)
        } else if let Some(rest) = sql.strip_prefix("SELECT ") {
            parse_select(rest).map(Statement::Select)
        } else {
            Err(ParseError::Syntax(format!(
                "unsupported statement: '{}'",
                sql.split(' ').next().unwrap_or_default()
            )))
        }
    }
}

/// Splits `<name> (<body>)` into the name and the parenthesized body.
fn name_and_list(text: &str) -> ParseResult<(String, &str)> {
    let open = text
        .find('(')
        .ok_or_else(|| ParseError::Syntax(format!("expected '(' after '{}'", text.trim())))?;
    let name = identifier(&text[..open])?;
    let body = parenthesized(&text[open..])?;
    Ok((name, body))
}

fn parse_create_table(rest: &str) -> ParseResult<CreateTableStatement> {
    let (name, body) = name_and_list(rest)?;
    let mut columns: Vec<Column> = Vec::new();
    for definition in split_top_level(body, ',') {
        let parts: Vec<&str> = definition.split(' ').collect();
        let [column, ty] = parts.as_slice() else {
            return Err(ParseError::Syntax(format!(
                "expected '<column> <type>', got '{}'",
                definition
            )));
        };
        let column = identifier(column)?;
        let ty = ColumnType::from_sql_name(ty).ok_or_else(|| {
            ParseError::Schema(format!("unsupported type '{}' for column '{}'", ty, column))
        })?;
        if columns.iter().any(|c| c.name == column) {
            return Err(ParseError::Schema(format!("duplicate column '{}'", column)));
        }
        columns.push(Column::new(column, ty));
    }
    Ok(CreateTableStatement { name, columns })
}

fn parse_create_index(rest: &str) -> ParseResult<CreateIndexStatement> {
    let on = find_keyword(rest, "ON")
        .ok_or_else(|| ParseError::Syntax("expected 'ON' in CREATE INDEX".to_string()))?;
    let name = identifier(&rest[..on])?;
    let (table, body) = name_and_list(&rest[on + "ON".len()..])?;
    let column = identifier(body)?;
    Ok(CreateIndexStatement {
        name,
        table,
        column,
    })
}

fn parse_insert(rest: &str) -> ParseResult<InsertStatement> {
    let values = find_keyword(rest, "VALUES")
        .ok_or_else(|| ParseError::Syntax("expected 'VALUES' in INSERT".to_string()))?;
    let (table, column_list) = name_and_list(&rest[..values])?;
    let columns = split_top_level(column_list, ',')
        .into_iter()
        .map(identifier)
        .collect::<ParseResult<Vec<_>>>()?;

    let rows = paren_groups(&rest[values + "VALUES".len()..])?
        .into_iter()
        .map(|group| {
            if group.is_empty() {
                Vec::new()
            } else {
                split_top_level(group, ',')
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            }
        })
        .collect();

    Ok(InsertStatement {
        table,
        columns,
        rows,
    })
}

fn parse_select(rest: &str) -> ParseResult<SelectStatement> {
    let from = find_keyword(rest, "FROM")
        .ok_or_else(|| ParseError::Syntax("expected 'FROM' in SELECT".to_string()))?;
    let projection = parse_projection(rest[..from].trim())?;

    let after_from = rest[from + "FROM".len()..].trim_start();
    let (table, clauses) = after_from
        .split_once(' ')
        .unwrap_or((after_from, ""));
    let table = identifier(table)?;

    let mut stmt = SelectStatement {
        table,
        projection,
        selection: None,
        group_by: None,
        order_by: None,
        limit: None,
        similarity: None,
    };

    let clauses = clauses.trim();
    let mut found: Vec<(usize, &str)> = Vec::new();
    for keyword in SELECT_CLAUSES {
        match count_keyword(clauses, keyword) {
            0 => {}
            1 => found.extend(find_keyword(clauses, keyword).map(|at| (at, keyword))),
            _ => return Err(ParseError::Syntax(format!("duplicate {} clause", keyword))),
        }
    }
    if !found.windows(2).all(|w| w[0].0 < w[1].0) {
        return Err(ParseError::Syntax(
            "clauses must appear in the order WHERE, GROUP BY, ORDER BY, LIMIT, COSINE SIMILARITY"
                .to_string(),
        ));
    }
    match found.first() {
        Some(&(0, _)) => {}
        None if clauses.is_empty() => {}
        _ => {
            return Err(ParseError::Syntax(format!(
                "unexpected text after table name: '{}'",
                clauses
            )))
        }
    }

    for (i, &(start, keyword)) in found.iter().enumerate() {
        let end = found.get(i + 1).map_or(clauses.len(), |next| next.0);
        let body = clauses[start + keyword.len()..end].trim();
        if body.is_empty() {
            return Err(ParseError::Syntax(format!("empty {} clause", keyword)));
        }
        match keyword {
            "WHERE" => stmt.selection = Some(parse_where(body)?),
            "GROUP BY" => stmt.group_by = Some(identifier(body)?),
            "ORDER BY" => stmt.order_by = Some(identifier(body)?),
            "LIMIT" => {
                stmt.limit = Some(body.parse().map_err(|_| {
                    ParseError::Syntax(format!("LIMIT expects a non-negative integer, got '{}'", body))
                })?)
            }
            _ => stmt.similarity = Some(parse_similarity(body)?),
        }
    }
    Ok(stmt)
}

fn parse_projection(text: &str) -> ParseResult<Projection> {
    if text == "*" {
        return Ok(Projection::All);
    }
    split_top_level(text, ',')
        .into_iter()
        .map(identifier)
        .collect::<ParseResult<Vec<_>>>()
        .map(Projection::Columns)
}

fn parse_where(body: &str) -> ParseResult<WhereClause> {
    let parts = split_top_level(body, '=');
    let [column, literal] = parts.as_slice() else {
        return Err(ParseError::Syntax(format!(
            "WHERE supports a single '<column> = <literal>' comparison, got '{}'",
            body
        )));
    };
    if literal.is_empty() {
        return Err(ParseError::Syntax("WHERE is missing a literal".to_string()));
    }
    Ok(WhereClause {
        column: identifier(column)?,
        literal: literal.to_string(),
    })
}

fn parse_similarity(body: &str) -> ParseResult<SimilarityClause> {
    let with = find_keyword(body, "WITH").ok_or_else(|| {
        ParseError::Syntax("expected 'COSINE SIMILARITY <column> WITH [..]'".to_string())
    })?;
    let column = identifier(&body[..with])?;
    let literal = body[with + "WITH".len()..].trim();
    let vector = parse_vector(literal)
        .map_err(|e| ParseError::Syntax(format!("invalid similarity vector: {}", e)))?;
    Ok(SimilarityClause { column, vector })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(sql: &str) -> SelectStatement {
        match Parser::parse(sql).unwrap() {
            Statement::Select(s) => s,
            other => panic!("expected SELECT, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_create_table() {
        let stmt = Parser::parse("CREATE TABLE docs (id int, body string, embedding list[float])")
            .unwrap();
        let Statement::CreateTable(create) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(create.name, "docs");
        assert_eq!(
            create.columns,
            vec![
                Column::new("id", ColumnType::Int64),
                Column::new("body", ColumnType::Utf8String),
                Column::new("embedding", ColumnType::FloatVector),
            ]
        );
    }

    #[test]
    fn test_create_table_unknown_type_is_schema_error() {
        let err = Parser::parse("CREATE TABLE t (id uuid)").unwrap_err();
        assert!(matches!(err, ParseError::Schema(_)));
        assert_eq!(err.code(), ErrorCode::SchemaError);

        let err = Parser::parse("CREATE TABLE t (id int, id string)").unwrap_err();
        assert!(matches!(err, ParseError::Schema(_)));
    }

    #[test]
    fn test_create_table_malformed() {
        assert!(matches!(
            Parser::parse("CREATE TABLE t (id)"),
            Err(ParseError::Syntax(_))
        ));
        assert!(matches!(
            Parser::parse("CREATE TABLE t id int"),
            Err(ParseError::Syntax(_))
        ));
    }

    #[test]
    fn test_parse_create_index() {
        let stmt = Parser::parse("CREATE INDEX by_name ON users (name)").unwrap();
        assert_eq!(
            stmt,
            Statement::CreateIndex(CreateIndexStatement {
                name: "by_name".to_string(),
                table: "users".to_string(),
                column: "name".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_insert_multiple_groups() {
        let stmt = Parser::parse(
            "INSERT INTO docs (id, body, embedding) VALUES (1, 'a, b', [0.1, 0.2]), (2, 'c', [0.3, 0.4])",
        )
        .unwrap();
        let Statement::Insert(insert) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(insert.columns, vec!["id", "body", "embedding"]);
        assert_eq!(
            insert.rows,
            vec![
                vec!["1".to_string(), "'a, b'".to_string(), "[0.1, 0.2]".to_string()],
                vec!["2".to_string(), "'c'".to_string(), "[0.3, 0.4]".to_string()],
            ]
        );
    }

    #[test]
    fn test_parse_select_all_clauses() {
        let stmt = select(
            "SELECT id, title FROM docs WHERE author = 'Ann Lee' GROUP BY author ORDER BY id LIMIT 5 COSINE SIMILARITY embedding WITH [0.1, 0.2]",
        );
        assert_eq!(
            stmt.projection,
            Projection::Columns(vec!["id".to_string(), "title".to_string()])
        );
        assert_eq!(
            stmt.selection,
            Some(WhereClause {
                column: "author".to_string(),
                literal: "'Ann Lee'".to_string()
            })
        );
        assert_eq!(stmt.group_by.as_deref(), Some("author"));
        assert_eq!(stmt.order_by.as_deref(), Some("id"));
        assert_eq!(stmt.limit, Some(5));
        assert_eq!(
            stmt.similarity,
            Some(SimilarityClause {
                column: "embedding".to_string(),
                vector: vec![0.1, 0.2]
            })
        );
    }

    #[test]
    fn test_parse_select_star() {
        let stmt = select("SELECT * FROM users");
        assert_eq!(stmt.projection, Projection::All);
        assert_eq!(stmt.table, "users");
        assert!(stmt.selection.is_none());
    }

    #[test]
    fn test_keyword_inside_literal_is_not_a_clause() {
        let stmt = select("SELECT id FROM t WHERE name = 'ORDER BY x'");
        assert_eq!(stmt.selection.unwrap().literal, "'ORDER BY x'");
        assert!(stmt.order_by.is_none());
    }

    #[test]
    fn test_select_syntax_errors() {
        for sql in [
            "SELECT id FROM t LIMIT 1 WHERE id = 1",
            "SELECT id FROM t WHERE id = 1 AND name = 'x'",
            "SELECT id FROM t WHERE id > 1",
            "SELECT id FROM t LIMIT many",
            "SELECT id FROM t LIMIT 1 LIMIT 2",
            "SELECT id FROM t junk",
            "SELECT id t",
            "SELECT id FROM t COSINE SIMILARITY v WITH [a, b]",
            "select id from t",
            "DELETE FROM t",
        ] {
            assert!(
                matches!(Parser::parse(sql), Err(ParseError::Syntax(_))),
                "expected syntax error for {}",
                sql
            );
        }
        assert_eq!(Parser::parse("   "), Err(ParseError::EmptyQuery));
    }
}
