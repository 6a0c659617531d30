//! Statement execution.
//!
//! Each statement runs as a strict sequence: resolve the table's sequence
//! pointer, replay, evaluate or mutate in memory, persist, repoint, and
//! finally prove if asked. Nothing is repointed unless every earlier step
//! succeeded, and a failed proof never fails the statement.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use zkdb_common::{Index, Row, Table};
use zkdb_proof::{
    generate_membership_proof, ChallengeMode, ProofBackend, ProofOptions, ProofOutcome,
    TranscriptBackend,
};
use zkdb_storage::{
    BlobStore, Commit, SequencePointer, SequenceRegistry, StorageHandle, TableStore,
};

use crate::error::{SqlError, SqlResult};
use crate::literal::convert_literal;
use crate::parser::{
    CreateIndexStatement, CreateTableStatement, InsertStatement, Parser, SelectStatement,
    Statement,
};
use crate::result::QueryResult;
use crate::select::execute_select;

/// Per-call execution options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Generate a membership proof for the statement's rows.
    pub prove: bool,
    /// Upper bound on proof generation.
    pub proof_timeout: Option<Duration>,
}

impl ExecuteOptions {
    /// Options requesting a proof.
    pub fn proved() -> Self {
        Self {
            prove: true,
            proof_timeout: None,
        }
    }
}

/// Outcome of one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementOutput {
    /// Output column names. Empty for statements that return no rows.
    pub columns: Vec<String>,
    /// Returned rows.
    pub result: QueryResult,
    /// Proof outcome, present when a proof was requested and applies.
    pub proof: Option<ProofOutcome>,
    /// Addresses written, for mutating statements.
    pub commit: Option<Commit>,
}

impl StatementOutput {
    fn mutation(commit: Commit) -> Self {
        Self {
            columns: Vec::new(),
            result: QueryResult::empty(),
            proof: None,
            commit: Some(commit),
        }
    }
}

/// SQL engine over a blob store and a sequence registry.
pub struct Engine {
    tables: TableStore,
    registry: Arc<dyn SequenceRegistry>,
    backend: Arc<dyn ProofBackend>,
    challenge: ChallengeMode,
}

impl Engine {
    /// Creates an engine using the reference proof backend.
    pub fn new(store: Arc<dyn BlobStore>, registry: Arc<dyn SequenceRegistry>) -> Self {
        Self {
            tables: TableStore::new(store),
            registry,
            backend: Arc::new(TranscriptBackend::default()),
            challenge: ChallengeMode::default(),
        }
    }

    /// Replaces the proof backend.
    pub fn with_backend(mut self, backend: Arc<dyn ProofBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Sets how proof challenges are chosen.
    pub fn with_challenge(mut self, challenge: ChallengeMode) -> Self {
        self.challenge = challenge;
        self
    }

    /// Returns the table store.
    pub fn table_store(&self) -> &TableStore {
        &self.tables
    }

    /// Returns the sequence registry.
    pub fn registry(&self) -> &Arc<dyn SequenceRegistry> {
        &self.registry
    }

    /// Returns the proof backend.
    pub fn backend(&self) -> &Arc<dyn ProofBackend> {
        &self.backend
    }

    /// Parses and executes one statement.
    pub fn execute(&self, sql: &str, options: &ExecuteOptions) -> SqlResult<StatementOutput> {
        let start = Instant::now();
        let statement = Parser::parse(sql)?;
        debug!(kind = statement.kind(), table = statement.table_name(), "executing statement");

        let output = match &statement {
            Statement::CreateTable(stmt) => self.create_table(stmt, options),
            Statement::CreateIndex(stmt) => self.create_index(stmt),
            Statement::Insert(stmt) => self.insert(stmt, options),
            Statement::Select(stmt) => self.select(stmt, options),
        }?;

        info!(
            kind = statement.kind(),
            table = statement.table_name(),
            rows = output.result.len(),
            proven = output.proof.as_ref().map(ProofOutcome::is_proven),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "statement complete"
        );
        Ok(output)
    }

    /// Looks up a table's pointer, failing with `UnknownTable`.
    pub fn pointer(&self, table_name: &str) -> SqlResult<SequencePointer> {
        self.registry
            .lookup(table_name)?
            .ok_or_else(|| SqlError::UnknownTable(table_name.to_string()))
    }

    /// Replays a table's current state.
    pub fn load_table(&self, table_name: &str) -> SqlResult<(SequencePointer, Table)> {
        let pointer = self.pointer(table_name)?;
        let table = self.tables.load(&handle(&pointer))?;
        Ok((pointer, table))
    }

    fn create_table(
        &self,
        stmt: &CreateTableStatement,
        options: &ExecuteOptions,
    ) -> SqlResult<StatementOutput> {
        if self.registry.lookup(&stmt.name)?.is_some() {
            return Err(SqlError::TableExists(stmt.name.clone()));
        }
        let table = Table::try_new(stmt.name.clone(), stmt.columns.clone())
            .map_err(|e| SqlError::Parse(crate::parser::ParseError::Schema(e.to_string())))?;

        let commit = self
            .tables
            .write_full(&StorageHandle::fresh(&stmt.name), &table)?;
        self.registry
            .create(&stmt.name, commit.sequence_address.clone())?;

        let mut output = StatementOutput::mutation(commit);
        if options.prove {
            output.proof = Some(self.prove(&table, &[], &[], options));
        }
        Ok(output)
    }

    fn create_index(&self, stmt: &CreateIndexStatement) -> SqlResult<StatementOutput> {
        let (pointer, table) = self.load_table(&stmt.table)?;
        let column = table
            .column_index(&stmt.column)
            .ok_or_else(|| SqlError::unknown_column(&table.name, &stmt.column))?;
        let index = Index::build(&table.rows, column);

        let commit = self
            .tables
            .write_index(&handle(&pointer), &table, &stmt.name, &index)?;
        self.repoint(&pointer, &commit)?;
        Ok(StatementOutput::mutation(commit))
    }

    fn insert(
        &self,
        stmt: &InsertStatement,
        options: &ExecuteOptions,
    ) -> SqlResult<StatementOutput> {
        let (pointer, mut table) = self.load_table(&stmt.table)?;

        let schema: Vec<String> = table.column_names().into_iter().map(String::from).collect();
        if stmt.columns != schema {
            return Err(SqlError::ColumnMismatch {
                expected: schema,
                got: stmt.columns.clone(),
            });
        }

        let rows = stmt
            .rows
            .iter()
            .map(|literals| {
                if literals.len() != table.num_columns() {
                    return Err(SqlError::syntax(format!(
                        "expected {} values, got {}",
                        table.num_columns(),
                        literals.len()
                    )));
                }
                table
                    .columns
                    .iter()
                    .zip(literals)
                    .map(|(column, literal)| convert_literal(column, literal))
                    .collect::<SqlResult<Vec<_>>>()
                    .map(Row::new)
            })
            .collect::<SqlResult<Vec<_>>>()?;

        let commit = self.tables.write_delta(&handle(&pointer), &table, &rows)?;
        self.repoint(&pointer, &commit)?;

        let mut output = StatementOutput::mutation(commit);
        if options.prove {
            for row in &rows {
                table
                    .push_row(row.clone())
                    .map_err(|e| SqlError::Internal(e.to_string()))?;
            }
            output.proof = Some(self.prove(&table, &rows, &[], options));
        }
        Ok(output)
    }

    fn select(
        &self,
        stmt: &SelectStatement,
        options: &ExecuteOptions,
    ) -> SqlResult<StatementOutput> {
        let (_, table) = self.load_table(&stmt.table)?;
        let selected = execute_select(&table, stmt)?;

        let proof = options.prove.then(|| {
            let rows: Vec<Row> = selected.result.rows().into_iter().cloned().collect();
            self.prove(&table, &rows, &selected.columns, options)
        });
        Ok(StatementOutput {
            columns: selected.columns,
            result: selected.result,
            proof,
            commit: None,
        })
    }

    fn repoint(&self, pointer: &SequencePointer, commit: &Commit) -> SqlResult<()> {
        self.registry.repoint(
            &pointer.table_name,
            &pointer.sequence_cid,
            commit.sequence_address.clone(),
        )?;
        Ok(())
    }

    fn prove(
        &self,
        table: &Table,
        rows: &[Row],
        projected_columns: &[String],
        options: &ExecuteOptions,
    ) -> ProofOutcome {
        let proof_options = ProofOptions {
            challenge: self.challenge,
            timeout: options.proof_timeout,
        };
        generate_membership_proof(
            Arc::clone(&self.backend),
            table,
            rows,
            projected_columns,
            &proof_options,
        )
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("challenge", &self.challenge)
            .finish_non_exhaustive()
    }
}

fn handle(pointer: &SequencePointer) -> StorageHandle {
    StorageHandle::new(pointer.table_name.clone(), pointer.sequence_cid.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zkdb_common::ErrorCode;
    use zkdb_storage::{MemoryRegistry, MemoryStore};

    fn engine() -> Engine {
        Engine::new(Arc::new(MemoryStore::new()), Arc::new(MemoryRegistry::new()))
    }

    fn exec(engine: &Engine, sql: &str) -> StatementOutput {
        engine.execute(sql, &ExecuteOptions::default()).unwrap()
    }

    fn users(engine: &Engine) {
        exec(engine, "CREATE TABLE users (id int, name string)");
        exec(
            engine,
            "INSERT INTO users (id, name) VALUES (1, 'Alice'), (2, 'Bob'), (3, 'Carol')",
        );
    }

    #[test]
    fn test_create_insert_select() {
        let engine = engine();
        users(&engine);
        let out = exec(&engine, "SELECT name FROM users WHERE id = 1");
        assert_eq!(out.result.to_json(), json!([["Alice"]]));
        assert!(out.proof.is_none());
        assert!(out.commit.is_none());
    }

    #[test]
    fn test_create_twice_is_table_exists() {
        let engine = engine();
        exec(&engine, "CREATE TABLE t (id int)");
        let err = engine
            .execute("CREATE TABLE t (id int)", &ExecuteOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TableExists);
    }

    #[test]
    fn test_insert_column_order_is_strict() {
        let engine = engine();
        users(&engine);
        let before = engine.pointer("users").unwrap();

        for sql in [
            "INSERT INTO users (name, id) VALUES ('Dan', 4)",
            "INSERT INTO users (id) VALUES (4)",
        ] {
            let err = engine.execute(sql, &ExecuteOptions::default()).unwrap_err();
            assert!(matches!(err, SqlError::ColumnMismatch { .. }), "{}", sql);
        }
        assert_eq!(engine.pointer("users").unwrap(), before);
    }

    #[test]
    fn test_failed_insert_does_not_repoint() {
        let engine = engine();
        users(&engine);
        let before = engine.pointer("users").unwrap();

        let err = engine
            .execute(
                "INSERT INTO users (id, name) VALUES (4, 'Dan'), (five, 'Eve')",
                &ExecuteOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TypeConversion);

        let err = engine
            .execute(
                "INSERT INTO users (id, name) VALUES (4)",
                &ExecuteOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SyntaxError);

        assert_eq!(engine.pointer("users").unwrap(), before);
        assert_eq!(engine.load_table("users").unwrap().1.num_rows(), 3);
    }

    #[test]
    fn test_unknown_table() {
        let engine = engine();
        for sql in [
            "SELECT * FROM ghosts",
            "INSERT INTO ghosts (id) VALUES (1)",
            "CREATE INDEX g ON ghosts (id)",
        ] {
            let err = engine.execute(sql, &ExecuteOptions::default()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::UnknownTable, "{}", sql);
        }
    }

    #[test]
    fn test_each_mutation_moves_pointer() {
        let engine = engine();
        let created = exec(&engine, "CREATE TABLE t (id int)").commit.unwrap();
        assert_eq!(
            engine.pointer("t").unwrap().sequence_cid,
            created.sequence_address
        );

        let inserted = exec(&engine, "INSERT INTO t (id) VALUES (1)").commit.unwrap();
        assert_ne!(inserted.sequence_address, created.sequence_address);
        assert_eq!(
            engine.pointer("t").unwrap().sequence_cid,
            inserted.sequence_address
        );
    }

    #[test]
    fn test_index_short_circuit_after_create_index() {
        let engine = engine();
        users(&engine);
        exec(&engine, "CREATE INDEX name ON users (name)");

        let out = exec(&engine, "SELECT name FROM users WHERE name = 'Bob'");
        assert_eq!(out.result.len(), 3);

        let err = engine
            .execute("CREATE INDEX x ON users (age)", &ExecuteOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownColumn);
    }

    #[test]
    fn test_index_is_a_snapshot() {
        let engine = engine();
        users(&engine);
        exec(&engine, "CREATE INDEX name ON users (name)");
        exec(&engine, "INSERT INTO users (id, name) VALUES (4, 'Dan')");

        let out = exec(&engine, "SELECT name FROM users");
        assert_eq!(out.result.len(), 3);
        let out = exec(&engine, "SELECT id, name FROM users");
        assert_eq!(out.result.len(), 4);
    }

    #[test]
    fn test_proofs_for_each_statement_kind() {
        let engine = engine();
        let out = engine
            .execute("CREATE TABLE t (id int, tag string)", &ExecuteOptions::proved())
            .unwrap();
        assert!(out.proof.unwrap().is_proven());

        let out = engine
            .execute(
                "INSERT INTO t (id, tag) VALUES (1, 'a'), (2, 'b')",
                &ExecuteOptions::proved(),
            )
            .unwrap();
        assert!(out.proof.unwrap().is_proven());

        let out = engine
            .execute("SELECT tag FROM t WHERE id = 2", &ExecuteOptions::proved())
            .unwrap();
        assert_eq!(out.result.to_json(), json!([["b"]]));
        assert!(out.proof.unwrap().is_proven());

        let out = engine
            .execute("SELECT id FROM t GROUP BY tag", &ExecuteOptions::proved())
            .unwrap();
        assert!(out.proof.unwrap().is_proven());

        let out = engine
            .execute("CREATE INDEX tag ON t (tag)", &ExecuteOptions::proved())
            .unwrap();
        assert!(out.proof.is_none());
    }
}
