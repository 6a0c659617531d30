//! Database facade.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use zkdb_proof::ProofBackend;
use zkdb_sql::{Engine, ExecuteOptions, SqlError, StatementOutput};
use zkdb_storage::{
    BlobStore, DirectoryStore, FileRegistry, MemoryRegistry, MemoryStore, RetryPolicy,
    RetryingStore, SequencePointer, SequenceRegistry, StorageHandle, TablePayload,
};

use crate::config::{ProofConfig, ServerConfig};
use crate::embedding::{Embedder, HashingEmbedder};
use crate::error::{ServerError, ServerResult};

/// Subdirectory of `data_dir` holding content-addressed objects.
pub const OBJECTS_DIR: &str = "objects";

/// File under `data_dir` holding the name→sequence registry.
pub const REGISTRY_FILE: &str = "registry.json";

/// A zkdb database: SQL engine, table payload ingestion, and embeddings.
pub struct Database {
    engine: Engine,
    embedder: Arc<dyn Embedder>,
    proof: ProofConfig,
}

impl Database {
    /// Opens the database described by `config`.
    ///
    /// With a `data_dir`, objects live under `<data_dir>/objects` and the
    /// registry in `<data_dir>/registry.json`; otherwise everything is kept
    /// in memory.
    pub fn open(config: &ServerConfig) -> ServerResult<Self> {
        let (store, registry): (Arc<dyn BlobStore>, Arc<dyn SequenceRegistry>) =
            match &config.data_dir {
                Some(dir) => Self::open_dir(dir, config.retry.policy())?,
                None => (Arc::new(MemoryStore::new()), Arc::new(MemoryRegistry::new())),
            };
        Ok(Self::from_parts(store, registry, config))
    }

    /// Opens an in-memory database with default settings.
    pub fn open_memory() -> Self {
        Self::from_parts(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryRegistry::new()),
            &ServerConfig::default(),
        )
    }

    /// Opens the directory-backed store and registry under `dir`.
    pub fn open_dir(
        dir: &Path,
        retry: RetryPolicy,
    ) -> ServerResult<(Arc<dyn BlobStore>, Arc<dyn SequenceRegistry>)> {
        let store = DirectoryStore::open(dir.join(OBJECTS_DIR))?;
        let registry = FileRegistry::open(dir.join(REGISTRY_FILE))?;
        info!(data_dir = %dir.display(), tables = registry.list()?.len(), "opened data directory");
        Ok((
            Arc::new(RetryingStore::new(store, retry)),
            Arc::new(registry),
        ))
    }

    /// Assembles a database from an existing store and registry.
    pub fn from_parts(
        store: Arc<dyn BlobStore>,
        registry: Arc<dyn SequenceRegistry>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            engine: Engine::new(store, registry).with_challenge(config.proof.challenge),
            embedder: Arc::new(HashingEmbedder::new(config.embedding_dimension)),
            proof: config.proof,
        }
    }

    /// Replaces the embedder.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self
    }

    /// Replaces the proof backend.
    pub fn with_backend(mut self, backend: Arc<dyn ProofBackend>) -> Self {
        self.engine = self.engine.with_backend(backend);
        self
    }

    /// Returns the SQL engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Executes one statement.
    ///
    /// `prove` overrides the configured default for this call.
    pub fn execute(&self, sql: &str, prove: Option<bool>) -> ServerResult<StatementOutput> {
        let options = ExecuteOptions {
            prove: prove.unwrap_or(self.proof.enabled),
            proof_timeout: self.proof.timeout(),
        };
        Ok(self.engine.execute(sql, &options)?)
    }

    /// Creates a table from a complete payload: schema, rows and indexes.
    pub fn create_entity(
        &self,
        entity_name: &str,
        payload: TablePayload,
    ) -> ServerResult<SequencePointer> {
        let registry = self.engine.registry();
        if registry.lookup(entity_name)?.is_some() {
            return Err(SqlError::TableExists(entity_name.to_string()).into());
        }
        let table = payload
            .into_table(entity_name)
            .map_err(|e| ServerError::InvalidPayload(e.to_string()))?;

        let commit = self
            .engine
            .table_store()
            .write_full(&StorageHandle::fresh(entity_name), &table)?;
        let pointer = registry.create(entity_name, commit.sequence_address)?;
        info!(
            table = entity_name,
            rows = table.num_rows(),
            sequence = %pointer.sequence_cid,
            "entity created"
        );
        Ok(pointer)
    }

    /// Appends the payload's rows to an existing table.
    ///
    /// The payload must declare exactly the table's columns, in order and
    /// with the same types. Indexes are only created through
    /// `CREATE INDEX`.
    pub fn append_data(
        &self,
        table_name: &str,
        payload: TablePayload,
    ) -> ServerResult<SequencePointer> {
        let (pointer, table) = self.engine.load_table(table_name)?;

        let schema: Vec<String> = table.column_names().into_iter().map(String::from).collect();
        if payload.columns != schema {
            return Err(SqlError::ColumnMismatch {
                expected: schema,
                got: payload.columns,
            }
            .into());
        }
        for column in &table.columns {
            if payload.column_types.get(&column.name) != Some(&column.ty) {
                return Err(ServerError::InvalidPayload(format!(
                    "column '{}' must have type {}",
                    column.name, column.ty
                )));
            }
        }
        if !payload.indexes.is_empty() {
            return Err(ServerError::InvalidPayload(
                "indexes cannot be appended; use CREATE INDEX".to_string(),
            ));
        }
        let rows = payload
            .decode_rows(&table.columns)
            .map_err(|e| ServerError::InvalidPayload(e.to_string()))?;

        let handle = StorageHandle::new(pointer.table_name.clone(), pointer.sequence_cid.clone());
        let commit = self.engine.table_store().write_delta(&handle, &table, &rows)?;
        let pointer = self.engine.registry().repoint(
            table_name,
            &pointer.sequence_cid,
            commit.sequence_address,
        )?;
        info!(
            table = table_name,
            rows = rows.len(),
            sequence = %pointer.sequence_cid,
            "data appended"
        );
        Ok(pointer)
    }

    /// Resolves a table name to its registry pointer.
    pub fn sequence_by_name(&self, entity_name: &str) -> ServerResult<SequencePointer> {
        Ok(self.engine.pointer(entity_name)?)
    }

    /// Returns every registered table.
    pub fn tables(&self) -> ServerResult<Vec<SequencePointer>> {
        Ok(self.engine.registry().list()?)
    }

    /// Embeds `text` with the configured embedder.
    pub fn embed(&self, text: &str) -> Vec<f64> {
        self.embedder.embed(text)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("engine", &self.engine)
            .field("embedding_dimension", &self.embedder.dimension())
            .field("proof", &self.proof)
            .finish()
    }
}
