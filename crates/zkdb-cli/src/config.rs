//! Configuration file support for the CLI.
//!
//! Loads and saves CLI configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use zkdb_server::ServerConfig;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory holding the blob store and registry.
    ///
    /// Defaults to `<data_local_dir>/zkdb`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Default output format.
    #[serde(default = "default_format")]
    pub output_format: String,

    /// Prove statements by default.
    #[serde(default)]
    pub prove: bool,

    /// Upper bound on one proof, in milliseconds. Zero waits indefinitely.
    #[serde(default = "default_proof_timeout_ms")]
    pub proof_timeout_ms: u64,

    /// Length of vectors produced by `embed`.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

fn default_format() -> String {
    "table".to_string()
}

fn default_proof_timeout_ms() -> u64 {
    30_000
}

fn default_embedding_dimension() -> usize {
    384
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            output_format: default_format(),
            prove: false,
            proof_timeout_ms: default_proof_timeout_ms(),
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Loads the default configuration file.
    ///
    /// Looks in the following locations:
    /// 1. `<config_dir>/zkdb/config.toml`
    /// 2. `~/.zkdb/config.toml`
    /// 3. Returns default if not found
    pub fn load_default() -> Result<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("zkdb").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".zkdb").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Returns the data directory to use.
    pub fn effective_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("zkdb")
        })
    }

    /// Builds the database configuration for this CLI configuration.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::builder()
            .data_dir(self.effective_data_dir())
            .prove_by_default(self.prove)
            .proof_timeout_ms(self.proof_timeout_ms)
            .embedding_dimension(self.embedding_dimension)
            .build()
    }

    /// Returns a builder for configuration.
    pub fn builder() -> CliConfigBuilder {
        CliConfigBuilder::new()
    }
}

/// Builder for CLI configuration.
#[derive(Default)]
pub struct CliConfigBuilder {
    config: CliConfig,
}

impl CliConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    /// Sets the output format.
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.config.output_format = format.into();
        self
    }

    /// Proves statements by default.
    pub fn prove(mut self, enabled: bool) -> Self {
        self.config.prove = enabled;
        self
    }

    /// Sets the embedding dimension.
    pub fn embedding_dimension(mut self, dimension: usize) -> Self {
        self.config.embedding_dimension = dimension;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CliConfig {
        self.config
    }
}
