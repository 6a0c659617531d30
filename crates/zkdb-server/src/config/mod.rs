//! Server configuration.
//!
//! Configuration is read from a TOML file and then overridden by
//! command-line arguments and `ZKDB_*` environment variables in `zkdbd`.
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! data_dir = "/var/lib/zkdb"
//! embedding_dimension = 384
//!
//! [retry]
//! initial_backoff_ms = 100
//! max_backoff_ms = 5000
//! max_attempts = 8
//!
//! [proof]
//! enabled = false
//! timeout_ms = 30000
//! challenge = "random"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use zkdb_proof::ChallengeMode;
use zkdb_storage::RetryPolicy;

/// Name of the configuration file looked up by [`ServerConfig::load_default`].
pub const CONFIG_FILE_NAME: &str = "zkdbd.toml";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the blob store and the registry file.
    ///
    /// When unset the server keeps everything in memory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Blob store read retries.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Proof generation.
    #[serde(default)]
    pub proof: ProofConfig,

    /// Length of vectors returned by `/convert-to-embedding`.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

/// Retry schedule for transient blob store reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay after the first failed attempt, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on a single delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Total attempts per read, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Proof generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofConfig {
    /// Prove every query that does not say otherwise.
    #[serde(default)]
    pub enabled: bool,

    /// Upper bound on one proof, in milliseconds. Zero waits indefinitely.
    #[serde(default = "default_proof_timeout_ms")]
    pub timeout_ms: u64,

    /// How proof challenges are chosen.
    #[serde(default)]
    pub challenge: ChallengeMode,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_embedding_dimension() -> usize {
    384
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    5_000
}

fn default_max_attempts() -> u32 {
    8
}

fn default_proof_timeout_ms() -> u64 {
    30_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: None,
            retry: RetryConfig::default(),
            proof: ProofConfig::default(),
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: default_proof_timeout_ms(),
            challenge: ChallengeMode::default(),
        }
    }
}

impl RetryConfig {
    /// Converts to the storage layer's retry policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            max_attempts: self.max_attempts,
        }
    }
}

impl ProofConfig {
    /// Returns the proof timeout, or `None` when unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl ServerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads the first configuration file found in the default locations,
    /// or the defaults if there is none.
    ///
    /// Looks in `<config_dir>/zkdb/zkdbd.toml`, then `~/.zkdb/zkdbd.toml`.
    pub fn load_default() -> Result<Self> {
        for path in Self::default_paths() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("zkdb").join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".zkdb").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Converts configuration to TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if nothing is persisted.
    pub fn is_memory_mode(&self) -> bool {
        self.data_dir.is_none()
    }

    /// Creates a builder for configuration.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }
}

/// Builder for server configuration.
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    /// Sets the retry schedule.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Proves every query by default.
    pub fn prove_by_default(mut self, enabled: bool) -> Self {
        self.config.proof.enabled = enabled;
        self
    }

    /// Sets the proof timeout in milliseconds.
    pub fn proof_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.proof.timeout_ms = timeout_ms;
        self
    }

    /// Sets the challenge mode.
    pub fn challenge(mut self, challenge: ChallengeMode) -> Self {
        self.config.proof.challenge = challenge;
        self
    }

    /// Sets the embedding dimension.
    pub fn embedding_dimension(mut self, dimension: usize) -> Self {
        self.config.embedding_dimension = dimension;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.is_memory_mode());
        assert!(!config.proof.enabled);
        assert_eq!(config.proof.challenge, ChallengeMode::Random);
        assert_eq!(config.retry.policy(), RetryPolicy::default());
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::builder()
            .host("0.0.0.0")
            .port(9000)
            .data_dir("/data/zkdb")
            .prove_by_default(true)
            .challenge(ChallengeMode::Transcript)
            .build();

        assert_eq!(config.socket_addr(), "0.0.0.0:9000");
        assert!(!config.is_memory_mode());
        assert!(config.proof.enabled);
        assert_eq!(config.proof.challenge, ChallengeMode::Transcript);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            port = 7000

            [proof]
            challenge = "transcript"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.proof.timeout_ms, 30_000);
        assert_eq!(config.proof.challenge, ChallengeMode::Transcript);
        assert_eq!(config.retry.max_attempts, 8);
    }

    #[test]
    fn test_proof_timeout_zero_is_unbounded() {
        let config = ServerConfig::builder().proof_timeout_ms(0).build();
        assert_eq!(config.proof.timeout(), None);
        let config = ServerConfig::builder().proof_timeout_ms(250).build();
        assert_eq!(config.proof.timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = ServerConfig::builder()
            .host("testhost")
            .port(9999)
            .embedding_dimension(16)
            .build();
        config.save(&path).unwrap();

        let loaded = ServerConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
