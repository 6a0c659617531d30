//! zkdb Server Daemon
//!
//! The `zkdbd` binary:
//! - Opens the database (in memory, or under a data directory)
//! - Serves the HTTP API
//! - Handles graceful shutdown on SIGTERM/SIGINT
//!
//! # Usage
//!
//! ```bash
//! # Start an in-memory server on 127.0.0.1:8080
//! zkdbd
//!
//! # Persist under a data directory
//! zkdbd --data-dir /var/lib/zkdb
//!
//! # Prove every query unless the request says otherwise
//! zkdbd --prove --challenge transcript
//!
//! # Use a configuration file
//! zkdbd --config /etc/zkdb/zkdbd.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zkdb_proof::ChallengeMode;
use zkdb_server::config::ServerConfig;
use zkdb_server::database::Database;

/// zkdb Server Daemon
#[derive(Parser, Debug)]
#[command(
    name = "zkdbd",
    version,
    about = "zkdb database server",
    long_about = "zkdb stores tables as content-addressed chunk sequences and can attach \
                  membership proofs to query results.\n\n\
                  This daemon serves the zkdb HTTP API."
)]
struct Args {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "ZKDB_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, env = "ZKDB_PORT")]
    port: Option<u16>,

    /// Data directory for persistent storage
    #[arg(short = 'd', long, value_name = "DIR", env = "ZKDB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "ZKDB_CONFIG")]
    config: Option<PathBuf>,

    /// Run in memory-only mode (no persistence)
    #[arg(long)]
    memory: bool,

    /// Prove every query unless the request says otherwise
    #[arg(long, env = "ZKDB_PROVE")]
    prove: bool,

    /// Proof timeout in milliseconds (0 waits indefinitely)
    #[arg(long, value_name = "MS", env = "ZKDB_PROOF_TIMEOUT_MS")]
    proof_timeout_ms: Option<u64>,

    /// How proof challenges are chosen (random, transcript)
    #[arg(long, value_parser = parse_challenge, env = "ZKDB_CHALLENGE")]
    challenge: Option<ChallengeMode>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "ZKDB_LOG_LEVEL")]
    log_level: String,

    /// Print configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    // Load configuration
    let config = load_config(&args)?;

    // Print config and exit if requested
    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    run_server(config).await
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };

    let filter = EnvFilter::try_new(format!(
        "zkdbd={level},zkdb_server={level},zkdb_sql={level},zkdb_storage={level},zkdb_proof={level}"
    ))
    .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn parse_challenge(value: &str) -> Result<ChallengeMode, String> {
    match value.to_ascii_lowercase().as_str() {
        "random" => Ok(ChallengeMode::Random),
        "transcript" => Ok(ChallengeMode::Transcript),
        other => Err(format!("unknown challenge mode '{}'", other)),
    }
}

fn load_config(args: &Args) -> Result<ServerConfig> {
    // Start from the file, if any
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path).context("Failed to load config file")?,
        None => ServerConfig::load_default().context("Failed to load default config file")?,
    };

    // Override with command-line arguments
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if args.memory {
        config.data_dir = None;
    }
    if args.prove {
        config.proof.enabled = true;
    }
    if let Some(timeout_ms) = args.proof_timeout_ms {
        config.proof.timeout_ms = timeout_ms;
    }
    if let Some(challenge) = args.challenge {
        config.proof.challenge = challenge;
    }

    Ok(config)
}

async fn run_server(config: ServerConfig) -> Result<()> {
    match &config.data_dir {
        Some(dir) => info!("Data directory: {}", dir.display()),
        None => info!("Starting in memory-only mode (data will not be persisted)"),
    }
    if config.proof.challenge == ChallengeMode::Random {
        warn!("Proof challenges are drawn at random and are not bound to the queried table");
    }

    let db = Database::open(&config).context("Failed to open database")?;
    let db = Arc::new(db);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server configuration:");
    info!("  Listen address: {}", addr);
    info!("  Proofs by default: {}", config.proof.enabled);
    info!("  Proof timeout: {} ms", config.proof.timeout_ms);
    info!("  Embedding dimension: {}", config.embedding_dimension);
    info!("Press Ctrl+C to shutdown");

    zkdb_server::http::serve(listener, db, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped. Goodbye!");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, shutting down gracefully...");
}
