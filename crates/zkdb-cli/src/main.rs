//! zkdb Command-Line Interface
//!
//! Runs statements against a local zkdb data directory.
//!
//! # Usage
//!
//! ```bash
//! # Execute a statement
//! zkdb execute "CREATE TABLE users (id int, name string)"
//! zkdb execute "INSERT INTO users (id, name) VALUES (1, 'Alice')"
//!
//! # Query with a membership proof, as JSON
//! zkdb execute --prove -o json "SELECT name FROM users WHERE id = 1"
//!
//! # Embed text for a list[float] column
//! zkdb embed "the quick brown fox"
//!
//! # Use a different data directory
//! zkdb --data-dir ./data execute "SELECT * FROM users"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use zkdb_server::Database;

mod commands;
mod config;
mod formatter;

use config::CliConfig;
use formatter::OutputFormat;

/// zkdb command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "zkdb",
    version,
    about = "Command-line interface for zkdb",
    long_about = "Run SQL statements against a local zkdb data directory.\n\n\
                  Tables are stored as content-addressed chunk sequences; queries can\n\
                  carry a membership proof for their result rows."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Data directory (defaults to <data_local_dir>/zkdb)
    #[arg(short = 'd', long, value_name = "DIR", global = true, env = "ZKDB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, value_name = "FILE", global = true, env = "ZKDB_CLI_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one SQL statement
    Execute {
        /// Statement to execute
        sql: String,

        /// Attach a membership proof
        #[arg(long)]
        prove: bool,

        /// Output format
        #[arg(short = 'o', long, value_enum)]
        output: Option<OutputFormatArg>,
    },

    /// Print the embedding of a piece of text
    Embed {
        /// Text to embed
        text: String,

        /// Output format
        #[arg(short = 'o', long, value_enum)]
        output: Option<OutputFormatArg>,
    },
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
    /// Display raw values
    Raw,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Raw => OutputFormat::Raw,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose);

    // Load configuration
    let config = load_config(&args)?;
    let db = Database::open(&config.server_config()).with_context(|| {
        format!(
            "failed to open data directory {}",
            config.effective_data_dir().display()
        )
    })?;

    let output = match &args.command {
        Command::Execute { sql, prove, output } => {
            let format = resolve_format(&config, *output)?;
            // An explicit --prove wins; otherwise the configured default applies.
            let prove = prove.then_some(true);
            commands::execute(&db, sql, prove, format)?
        }
        Command::Embed { text, output } => {
            let format = resolve_format(&config, *output)?;
            commands::embed(&db, text, format)
        }
    };
    println!("{output}");
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("zkdb=debug,zkdb_server=debug,zkdb_sql=debug,zkdb_storage=debug,zkdb_proof=debug")
    } else {
        EnvFilter::new("zkdb=warn,zkdb_server=warn,zkdb_sql=warn,zkdb_storage=warn,zkdb_proof=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    // Try to load from config file
    let mut config = if let Some(path) = &args.config {
        CliConfig::from_file(path)?
    } else {
        CliConfig::load_default()?
    };

    // Override with command line arguments
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }

    Ok(config)
}

fn resolve_format(config: &CliConfig, arg: Option<OutputFormatArg>) -> Result<OutputFormat> {
    match arg {
        Some(arg) => Ok(arg.into()),
        None => config.output_format.parse().map_err(|e: String| anyhow!(e)),
    }
}
