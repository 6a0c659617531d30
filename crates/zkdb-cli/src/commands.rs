//! Subcommand implementations.

use anyhow::Result;
use tracing::debug;
use zkdb_server::Database;

use crate::formatter::{format_embedding, format_output, OutputFormat};

/// Executes one SQL statement and renders its output.
///
/// `prove` overrides the configured default.
pub fn execute(db: &Database, sql: &str, prove: Option<bool>, format: OutputFormat) -> Result<String> {
    debug!(sql, ?prove, "executing");
    let output = db.execute(sql, prove)?;
    Ok(format_output(&output, format))
}

/// Embeds `text` and renders the vector.
pub fn embed(db: &Database, text: &str, format: OutputFormat) -> String {
    format_embedding(&db.embed(text), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zkdb_server::ServerConfig;

    use crate::config::CliConfig;

    #[test]
    fn test_execute_round_trip() {
        let db = Database::open_memory();
        let created = execute(&db, "CREATE TABLE t (id int, name string)", None, OutputFormat::Raw)
            .unwrap();
        assert_eq!(created.len(), 64);

        execute(
            &db,
            "INSERT INTO t (id, name) VALUES (1, 'Alice'), (2, 'Bob')",
            None,
            OutputFormat::Raw,
        )
        .unwrap();
        let selected =
            execute(&db, "SELECT name FROM t WHERE id = 2", None, OutputFormat::Raw).unwrap();
        assert_eq!(selected, "Bob");
    }

    #[test]
    fn test_execute_with_proof() {
        let db = Database::open_memory();
        execute(&db, "CREATE TABLE t (id int)", None, OutputFormat::Raw).unwrap();
        execute(&db, "INSERT INTO t (id) VALUES (1), (2)", None, OutputFormat::Raw).unwrap();
        let out = execute(&db, "SELECT id FROM t WHERE id = 1", Some(true), OutputFormat::Raw)
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "1");
        assert!(lines[1].starts_with("proof: "));
    }

    #[test]
    fn test_execute_error_message() {
        let db = Database::open_memory();
        let err = execute(&db, "SELECT * FROM ghosts", None, OutputFormat::Table).unwrap_err();
        assert_eq!(err.to_string(), "table not found: ghosts");
    }

    #[test]
    fn test_state_survives_invocations() {
        let temp_dir = TempDir::new().unwrap();
        let config = CliConfig::builder().data_dir(temp_dir.path()).build();
        let server_config: ServerConfig = config.server_config();

        let db = Database::open(&server_config).unwrap();
        execute(&db, "CREATE TABLE t (id int)", None, OutputFormat::Raw).unwrap();
        execute(&db, "INSERT INTO t (id) VALUES (42)", None, OutputFormat::Raw).unwrap();
        drop(db);

        let db = Database::open(&server_config).unwrap();
        let out = execute(&db, "SELECT id FROM t", None, OutputFormat::Raw).unwrap();
        assert_eq!(out, "42");
    }

    #[test]
    fn test_embed() {
        let db = Database::open_memory();
        let out = embed(&db, "hello", OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["embedding"].as_array().unwrap().len(), 384);
    }
}
