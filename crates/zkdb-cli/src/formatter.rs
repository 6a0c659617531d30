//! Output formatting for statement results.
//!
//! Supports table, JSON, and raw output formats.

use std::str::FromStr;

use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{json, Value as JsonValue};
use zkdb_common::Row;
use zkdb_proof::ProofOutcome;
use zkdb_sql::{QueryResult, StatementOutput};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output.
    Table,
    /// JSON output.
    Json,
    /// Raw output (values separated by tabs).
    Raw,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "raw" => Ok(OutputFormat::Raw),
            other => Err(format!(
                "Unknown format '{}'. Available: table, json, raw",
                other
            )),
        }
    }
}

/// Formats a statement's output according to the specified format.
pub fn format_output(output: &StatementOutput, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(output),
        OutputFormat::Json => format_json(output),
        OutputFormat::Raw => format_raw(output),
    }
}

/// Formats an embedding vector.
pub fn format_embedding(embedding: &[f64], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json!({ "embedding": embedding }).to_string(),
        OutputFormat::Table | OutputFormat::Raw => zkdb_common::format_vector(embedding),
    }
}

/// Formats the result as a table.
fn format_table(output: &StatementOutput) -> String {
    let mut lines = Vec::new();

    if let Some(commit) = &output.commit {
        lines.push(format!("OK (sequence {})", commit.sequence_address));
    } else {
        let mut table = Table::new();
        table
            .set_content_arrangement(ContentArrangement::Dynamic)
            .load_preset(comfy_table::presets::UTF8_FULL)
            .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

        match &output.result {
            QueryResult::Rows(rows) => {
                table.set_header(output.columns.iter().map(Cell::new));
                for row in rows {
                    table.add_row(row_cells(row));
                }
            }
            QueryResult::Groups(groups) => {
                let header = std::iter::once("group".to_string()).chain(output.columns.clone());
                table.set_header(header.map(Cell::new));
                for (i, group) in groups.iter().enumerate() {
                    for row in group {
                        let mut cells = vec![Cell::new(i + 1)];
                        cells.extend(row_cells(row));
                        table.add_row(cells);
                    }
                }
            }
        }
        lines.push(table.to_string());
        lines.push(format!("({} {})", output.result.len(), noun(&output.result)));
    }

    if let Some(proof) = &output.proof {
        lines.push(proof_summary(proof));
    }
    lines.join("\n")
}

fn row_cells(row: &Row) -> Vec<Cell> {
    row.iter().map(|v| Cell::new(v.to_string())).collect()
}

fn noun(result: &QueryResult) -> &'static str {
    match (result, result.len()) {
        (QueryResult::Groups(_), 1) => "group",
        (QueryResult::Groups(_), _) => "groups",
        (QueryResult::Rows(_), 1) => "row",
        (QueryResult::Rows(_), _) => "rows",
    }
}

fn proof_summary(proof: &ProofOutcome) -> String {
    match proof {
        ProofOutcome::Proven { circuit, proof } => format!(
            "proof: {} ({} byte circuit)",
            proof.to_hex(),
            circuit.to_bytes().len()
        ),
        ProofOutcome::Failed { reason } => format!("proof failed: {}", reason),
    }
}

/// Formats the result as JSON, mirroring the HTTP query response.
fn format_json(output: &StatementOutput) -> String {
    let mut body = serde_json::Map::new();
    body.insert("columns".to_string(), json!(output.columns));
    body.insert("result".to_string(), output.result.to_json());
    if let Some(commit) = &output.commit {
        body.insert(
            "sequence_cid".to_string(),
            JsonValue::String(commit.sequence_address.to_string()),
        );
    }
    match &output.proof {
        Some(ProofOutcome::Proven { circuit, proof }) => {
            body.insert("circuit".to_string(), JsonValue::String(circuit.to_hex()));
            body.insert("proof".to_string(), JsonValue::String(proof.to_hex()));
        }
        Some(ProofOutcome::Failed { reason }) => {
            body.insert("proof_error".to_string(), JsonValue::String(reason.clone()));
        }
        None => {}
    }
    serde_json::to_string_pretty(&JsonValue::Object(body)).unwrap_or_else(|_| "{}".to_string())
}

/// Formats the result as raw tab-separated values, one row per line.
fn format_raw(output: &StatementOutput) -> String {
    let mut lines = Vec::new();
    if let Some(commit) = &output.commit {
        lines.push(commit.sequence_address.to_string());
    }
    for row in output.result.rows() {
        let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        lines.push(values.join("\t"));
    }
    if let Some(proof) = &output.proof {
        lines.push(proof_summary(proof));
    }
    lines.join("\n")
}
