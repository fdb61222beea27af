//! JSON I/O handling for CLI
//!
//! - Input: records file (JSON array), query text from argv or stdin
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::Value;

use crate::store::Record;

use super::errors::{CliError, CliResult};

/// Read one line of query text from stdin
pub fn read_query() -> CliResult<String> {
    let stdin = io::stdin();
    let mut line = String::new();

    stdin.lock().read_line(&mut line)?;

    let query = line.trim();
    if query.is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(query.to_string())
}

/// Read a records file: a JSON array of objects
pub fn read_records(path: &Path) -> CliResult<Vec<Record>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_records(&content)
}

/// Parse records from JSON text
pub fn parse_records(content: &str) -> CliResult<Vec<Record>> {
    serde_json::from_str(content)
        .map_err(|e| CliError::data_error(format!("Expected a JSON array of records: {}", e)))
}

/// Success envelope
pub fn ok_envelope(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

/// Error envelope
pub fn error_envelope(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&ok_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&error_envelope(code, message))
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
