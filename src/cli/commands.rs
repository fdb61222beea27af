//! CLI command implementations
//!
//! Each command returns the `data` payload of its response; `run_command`
//! wraps it in the stdout envelope.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::Config;
use crate::engine::QueryEngine;
use crate::observability::Logger;
use crate::planner::{self, ExplainPlan};
use crate::store::stats::{calculate_statistics, course_statistics, top_performers};
use crate::store::RecordStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_query, read_records, write_error, write_response};

/// Parse arguments and run the requested command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and write its response to stdout
pub fn run_command(cmd: Command) -> CliResult<()> {
    let outcome = match cmd {
        Command::Query {
            data,
            config,
            query: text,
        } => query(&data, config.as_deref(), text),
        Command::Explain {
            data,
            config,
            query: text,
        } => explain(data.as_deref(), config.as_deref(), text),
        Command::Validate { query: text } => validate(text),
        Command::Stats { data, config, top } => stats(&data, config.as_deref(), top),
        Command::Samples => Ok(samples()),
    };

    match outcome {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Loads the configuration (defaults when no path) and applies its log level
fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    Logger::set_min_severity(config.log_severity()?);
    Ok(config)
}

/// Builds a store from a records file, skipping duplicate or keyless records
fn load_store(config: &Config, data: &Path) -> CliResult<RecordStore> {
    let records = read_records(data)?;
    let mut store = config.store();
    let summary = store.import(records);

    Logger::info(
        "RECORDS_LOADED",
        &[
            ("imported", &summary.imported.to_string()),
            ("path", &data.display().to_string()),
            ("skipped", &summary.skipped.to_string()),
        ],
    );
    Ok(store)
}

fn query_text(text: Option<String>) -> CliResult<String> {
    match text {
        Some(t) => Ok(t),
        None => read_query(),
    }
}

/// Execute a single query and return its result
pub fn query(data: &Path, config_path: Option<&Path>, text: Option<String>) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let store = load_store(&config, data)?;
    let text = query_text(text)?;

    let mut engine = QueryEngine::new(&store, config.resolver());
    if config.strict_fields {
        engine = engine.strict();
    }

    let result = engine.query(&text)?;
    Ok(serde_json::to_value(&result)?)
}

/// Describe a query without running it.
///
/// A rejected query is reported in the payload, not as a command failure.
/// With `strict_fields` set, field names are checked against the records
/// in `data` and the derived fields, so `data` is required.
pub fn explain(
    data: Option<&Path>,
    config_path: Option<&Path>,
    text: Option<String>,
) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let text = query_text(text)?;

    let parsed = if config.strict_fields {
        let data = data.ok_or_else(|| {
            CliError::config_error("strict_fields is set: explain needs --data to check field names")
        })?;
        let store = load_store(&config, data)?;
        let engine = QueryEngine::new(&store, config.resolver()).strict();
        engine.parse(&text)
    } else {
        planner::parse(&text)
    };

    let plan = match parsed {
        Ok(plan) => ExplainPlan::from_plan(&plan),
        Err(e) => ExplainPlan::from_error(&e),
    };
    Ok(serde_json::to_value(&plan)?)
}

/// Check that a query is a read-only SELECT that parses
pub fn validate(text: Option<String>) -> CliResult<Value> {
    let text = query_text(text)?;
    let plan = planner::validate(&text)?;
    Ok(json!({
        "valid": true,
        "plan": ExplainPlan::from_plan(&plan),
    }))
}

/// Roster statistics, per-course summary and top performers
pub fn stats(data: &Path, config_path: Option<&Path>, top: usize) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let store = load_store(&config, data)?;
    let records: Vec<_> = store.iter().cloned().collect();

    Ok(json!({
        "statistics": calculate_statistics(&records, &config.average_source, &config.count_source),
        "courses": course_statistics(
            &records,
            &config.average_source,
            &config.count_source,
            &["name", config.key_field.as_str()],
        ),
        "top_performers": top_performers(&records, &config.average_source, top),
    }))
}

/// Example queries
pub fn samples() -> Value {
    json!(planner::sample_queries())
}
