//! CLI module for rosterdb
//!
//! Provides command-line interface for:
//! - query: run a query over a records file
//! - explain: describe a query plan
//! - validate: check a query without running it
//! - stats: roster statistics
//! - samples: example queries

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, query, run, run_command, samples, stats, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_records, read_records, write_error, write_response};
