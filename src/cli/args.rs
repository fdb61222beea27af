//! CLI argument definitions using clap
//!
//! Commands:
//! - rosterdb query --data <path> [--config <path>] [QUERY]
//! - rosterdb explain [--data <path>] [--config <path>] [QUERY]
//! - rosterdb validate [QUERY]
//! - rosterdb stats --data <path> [--config <path>] [--top <n>]
//! - rosterdb samples
//!
//! A missing QUERY is read as one line from stdin.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rosterdb - SQL-like queries over in-memory student records
#[derive(Parser, Debug)]
#[command(name = "rosterdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a query against a JSON array of records
    Query {
        /// Path to the records file
        #[arg(long)]
        data: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Query text
        query: Option<String>,
    },

    /// Describe how a query would run
    Explain {
        /// Records file whose field names are checked when the config
        /// sets strict_fields (required in that case)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Query text
        query: Option<String>,
    },

    /// Check that a query is a well-formed, read-only SELECT
    Validate {
        /// Query text
        query: Option<String>,
    },

    /// Summary statistics over a records file
    Stats {
        /// Path to the records file
        #[arg(long)]
        data: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of top performers to list
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// List example queries
    Samples,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
