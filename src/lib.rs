//! rosterdb - SQL-like queries over an in-memory record store
//!
//! - `store`: ordered records with a unique key, undo history, statistics
//! - `planner`: query text to immutable plans
//! - `executor`: filter, group, sort, limit and project over a snapshot
//! - `engine`: parse and execute with a single boundary error

pub mod cli;
pub mod config;
pub mod engine;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod store;

pub use engine::QueryEngine;
pub use executor::{ExecutionError, ExecutionResult, FieldResolver, RecordSource};
pub use planner::{parse, QueryPlan, SyntaxError};
pub use store::{FieldValue, Record, RecordStore};
