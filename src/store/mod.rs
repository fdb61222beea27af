//! Record Store subsystem
//!
//! Holds the ordered record sequence the query engine reads from.
//!
//! # Rules
//!
//! - At most one record per key value
//! - Records are never mutated in place; updates replace them wholesale
//! - Every mutation is recorded in a bounded history and can be undone
//! - The engine only ever sees a snapshot

mod errors;
mod history;
mod record;
pub mod stats;
mod store;

pub use errors::{StoreError, StoreResult};
pub use history::{HistoryEntry, Operation, OperationHistory};
pub use record::{FieldValue, Record};
pub use store::{ImportSummary, RecordStore};
