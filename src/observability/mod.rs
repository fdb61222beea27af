//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Query counters
//!
//! Observability is read-only: it never changes query results.
//!
//! ```ignore
//! use rosterdb::observability::{Logger, MetricsRegistry};
//!
//! Logger::info("QUERY_EXECUTED", &[("rows", "42")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//! ```

mod logger;
mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
