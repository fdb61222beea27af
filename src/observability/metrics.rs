//! Query metrics registry
//!
//! - Counters only, monotonic
//! - Reset only when the registry is created
//! - Atomic so an engine can be shared by reference

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for the query engine
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Queries that produced a result
    queries_executed: AtomicU64,
    /// Queries refused by the parser
    queries_rejected: AtomicU64,
    /// Queries that failed during execution
    execution_failures: AtomicU64,
    /// Records read from snapshots
    records_scanned: AtomicU64,
    /// Rows or groups handed back to callers
    rows_returned: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_execution_failures(&self) {
        self.execution_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_scanned(&self, count: u64) {
        self.records_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_rows_returned(&self, count: u64) {
        self.rows_returned.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            execution_failures: self.execution_failures.load(Ordering::Relaxed),
            records_scanned: self.records_scanned.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub execution_failures: u64,
    pub records_scanned: u64,
    pub rows_returned: u64,
}
