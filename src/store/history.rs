//! Bounded operation history
//!
//! Every store mutation is recorded so it can be listed and undone.
//! When the stack is full the oldest entry is dropped.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::record::Record;

/// A recorded store mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Insert {
        key: String,
        record: Arc<Record>,
    },
    Update {
        key: String,
        previous: Arc<Record>,
        replacement: Arc<Record>,
    },
    Delete {
        key: String,
        record: Arc<Record>,
        /// Position the record held before deletion
        position: usize,
    },
}

impl Operation {
    /// Action name for listings and logs
    pub fn action(&self) -> &'static str {
        match self {
            Operation::Insert { .. } => "insert",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
        }
    }

    /// Key of the affected record
    pub fn key(&self) -> &str {
        match self {
            Operation::Insert { key, .. }
            | Operation::Update { key, .. }
            | Operation::Delete { key, .. } => key,
        }
    }
}

/// One history entry
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
}

/// Bounded LIFO stack of operations
#[derive(Debug, Clone)]
pub struct OperationHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl OperationHistory {
    /// Creates an empty history holding at most `capacity` entries.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes an operation, evicting the oldest entry when full
    pub fn push(&mut self, operation: Operation) -> &HistoryEntry {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            operation,
        });
        // Just pushed, never empty here.
        &self.entries[self.entries.len() - 1]
    }

    /// Removes and returns the newest entry
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    /// Puts a popped entry back on top, keeping its id and timestamp
    pub fn restore(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Newest entry without removing it
    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Up to `limit` entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
