//! Result types for query execution

use std::sync::Arc;

use serde::Serialize;

use crate::store::Record;

use super::grouper::GroupResult;

/// Rows of a plain query, or groups of a GROUP BY query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Rows(Vec<Arc<Record>>),
    Groups(Vec<GroupResult>),
}

impl QueryOutput {
    /// Number of rows or groups
    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Rows(rows) => rows.len(),
            QueryOutput::Groups(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of query execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Rows or groups in result order
    pub output: QueryOutput,
    /// Number of records scanned
    pub scanned_count: usize,
    /// Number of records that passed the filter
    pub matched_count: usize,
    /// Number of rows or groups returned
    pub returned_count: usize,
    /// Whether the limit cut rows
    pub limit_applied: bool,
}

impl ExecutionResult {
    /// Result rows; `None` for a grouped query
    pub fn rows(&self) -> Option<&[Arc<Record>]> {
        match &self.output {
            QueryOutput::Rows(rows) => Some(rows),
            QueryOutput::Groups(_) => None,
        }
    }

    /// Result groups; `None` for an ungrouped query
    pub fn groups(&self) -> Option<&[GroupResult]> {
        match &self.output {
            QueryOutput::Groups(groups) => Some(groups),
            QueryOutput::Rows(_) => None,
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self.output, QueryOutput::Groups(_))
    }
}
