//! Query executor
//!
//! Runs a plan over a snapshot in strict order:
//!
//! 1. Filter (full scan)
//! 2. Group, which ends the pipeline when present
//! 3. Sort
//! 4. Limit
//! 5. Project
//!
//! The executor never mutates the records it is given.

use std::sync::Arc;

use crate::planner::{Projection, QueryPlan};
use crate::store::{FieldValue, Record};

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::PredicateFilter;
use super::grouper::Grouper;
use super::resolver::FieldResolver;
use super::result::{ExecutionResult, QueryOutput};
use super::sorter::ResultSorter;

/// Anything that can hand the executor a point-in-time view of its records
pub trait RecordSource {
    fn snapshot(&self) -> Vec<Arc<Record>>;
}

impl RecordSource for [Arc<Record>] {
    fn snapshot(&self) -> Vec<Arc<Record>> {
        self.to_vec()
    }
}

impl RecordSource for Vec<Arc<Record>> {
    fn snapshot(&self) -> Vec<Arc<Record>> {
        self.clone()
    }
}

/// Query executor bound to a field resolver
pub struct QueryExecutor<'a> {
    resolver: &'a FieldResolver,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(resolver: &'a FieldResolver) -> Self {
        Self { resolver }
    }

    /// Executes `plan` over `records`.
    pub fn execute(
        &self,
        plan: &QueryPlan,
        records: &[Arc<Record>],
    ) -> ExecutorResult<ExecutionResult> {
        let scanned_count = records.len();

        let mut matched = Vec::with_capacity(records.len());
        for record in records {
            let keep = match &plan.predicate {
                Some(predicate) => PredicateFilter::evaluate(record, predicate, self.resolver)?,
                None => true,
            };
            if keep {
                matched.push(Arc::clone(record));
            }
        }
        let matched_count = matched.len();

        if let Some(field) = &plan.group_by {
            let groups = Grouper::group(matched, field, self.resolver)?;
            return Ok(ExecutionResult {
                returned_count: groups.len(),
                output: QueryOutput::Groups(groups),
                scanned_count,
                matched_count,
                limit_applied: false,
            });
        }

        let mut rows = ResultSorter::sort(matched, &plan.sort, self.resolver)?;

        let mut limit_applied = false;
        if let Some(limit) = plan.limit {
            let limit = usize::try_from(limit).map_err(|_| {
                ExecutorError::execution_failed(format!("LIMIT {} exceeds addressable rows", limit))
            })?;
            if rows.len() > limit {
                rows.truncate(limit);
                limit_applied = true;
            }
        }

        if let Projection::Fields(fields) = &plan.projection {
            rows = rows
                .iter()
                .map(|record| self.project(record, fields).map(Arc::new))
                .collect::<ExecutorResult<Vec<_>>>()?;
        }

        Ok(ExecutionResult {
            returned_count: rows.len(),
            output: QueryOutput::Rows(rows),
            scanned_count,
            matched_count,
            limit_applied,
        })
    }

    /// New record holding exactly `fields`; missing values become null
    fn project(&self, record: &Record, fields: &[String]) -> ExecutorResult<Record> {
        let mut projected = Record::new();
        for field in fields {
            let value = self
                .resolver
                .resolve(record, field)?
                .unwrap_or(FieldValue::Null);
            projected.set(field.clone(), value);
        }
        Ok(projected)
    }
}
