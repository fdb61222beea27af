//! Query executor subsystem
//!
//! Consumes parsed plans and produces deterministic results over a snapshot.
//!
//! # Execution Flow (strict order)
//!
//! 1. Filter every record through the predicate tree
//! 2. Group (terminal when present)
//! 3. Sort with a stable composite comparator
//! 4. Apply limit
//! 5. Project the requested fields
//!
//! Derived fields (`avg_grade`, `course_count` by default) are resolved
//! through a [`FieldResolver`] table.

mod errors;
mod executor;
mod filters;
mod grouper;
mod resolver;
mod result;
mod sorter;

pub use errors::{ExecutionError, ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use executor::{QueryExecutor, RecordSource};
pub use filters::PredicateFilter;
pub use grouper::{GroupResult, Grouper, NULL_GROUP};
pub use resolver::{Accessor, FieldResolver};
pub use result::{ExecutionResult, QueryOutput};
pub use sorter::ResultSorter;
