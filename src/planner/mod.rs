//! Query Parser subsystem
//!
//! Turns SQL-like query text into an immutable [`QueryPlan`].
//!
//! # Design Principles
//!
//! - Deterministic: same text → same plan or same error
//! - Strict: malformed input fails the whole query with a syntax error
//! - Explicit: clause order is fixed, no guessing
//!
//! # Known limitations
//!
//! - No parentheses in WHERE; AND binds tighter than OR
//! - A single collection; `FROM <name>` is accepted and ignored

mod ast;
mod catalog;
mod errors;
mod explain;
mod parser;

pub use ast::{Condition, FilterOp, Predicate, Projection, QueryPlan, SortDirection, SortSpec};
pub use catalog::FieldCatalog;
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity, SyntaxError};
pub use explain::ExplainPlan;
pub use parser::{parse, sample_queries, validate, QueryParser};
