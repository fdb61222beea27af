//! Executor error types
//!
//! Callers of the engine see this single error type; syntax errors are
//! folded in at the boundary.
//!
//! Error codes:
//! - ROSTER_EXECUTION_FAILED (ERROR)
//! - ROSTER_EXECUTION_TYPE_MISMATCH (ERROR)
//! - ROSTER_EXECUTION_REJECTED (ERROR)

use std::fmt;

use crate::planner::PlannerError;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query failed; nothing else is affected
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Executor error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// General execution failure
    RosterExecutionFailed,
    /// A derived field met a value of the wrong shape
    RosterExecutionTypeMismatch,
    /// Query text was rejected by the parser
    RosterExecutionRejected,
}

impl ExecutorErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::RosterExecutionFailed => "ROSTER_EXECUTION_FAILED",
            ExecutorErrorCode::RosterExecutionTypeMismatch => "ROSTER_EXECUTION_TYPE_MISMATCH",
            ExecutorErrorCode::RosterExecutionRejected => "ROSTER_EXECUTION_REJECTED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug, Clone)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    field: Option<String>,
    /// Parser error this one wraps
    source: Option<PlannerError>,
}

/// The single error kind raised at the engine boundary
pub type ExecutionError = ExecutorError;

impl ExecutorError {
    /// Create an execution failed error
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::RosterExecutionFailed,
            message: reason.into(),
            field: None,
            source: None,
        }
    }

    /// Create a type mismatch error for `field`
    pub fn type_mismatch(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: ExecutorErrorCode::RosterExecutionTypeMismatch,
            message: format!("Field '{}': {}", f, reason.into()),
            field: Some(f),
            source: None,
        }
    }

    /// Wrap a parser error
    pub fn rejected(err: PlannerError) -> Self {
        Self {
            code: ExecutorErrorCode::RosterExecutionRejected,
            message: format!("Query rejected: {}", err.message()),
            field: err.field().map(str::to_string),
            source: Some(err),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the wrapped parser error, if any
    pub fn syntax_error(&self) -> Option<&PlannerError> {
        self.source.as_ref()
    }

    /// Returns true if the query never reached execution
    pub fn is_rejection(&self) -> bool {
        self.code == ExecutorErrorCode::RosterExecutionRejected
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<PlannerError> for ExecutorError {
    fn from(err: PlannerError) -> Self {
        Self::rejected(err)
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
