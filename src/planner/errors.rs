//! Planner error types
//!
//! Every parse failure is a syntax error and rejects the query.
//!
//! Error codes:
//! - ROSTER_QUERY_SYNTAX (REJECT)
//! - ROSTER_QUERY_LIMIT (REJECT)
//! - ROSTER_QUERY_UNKNOWN_FIELD (REJECT)
//! - ROSTER_QUERY_UNSUPPORTED (REJECT)

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Malformed query text
    RosterQuerySyntax,
    /// LIMIT is not a non-negative integer
    RosterQueryLimit,
    /// Field is not in the catalog (strict mode only)
    RosterQueryUnknownField,
    /// Statement other than SELECT
    RosterQueryUnsupported,
}

impl PlannerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::RosterQuerySyntax => "ROSTER_QUERY_SYNTAX",
            PlannerErrorCode::RosterQueryLimit => "ROSTER_QUERY_LIMIT",
            PlannerErrorCode::RosterQueryUnknownField => "ROSTER_QUERY_UNKNOWN_FIELD",
            PlannerErrorCode::RosterQueryUnsupported => "ROSTER_QUERY_UNSUPPORTED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query syntax error with context
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    field: Option<String>,
}

/// The single error kind raised while parsing
pub type SyntaxError = PlannerError;

impl PlannerError {
    /// Create a syntax error
    pub fn syntax(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::RosterQuerySyntax,
            message: reason.into(),
            field: None,
        }
    }

    /// Create a syntax error about a specific field
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::RosterQuerySyntax,
            message: reason.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid limit error
    pub fn invalid_limit(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::RosterQueryLimit,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: PlannerErrorCode::RosterQueryUnknownField,
            message: format!("Unknown field '{}'", f),
            field: Some(f),
        }
    }

    /// Create an unsupported statement error
    pub fn unsupported(keyword: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::RosterQueryUnsupported,
            message: format!("Unsupported operation: {}", keyword.into()),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
