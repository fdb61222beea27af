//! # Store Errors
//!
//! Error types for record store mutations.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Another record already holds this key
    #[error("Duplicate key '{key}' for field '{field}'")]
    DuplicateKey { field: String, key: String },

    /// Record has no usable value for the key field
    #[error("Record is missing key field '{0}'")]
    MissingKey(String),

    /// No record with this key
    #[error("No record with key '{0}'")]
    NotFound(String),

    /// History stack is empty
    #[error("No operations to undo")]
    NothingToUndo,
}

impl StoreError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateKey { .. } => "ROSTER_STORE_DUPLICATE_KEY",
            StoreError::MissingKey(_) => "ROSTER_STORE_MISSING_KEY",
            StoreError::NotFound(_) => "ROSTER_STORE_NOT_FOUND",
            StoreError::NothingToUndo => "ROSTER_STORE_NOTHING_TO_UNDO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::DuplicateKey {
            field: "roll_no".into(),
            key: "A1".into(),
        };
        assert_eq!(err.to_string(), "Duplicate key 'A1' for field 'roll_no'");
        assert_eq!(err.code(), "ROSTER_STORE_DUPLICATE_KEY");
    }
}
