//! Store error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::record::RecordId;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by [`RecordStore`](crate::RecordStore) operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Payload rejected before any backend contact.
    #[error("Invalid data provided: {0}")]
    Validation(String),

    /// The backend reported a failure. Only the message survives.
    #[error("Database error: {0}")]
    Database(String),

    /// No row with this id exists in the collection.
    #[error("Record not found in {table}: {id}")]
    NotFound { table: String, id: RecordId },

    /// A backend row could not be decoded into the record type.
    #[error("Failed to decode record: {0}")]
    Decode(String),

    /// The store configuration is unusable.
    #[error("Invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Check if this error came from the backend.
    pub fn is_database(&self) -> bool {
        matches!(self, StoreError::Database(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<BackendError> for StoreError {
    fn from(e: BackendError) -> Self {
        StoreError::Database(e.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_keeps_only_message() {
        let backend = BackendError::permanent("permission denied for table borrowers")
            .with_code("42501");
        let err = StoreError::from(backend);
        assert_eq!(
            err.to_string(),
            "Database error: permission denied for table borrowers"
        );
        assert!(err.is_database());
    }

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound {
            table: "borrowers".to_string(),
            id: RecordId::new("b-1"),
        };
        assert_eq!(err.to_string(), "Record not found in borrowers: b-1");
        assert!(err.is_not_found());
    }
}
