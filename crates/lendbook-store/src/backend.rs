//! The backend collection boundary.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::{Criteria, Range};
use crate::record::RecordId;

/// Whether a backend failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Unavailability, timeouts, overload. May succeed on retry.
    Transient,
    /// Validation, authorization, constraint violations. Will not succeed on retry.
    Permanent,
}

/// A failure reported by a [`Backend`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    /// Human-readable message.
    pub message: String,
    /// Backend-specific error code, if any.
    pub code: Option<String>,
    /// Retry classification.
    pub kind: FailureKind,
}

impl BackendError {
    /// Create a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            kind: FailureKind::Transient,
        }
    }

    /// Create a permanent error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            kind: FailureKind::Permanent,
        }
    }

    /// Attach a backend error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Check if this failure may succeed on retry.
    pub fn is_transient(&self) -> bool {
        self.kind == FailureKind::Transient
    }
}

/// Rows returned by a range select.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    /// The rows in the requested window.
    pub rows: Vec<Value>,
    /// Total number of rows matching the filters, when the backend reports it.
    pub total: Option<u64>,
}

impl Rows {
    /// Create a result without a total count.
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows, total: None }
    }

    /// Set the total count.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

/// A backend collection API.
///
/// Rows travel as JSON objects. Implementations must not cache.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Insert one row and return it as stored (with generated id and timestamps).
    async fn insert_one(&self, table: &str, row: Value) -> Result<Value, BackendError>;

    /// Select the row whose `id` equals `id`.
    async fn select_by_id(&self, table: &str, id: &RecordId)
        -> Result<Option<Value>, BackendError>;

    /// Select the rows satisfying `criteria`, restricted to `range`.
    async fn select_range(
        &self,
        table: &str,
        criteria: &Criteria,
        range: Range,
    ) -> Result<Rows, BackendError>;

    /// Apply `patch` to the row whose `id` equals `id` and return the updated row.
    async fn update_by_id(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> Result<Option<Value>, BackendError>;

    /// Delete the row whose `id` equals `id`. Deleting a missing row is not an error.
    async fn delete_by_id(&self, table: &str, id: &RecordId) -> Result<(), BackendError>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn insert_one(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        (**self).insert_one(table, row).await
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &RecordId,
    ) -> Result<Option<Value>, BackendError> {
        (**self).select_by_id(table, id).await
    }

    async fn select_range(
        &self,
        table: &str,
        criteria: &Criteria,
        range: Range,
    ) -> Result<Rows, BackendError> {
        (**self).select_range(table, criteria, range).await
    }

    async fn update_by_id(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> Result<Option<Value>, BackendError> {
        (**self).update_by_id(table, id, patch).await
    }

    async fn delete_by_id(&self, table: &str, id: &RecordId) -> Result<(), BackendError> {
        (**self).delete_by_id(table, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_kinds() {
        assert!(BackendError::transient("connection reset").is_transient());
        assert!(!BackendError::permanent("permission denied").is_transient());
    }

    #[test]
    fn test_backend_error_code() {
        let err = BackendError::permanent("duplicate key").with_code("23505");
        assert_eq!(err.code.as_deref(), Some("23505"));
        assert_eq!(err.to_string(), "duplicate key");
    }

    #[test]
    fn test_rows_total() {
        let rows = Rows::new(vec![]).with_total(42);
        assert_eq!(rows.total, Some(42));
    }
}
