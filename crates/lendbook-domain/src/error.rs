//! Domain error types.

use lendbook_store::StoreError;
use thiserror::Error;

/// Errors that can occur in lending operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A field failed a domain rule.
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A string did not name a known variant.
    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    /// Rendering an export failed.
    #[error("Failed to write CSV: {0}")]
    Export(String),

    /// The record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Check if the underlying record was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
