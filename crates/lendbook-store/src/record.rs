//! Record identity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Opaque identifier of one row in a backend collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create an ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A row shape that can be stored through a [`RecordStore`](crate::RecordStore).
///
/// Only the identifier is required. Timestamps are assigned by the backend
/// and are optional on the Rust side.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The unique identifier of this record.
    fn id(&self) -> &RecordId;

    /// When the backend created this record, if known.
    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// When the backend last updated this record, if known.
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}
