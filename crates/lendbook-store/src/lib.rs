//! Typed record store accessor for lendbook.
//!
//! A [`RecordStore`] is bound to one backend collection and one record shape.
//! It provides create/read/update/delete/list operations, each wrapped in a
//! [`RetryPolicy`], with a read-through time-bounded cache keyed by record id.
//!
//! # Example
//!
//! ```rust,ignore
//! use lendbook_store::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Borrower {
//!     id: RecordId,
//!     name: String,
//!     funds: i64,
//! }
//!
//! impl Record for Borrower {
//!     fn id(&self) -> &RecordId {
//!         &self.id
//!     }
//! }
//!
//! let store: RecordStore<Borrower, _> =
//!     RecordStore::new(MemoryBackend::new(), StoreConfig::new("borrowers"))?;
//!
//! let created = store.create(&serde_json::json!({ "name": "A", "funds": 100 })).await?;
//! let fetched = store.get_by_id(&created.id).await?;
//!
//! let second_page = store.list(&ListQuery::new().page(2).limit(10)).await?;
//! ```

mod backend;
mod cache;
mod config;
mod error;
mod memory;
mod query;
mod record;
mod retry;
mod store;

pub use backend::{Backend, BackendError, FailureKind, Rows};
pub use cache::{RecordCache, DEFAULT_CACHE_TTL};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::{CallCounts, MemoryBackend};
pub use query::{Bound, Comparison, Criteria, Filters, ListQuery, Page, Range, TextSearch};
pub use record::{Record, RecordId};
pub use retry::{BackoffKind, BackoffStrategy, RetryMode, RetryPolicy};
pub use store::RecordStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Backend, BackendError, Bound, Criteria, FailureKind, Filters, ListQuery, MemoryBackend,
        Page, Record, RecordId, RecordStore, RetryMode, RetryPolicy, StoreConfig, StoreError,
        StoreResult, TextSearch,
    };
}
