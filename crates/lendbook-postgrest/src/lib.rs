//! REST backend for the managed Postgres service behind lendbook.
//!
//! [`PostgrestBackend`] implements [`lendbook_store::Backend`] on top of the
//! service's auto-generated REST API (`{url}/rest/v1/{table}`), speaking the
//! PostgREST query dialect: `col=eq.value` filters, `gte`/`lte` bounds, an
//! `or=(...ilike...)` text search, `offset`/`limit` windows,
//! `Prefer: return=representation` for writes and `Prefer: count=exact` for
//! totals.
//!
//! # Example
//!
//! ```rust,ignore
//! use lendbook_postgrest::{PostgrestBackend, PostgrestConfig};
//! use lendbook_store::{RecordStore, StoreConfig};
//!
//! let backend = PostgrestBackend::new(&PostgrestConfig::new(
//!     "https://project.example.co",
//!     "anon-key",
//! ))?;
//! let borrowers: RecordStore<Borrower, _> =
//!     RecordStore::new(backend, StoreConfig::new("borrowers"))?;
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::PostgrestBackend;
pub use config::PostgrestConfig;
pub use error::PostgrestError;
pub use request::{bound_value, filter_value, search_clause, TableRequest};
pub use response::{classify_status, parse_content_range, ErrorBody};
