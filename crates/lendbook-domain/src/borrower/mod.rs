//! Borrower module.
//!
//! Contains the borrower record, its payloads and filters, the service bound
//! to the `borrowers` table, and CSV export.

mod export;
mod filters;
mod model;
mod service;

pub use export::{borrowers_to_csv, export_file_name, CSV_HEADERS};
pub use filters::{BorrowerFilters, SEARCH_FIELDS};
pub use model::{Borrower, BorrowerDraft, BorrowerPatch, EmploymentStatus, LoanStatus};
pub use service::{BorrowerService, BORROWERS_TABLE};
