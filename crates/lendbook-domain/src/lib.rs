//! Lending domain types and services for lendbook.
//!
//! - **Borrowers**: the borrower record, create/edit payloads, list filters,
//!   a service bound to the `borrowers` table and CSV export
//! - **Tenants**: organizations, user memberships and the directory that
//!   provisions them
//!
//! Everything here goes through [`lendbook_store::RecordStore`], so reads are
//! cached, writes invalidate, and backend calls are retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use lendbook_domain::prelude::*;
//! use lendbook_store::{MemoryBackend, StoreConfig};
//!
//! let service = BorrowerService::new(MemoryBackend::new(), &StoreConfig::default())?;
//! let borrower = service.register(&draft).await?;
//!
//! let active = service
//!     .page(&BorrowerFilters::new().loan_status(LoanStatus::Active), 1, 10)
//!     .await?;
//! let csv = borrowers_to_csv(&active.items)?;
//! ```

pub mod borrower;
pub mod error;
pub mod tenant;

pub use error::{DomainError, DomainResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{DomainError, DomainResult};

    pub use crate::borrower::{
        borrowers_to_csv, export_file_name, Borrower, BorrowerDraft, BorrowerFilters,
        BorrowerPatch, BorrowerService, EmploymentStatus, LoanStatus,
    };

    pub use crate::tenant::{Membership, Role, Tenant, TenantDirectory};
}
