//! Tenant module.
//!
//! Organizations that own borrower data, the users belonging to them, and
//! the directory that provisions both.

mod directory;
mod model;

pub use directory::{TenantDirectory, MEMBERSHIPS_TABLE, TENANTS_TABLE};
pub use model::{Membership, Role, Tenant};
