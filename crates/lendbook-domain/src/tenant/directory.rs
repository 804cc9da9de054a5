//! Tenant provisioning and lookup.

use lendbook_store::{Backend, ListQuery, RecordId, RecordStore, StoreConfig};
use serde::Serialize;

use super::model::{Membership, Role, Tenant};
use crate::error::{DomainError, DomainResult};

/// Backend collection holding tenants.
pub const TENANTS_TABLE: &str = "tenants";

/// Backend collection linking users to tenants.
pub const MEMBERSHIPS_TABLE: &str = "users_tenants";

const WALK_PAGE_SIZE: u32 = 100;

#[derive(Serialize)]
struct NewTenant {
    name: String,
}

#[derive(Serialize)]
struct NewMembership<'a> {
    user_id: &'a str,
    tenant_id: &'a str,
    role: Role,
}

/// Tenants and memberships, each behind its own record store.
pub struct TenantDirectory<B: Backend + Clone> {
    tenants: RecordStore<Tenant, B>,
    memberships: RecordStore<Membership, B>,
}

impl<B: Backend + Clone> TenantDirectory<B> {
    /// Create a directory using `config`'s retry and cache settings.
    pub fn new(backend: B, config: &StoreConfig) -> DomainResult<Self> {
        Ok(Self {
            tenants: RecordStore::new(backend.clone(), config.for_table(TENANTS_TABLE))?,
            memberships: RecordStore::new(backend, config.for_table(MEMBERSHIPS_TABLE))?,
        })
    }

    /// Create a tenant named after `email` and make `user_id` its owner.
    ///
    /// If the membership cannot be written the new tenant is deleted again
    /// and the membership error is returned.
    pub async fn create_for_owner(&self, user_id: &str, email: &str) -> DomainResult<Tenant> {
        if user_id.trim().is_empty() {
            return Err(DomainError::invalid("user_id", "must not be empty"));
        }
        if email.trim().is_empty() {
            return Err(DomainError::invalid("email", "must not be empty"));
        }

        let tenant = self
            .tenants
            .create(&NewTenant {
                name: format!("{}'s Organization", email),
            })
            .await?;

        let membership = NewMembership {
            user_id,
            tenant_id: tenant.id.as_str(),
            role: Role::Owner,
        };
        if let Err(e) = self.memberships.create(&membership).await {
            tracing::warn!(tenant = %tenant.id, error = %e, "Owner assignment failed, removing tenant");
            if let Err(cleanup) = self.tenants.delete(&tenant.id).await {
                tracing::error!(tenant = %tenant.id, error = %cleanup, "Could not remove orphaned tenant");
            }
            return Err(e.into());
        }

        tracing::info!(tenant = %tenant.id, user = user_id, "Created tenant");
        Ok(tenant)
    }

    /// Look up a tenant by id.
    pub async fn tenant(&self, id: &RecordId) -> DomainResult<Tenant> {
        Ok(self.tenants.get_by_id(id).await?)
    }

    /// Every membership of `user_id`.
    pub async fn memberships_for(&self, user_id: &str) -> DomainResult<Vec<Membership>> {
        let mut memberships = Vec::new();
        let mut page_number = 1;
        loop {
            let query = ListQuery::new()
                .page(page_number)
                .limit(WALK_PAGE_SIZE)
                .filter("user_id", user_id);
            let page = self.memberships.list_page(&query).await?;
            let more = page.has_next();
            memberships.extend(page.items);
            if !more {
                break;
            }
            page_number += 1;
        }
        Ok(memberships)
    }

    /// Every tenant `user_id` belongs to, with the membership granting access.
    pub async fn tenants_for(&self, user_id: &str) -> DomainResult<Vec<(Membership, Tenant)>> {
        let mut tenants = Vec::new();
        for membership in self.memberships_for(user_id).await? {
            let tenant = self.tenants.get_by_id(&membership.tenant_id).await?;
            tenants.push((membership, tenant));
        }
        Ok(tenants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lendbook_store::{BackendError, Criteria, MemoryBackend, Range, Rows};
    use serde_json::Value;
    use std::sync::Arc;

    fn directory(backend: Arc<MemoryBackend>) -> TenantDirectory<Arc<MemoryBackend>> {
        TenantDirectory::new(backend, &StoreConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_create_for_owner() {
        let backend = Arc::new(MemoryBackend::new());
        let directory = directory(backend.clone());

        let tenant = directory
            .create_for_owner("user-1", "ada@example.com")
            .await
            .unwrap();

        assert_eq!(tenant.name, "ada@example.com's Organization");
        let memberships = directory.memberships_for("user-1").await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].tenant_id, tenant.id);
        assert_eq!(memberships[0].role, Role::Owner);
    }

    #[tokio::test]
    async fn test_tenants_for_user() {
        let backend = Arc::new(MemoryBackend::new());
        let directory = directory(backend.clone());
        directory.create_for_owner("user-1", "a@example.com").await.unwrap();
        directory.create_for_owner("user-2", "b@example.com").await.unwrap();
        directory.create_for_owner("user-1", "c@example.com").await.unwrap();

        let tenants = directory.tenants_for("user-1").await.unwrap();
        let names: Vec<&str> = tenants.iter().map(|(_, t)| t.name.as_str()).collect();

        assert_eq!(names, vec!["a@example.com's Organization", "c@example.com's Organization"]);
    }

    /// Rejects every insert into the memberships table.
    #[derive(Clone)]
    struct RejectMemberships(Arc<MemoryBackend>);

    #[async_trait]
    impl Backend for RejectMemberships {
        async fn insert_one(&self, table: &str, row: Value) -> Result<Value, BackendError> {
            if table == MEMBERSHIPS_TABLE {
                return Err(BackendError::permanent("permission denied").with_code("42501"));
            }
            self.0.insert_one(table, row).await
        }

        async fn select_by_id(
            &self,
            table: &str,
            id: &RecordId,
        ) -> Result<Option<Value>, BackendError> {
            self.0.select_by_id(table, id).await
        }

        async fn select_range(
            &self,
            table: &str,
            criteria: &Criteria,
            range: Range,
        ) -> Result<Rows, BackendError> {
            self.0.select_range(table, criteria, range).await
        }

        async fn update_by_id(
            &self,
            table: &str,
            id: &RecordId,
            patch: Value,
        ) -> Result<Option<Value>, BackendError> {
            self.0.update_by_id(table, id, patch).await
        }

        async fn delete_by_id(&self, table: &str, id: &RecordId) -> Result<(), BackendError> {
            self.0.delete_by_id(table, id).await
        }
    }

    #[tokio::test]
    async fn test_failed_assignment_removes_tenant() {
        let backend = Arc::new(MemoryBackend::new());
        let directory =
            TenantDirectory::new(RejectMemberships(backend.clone()), &StoreConfig::default())
                .unwrap();

        let err = directory
            .create_for_owner("user-1", "ada@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Database error: permission denied");
        assert_eq!(backend.calls().insert, 1);
        assert_eq!(backend.calls().delete, 1);
        assert!(backend.rows(TENANTS_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_blank_inputs_rejected() {
        let backend = Arc::new(MemoryBackend::new());
        let directory = directory(backend.clone());

        assert!(directory.create_for_owner("", "a@example.com").await.is_err());
        assert!(directory.create_for_owner("user-1", " ").await.is_err());
        assert_eq!(backend.calls().total(), 0);
    }
}
