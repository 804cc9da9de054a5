//! Borrower operations over a record store.

use chrono::{DateTime, SecondsFormat, Utc};
use lendbook_store::{Backend, Page, RecordId, RecordStore, StoreConfig};
use serde::Serialize;

use super::filters::BorrowerFilters;
use super::model::{Borrower, BorrowerDraft, BorrowerPatch};
use crate::error::DomainResult;

/// Backend collection holding borrowers.
pub const BORROWERS_TABLE: &str = "borrowers";

/// Page size used when walking every matching borrower.
const WALK_PAGE_SIZE: u32 = 100;

#[derive(Serialize)]
struct NewBorrower<'a> {
    #[serde(flatten)]
    draft: &'a BorrowerDraft,
    registrationdate: String,
}

/// Borrower operations bound to the `borrowers` table.
pub struct BorrowerService<B: Backend> {
    store: RecordStore<Borrower, B>,
}

impl<B: Backend> BorrowerService<B> {
    /// Create a service using `config`'s retry and cache settings.
    ///
    /// The table name in `config` is ignored.
    pub fn new(backend: B, config: &StoreConfig) -> DomainResult<Self> {
        let store = RecordStore::new(backend, config.for_table(BORROWERS_TABLE))?;
        Ok(Self { store })
    }

    /// The underlying record store.
    pub fn store(&self) -> &RecordStore<Borrower, B> {
        &self.store
    }

    /// Register a borrower, stamping the registration date with the current time.
    pub async fn register(&self, draft: &BorrowerDraft) -> DomainResult<Borrower> {
        self.register_at(draft, Utc::now()).await
    }

    /// Register a borrower with an explicit registration time.
    pub async fn register_at(
        &self,
        draft: &BorrowerDraft,
        registered: DateTime<Utc>,
    ) -> DomainResult<Borrower> {
        draft.validate()?;
        let payload = NewBorrower {
            draft,
            registrationdate: registered.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let borrower = self.store.create(&payload).await?;
        tracing::info!(id = %borrower.id, "Registered borrower");
        Ok(borrower)
    }

    /// Look up a borrower by id.
    pub async fn find(&self, id: &RecordId) -> DomainResult<Borrower> {
        Ok(self.store.get_by_id(id).await?)
    }

    /// Apply a partial update.
    pub async fn edit(&self, id: &RecordId, patch: &BorrowerPatch) -> DomainResult<Borrower> {
        patch.validate()?;
        Ok(self.store.update(id, patch).await?)
    }

    /// Delete a borrower.
    pub async fn remove(&self, id: &RecordId) -> DomainResult<()> {
        self.store.delete(id).await?;
        tracing::info!(%id, "Removed borrower");
        Ok(())
    }

    /// One page of borrowers matching `filters`, with the total match count.
    pub async fn page(
        &self,
        filters: &BorrowerFilters,
        page: u32,
        limit: u32,
    ) -> DomainResult<Page<Borrower>> {
        filters.validate()?;
        let criteria = filters.to_criteria();
        Ok(self.store.list_page_where(&criteria, page, limit).await?)
    }

    /// Every borrower matching `filters`, fetched page by page.
    pub async fn all(&self, filters: &BorrowerFilters) -> DomainResult<Vec<Borrower>> {
        let mut borrowers = Vec::new();
        let mut page_number = 1;
        loop {
            let page = self.page(filters, page_number, WALK_PAGE_SIZE).await?;
            let more = page.has_next();
            borrowers.extend(page.items);
            if !more {
                break;
            }
            page_number += 1;
        }
        Ok(borrowers)
    }

    /// Drop every cached borrower.
    pub fn clear_cache(&self) {
        self.store.clear_cache();
    }
}
