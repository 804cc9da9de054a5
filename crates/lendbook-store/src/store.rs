//! The typed record store accessor.

use serde::Serialize;
use serde_json::Value;

use crate::backend::Backend;
use crate::cache::RecordCache;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::query::{page_range, Criteria, ListQuery, Page};
use crate::record::{Record, RecordId};
use crate::retry::RetryPolicy;

/// Retrying, cached access to one backend collection.
///
/// Every backend call goes through the configured [`RetryPolicy`]. Reads by id
/// are served from a per-instance cache while the snapshot is younger than the
/// TTL; updates and deletes drop the snapshot. Lists are never cached.
///
/// Concurrent cold reads of the same id are not coalesced: each caller that
/// misses the cache issues its own backend call.
pub struct RecordStore<T: Record, B: Backend> {
    backend: B,
    table: String,
    retry: RetryPolicy,
    cache: RecordCache<T>,
}

impl<T: Record, B: Backend> RecordStore<T, B> {
    /// Create an accessor for `config.table` on `backend`.
    pub fn new(backend: B, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            retry: config.retry_policy(),
            cache: RecordCache::new(config.cache_ttl()),
            table: config.table,
        })
    }

    /// The collection this accessor is bound to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The retry policy applied to every backend call.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Create a record from `payload` and return it as stored.
    ///
    /// The payload must serialize to a JSON object without the id or
    /// timestamps; the backend assigns those. The new record is not cached.
    pub async fn create<P>(&self, payload: &P) -> StoreResult<T>
    where
        P: Serialize + ?Sized,
    {
        let row = to_object(payload)?;
        let created = self
            .retry
            .run("create", || self.backend.insert_one(&self.table, row.clone()))
            .await?;

        let record: T = decode(created)?;
        tracing::debug!(table = %self.table, id = %record.id(), "record created");
        Ok(record)
    }

    /// Get a record by id, from the cache when a live snapshot exists.
    pub async fn get_by_id(&self, id: &RecordId) -> StoreResult<T> {
        if let Some(record) = self.cache.get(id) {
            tracing::debug!(table = %self.table, %id, "cache hit");
            return Ok(record);
        }
        tracing::debug!(table = %self.table, %id, "cache miss");

        let row = self
            .retry
            .run("get_by_id", || self.backend.select_by_id(&self.table, id))
            .await?
            .ok_or_else(|| self.not_found(id))?;

        let record: T = decode(row)?;
        self.cache.insert(id.clone(), record.clone());
        Ok(record)
    }

    /// Apply a partial `patch` to a record and return the updated record.
    ///
    /// The cached snapshot for `id` is dropped, so the next read goes to the
    /// backend.
    pub async fn update<P>(&self, id: &RecordId, patch: &P) -> StoreResult<T>
    where
        P: Serialize + ?Sized,
    {
        let patch = to_object(patch)?;
        let updated = self
            .retry
            .run("update", || {
                self.backend.update_by_id(&self.table, id, patch.clone())
            })
            .await?;

        self.cache.invalidate(id);
        let row = updated.ok_or_else(|| self.not_found(id))?;
        let record: T = decode(row)?;
        tracing::debug!(table = %self.table, %id, "record updated");
        Ok(record)
    }

    /// Delete a record. Returns `true` on success, including when no row existed.
    pub async fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        self.retry
            .run("delete", || self.backend.delete_by_id(&self.table, id))
            .await?;

        self.cache.invalidate(id);
        tracing::debug!(table = %self.table, %id, "record deleted");
        Ok(true)
    }

    /// List one page of records matching every filter. Never cached.
    pub async fn list(&self, query: &ListQuery) -> StoreResult<Vec<T>> {
        Ok(self.list_page(query).await?.items)
    }

    /// List one page of records together with pagination metadata.
    pub async fn list_page(&self, query: &ListQuery) -> StoreResult<Page<T>> {
        let criteria = Criteria::from(query.filters.clone());
        self.list_page_where(&criteria, query.page, query.limit).await
    }

    /// List one page of records satisfying `criteria`.
    ///
    /// Unlike [`list`](Self::list), the selection may carry inclusive bounds
    /// and a text search besides equality filters. Never cached.
    pub async fn list_page_where(
        &self,
        criteria: &Criteria,
        page: u32,
        limit: u32,
    ) -> StoreResult<Page<T>> {
        let range = page_range(page, limit)?;
        let rows = self
            .retry
            .run("list", || self.backend.select_range(&self.table, criteria, range))
            .await?;

        let items = rows
            .rows
            .into_iter()
            .map(decode::<T>)
            .collect::<StoreResult<Vec<T>>>()?;

        tracing::debug!(
            table = %self.table,
            offset = range.offset,
            limit = range.limit,
            returned = items.len(),
            "records listed"
        );
        Ok(Page::new(items, page, limit, rows.total))
    }

    /// Drop every cached snapshot.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of live cached snapshots.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn not_found(&self, id: &RecordId) -> StoreError {
        StoreError::NotFound {
            table: self.table.clone(),
            id: id.clone(),
        }
    }
}

/// Serialize a payload and require a JSON object.
fn to_object<P: Serialize + ?Sized>(payload: &P) -> StoreResult<Value> {
    let value =
        serde_json::to_value(payload).map_err(|e| StoreError::Validation(e.to_string()))?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Err(StoreError::Validation("payload is missing".to_string())),
        _ => Err(StoreError::Validation(
            "payload must be a structured object".to_string(),
        )),
    }
}

fn decode<T: Record>(row: Value) -> StoreResult<T> {
    serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_object_accepts_map() {
        assert!(to_object(&json!({ "name": "A" })).is_ok());
        assert!(to_object(&json!({})).is_ok());
    }

    #[test]
    fn test_to_object_rejects_non_objects() {
        for payload in [json!(null), json!(42), json!("text"), json!([1, 2]), json!(true)] {
            let err = to_object(&payload).unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)), "{:?}", payload);
        }
    }

    #[test]
    fn test_to_object_rejects_none() {
        let payload: Option<Value> = None;
        assert!(matches!(
            to_object(&payload),
            Err(StoreError::Validation(_))
        ));
    }
}
