//! Per-accessor record cache with a fixed time-to-live.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::record::RecordId;

/// Default time-to-live for cached records.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    captured_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.captured_at.elapsed() >= ttl
    }
}

/// Record snapshots keyed by id.
///
/// An entry older than the TTL is a miss. Expired entries are evicted when
/// looked up and swept on every insert. The cache is owned by one accessor and
/// shares nothing with other instances.
#[derive(Debug)]
pub struct RecordCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<RecordId, CacheEntry<T>>>,
}

impl<T: Clone> RecordCache<T> {
    /// Create an empty cache.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live snapshot for `id`.
    pub fn get(&self, id: &RecordId) -> Option<T> {
        let mut entries = self.entries();
        match entries.get(id) {
            Some(entry) if !entry.is_expired(self.ttl) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(id);
                None
            }
            None => None,
        }
    }

    /// Store a snapshot for `id`, stamped with the current time.
    pub fn insert(&self, id: RecordId, value: T) {
        let mut entries = self.entries();
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        entries.insert(
            id,
            CacheEntry {
                value,
                captured_at: Instant::now(),
            },
        );
    }

    /// Remove the entry for `id`. Returns whether one was present.
    pub fn invalidate(&self, id: &RecordId) -> bool {
        self.entries().remove(id).is_some()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|entry| !entry.is_expired(self.ttl))
            .count()
    }

    /// Check if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<RecordId, CacheEntry<T>>> {
        // Entries are plain snapshots, a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Clone> Default for RecordCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = RecordCache::new(Duration::from_secs(300));
        cache.insert(RecordId::new("a"), 1);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get(&RecordId::new("a")), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_miss_and_evicted() {
        let cache = RecordCache::new(Duration::from_secs(300));
        cache.insert(RecordId::new("a"), 1);

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(cache.get(&RecordId::new("a")), None);
        assert!(!cache.invalidate(&RecordId::new("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reinsert_restarts_ttl() {
        let cache = RecordCache::new(Duration::from_secs(10));
        cache.insert(RecordId::new("a"), 1);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.insert(RecordId::new("a"), 2);
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get(&RecordId::new("a")), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_len_counts_live_entries() {
        let cache = RecordCache::new(Duration::from_secs(10));
        cache.insert(RecordId::new("old"), 1);
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.insert(RecordId::new("new"), 2);
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_expired_entries() {
        let cache = RecordCache::new(Duration::from_secs(300));
        for i in 0..1000 {
            cache.insert(RecordId::new(format!("b{}", i)), i);
        }
        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.entries().len(), 1000);

        cache.insert(RecordId::new("fresh"), 0);

        assert_eq!(cache.entries().len(), 1);
        assert_eq!(cache.get(&RecordId::new("fresh")), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_ttl() {
        let cache = RecordCache::new(Duration::from_millis(500));
        cache.insert(RecordId::new("a"), 1);

        assert_eq!(cache.get(&RecordId::new("a")), Some(1));
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(cache.get(&RecordId::new("a")), None);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = RecordCache::default();
        cache.insert(RecordId::new("a"), "x".to_string());
        cache.insert(RecordId::new("b"), "y".to_string());

        assert!(cache.invalidate(&RecordId::new("a")));
        assert!(!cache.invalidate(&RecordId::new("a")));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.ttl(), DEFAULT_CACHE_TTL);
    }
}
