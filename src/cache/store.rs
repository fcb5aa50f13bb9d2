//! Bounded storage for fetched list pages.
//!
//! Entries are keyed by [`ListKey`] and guarded by an issue-order epoch: a
//! completing fetch only installs its result when nothing newer-issued is
//! already installed, so late responses from superseded requests are dropped
//! rather than applied.

use std::sync::RwLock;
use std::time::Duration;

use lru::LruCache;
use metrics::counter;
use time::OffsetDateTime;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::{KeyScope, ListKey};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// One cached page of list results.
#[derive(Debug, Clone)]
pub struct PageEntry<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub page_count: u32,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub fetched_at: OffsetDateTime,
    pub epoch: u64,
}

impl<T> PageEntry<T> {
    /// Whether the entry is still within the freshness window.
    pub fn is_fresh(&self, freshness: Duration) -> bool {
        self.fetched_at + freshness > OffsetDateTime::now_utc()
    }
}

/// LRU-bounded page storage.
///
/// Holds entries regardless of staleness; freshness is judged by the reader.
pub struct PageStore<T> {
    pages: RwLock<LruCache<ListKey, PageEntry<T>>>,
}

impl<T: Clone> PageStore<T> {
    /// Create a new store with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            pages: RwLock::new(LruCache::new(config.page_limit_non_zero())),
        }
    }

    /// Cached entry for `key`, stale or not.
    pub fn get(&self, key: &ListKey) -> Option<PageEntry<T>> {
        rw_write(&self.pages, SOURCE, "get").get(key).cloned()
    }

    /// Presence check without touching LRU order.
    pub fn contains(&self, key: &ListKey) -> bool {
        rw_read(&self.pages, SOURCE, "contains").contains(key)
    }

    /// Install `entry` unless a newer-issued result already occupies the key.
    ///
    /// Returns `false` when the entry was discarded as superseded.
    pub fn insert_if_newer(&self, key: ListKey, entry: PageEntry<T>) -> bool {
        let mut pages = rw_write(&self.pages, SOURCE, "insert_if_newer");

        if let Some(existing) = pages.peek(&key)
            && existing.epoch > entry.epoch
        {
            counter!("vetrina_cache_discard_total").increment(1);
            debug!(
                key = %key,
                held_epoch = existing.epoch,
                late_epoch = entry.epoch,
                "Discarded superseded fetch result"
            );
            return false;
        }

        if let Some((evicted, _)) = pages.push(key.clone(), entry)
            && evicted != key
        {
            counter!("vetrina_cache_evict_total").increment(1);
            debug!(key = %evicted, "Evicted page at capacity");
        }
        true
    }

    /// Evict every entry the scope matches; returns how many were removed.
    pub fn invalidate(&self, scope: &KeyScope) -> usize {
        let mut pages = rw_write(&self.pages, SOURCE, "invalidate");
        let matching: Vec<ListKey> = pages
            .iter()
            .filter(|(key, _)| scope.matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matching {
            pages.pop(key);
        }
        matching.len()
    }

    /// Clear all cached pages.
    pub fn clear(&self) {
        rw_write(&self.pages, SOURCE, "clear").clear();
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        rw_read(&self.pages, SOURCE, "len").len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
