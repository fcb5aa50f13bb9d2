//! The query cache: keyed page fetching with stale-while-revalidate,
//! single-flight de-duplication, and scope invalidation.
//!
//! Constructed once per resource at startup and passed explicitly to every
//! component that reads it; there is no global instance.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use metrics::counter;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::debug;

use crate::application::loader::{FetchError, PageLoader};

use super::config::CacheConfig;
use super::keys::{KeyScope, ListKey};
use super::store::{PageEntry, PageStore};

/// Published result of an in-flight load; `None` until the leader finishes.
type FlightResult<T> = Option<Result<PageEntry<T>, FetchError>>;

struct CacheInner<T> {
    config: CacheConfig,
    store: PageStore<T>,
    loader: Arc<dyn PageLoader<T>>,
    inflight: DashMap<ListKey, watch::Receiver<FlightResult<T>>>,
    epoch: AtomicU64,
}

/// Shared query cache handle.
///
/// Cheap to clone; every clone sees the same store and in-flight registry.
pub struct QueryCache<T> {
    inner: Arc<CacheInner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> QueryCache<T> {
    pub fn new(config: CacheConfig, loader: Arc<dyn PageLoader<T>>) -> Self {
        let store = PageStore::new(&config);
        Self {
            inner: Arc::new(CacheInner {
                config,
                store,
                loader,
                inflight: DashMap::new(),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Cached entry for `key`, stale or not; never triggers a load.
    pub fn get(&self, key: &ListKey) -> Option<PageEntry<T>> {
        self.inner.store.get(key)
    }

    /// Presence check used by the prefetch scheduler.
    pub fn contains(&self, key: &ListKey) -> bool {
        self.inner.store.contains(key)
    }

    /// Resolve `key` to a page.
    ///
    /// Fresh hit: returned as-is. Stale hit: returned immediately while one
    /// background revalidation runs. Miss: awaits the loader, merging into any
    /// request already in flight for the same key.
    pub async fn fetch(&self, key: &ListKey) -> Result<PageEntry<T>, FetchError> {
        if let Some(entry) = self.inner.store.get(key) {
            if entry.is_fresh(self.inner.config.freshness()) {
                counter!("vetrina_cache_hit_total").increment(1);
                return Ok(entry);
            }
            counter!("vetrina_cache_stale_serve_total").increment(1);
            self.spawn_revalidate(key.clone());
            return Ok(entry);
        }

        counter!("vetrina_cache_miss_total").increment(1);
        self.load(key.clone()).await
    }

    /// Warm `key` for a later synchronous read.
    ///
    /// Skips keys that are already fresh; failures are logged and absorbed.
    pub async fn prefetch(&self, key: ListKey) {
        if self
            .inner
            .store
            .get(&key)
            .is_some_and(|entry| entry.is_fresh(self.inner.config.freshness()))
        {
            return;
        }

        counter!("vetrina_prefetch_total").increment(1);
        if let Err(error) = self.load(key.clone()).await {
            counter!("vetrina_prefetch_error_total").increment(1);
            debug!(key = %key, error = %error, "Prefetch failed");
        }
    }

    /// Force a load for `key` even when a fresh entry exists.
    ///
    /// Used by the manual retry and refresh affordances; merges into an
    /// in-flight request like any other load.
    pub async fn refetch(&self, key: &ListKey) -> Result<PageEntry<T>, FetchError> {
        self.load(key.clone()).await
    }

    /// Evict every entry the scope matches; returns how many were removed.
    ///
    /// The next `get`/`fetch` for an evicted key cannot observe the removed
    /// value.
    pub fn invalidate(&self, scope: &KeyScope) -> usize {
        let removed = self.inner.store.invalidate(scope);
        debug!(scope = ?scope, removed, "Invalidated cached pages");
        removed
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    /// Check if the cache holds no pages.
    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    fn spawn_revalidate(&self, key: ListKey) {
        let cache = self.clone();
        tokio::spawn(async move {
            if let Err(error) = cache.load(key.clone()).await {
                debug!(key = %key, error = %error, "Background revalidation failed");
            }
        });
    }

    /// Single-flight load: one loader call per key at a time, its outcome
    /// broadcast to every merged caller.
    async fn load(&self, key: ListKey) -> Result<PageEntry<T>, FetchError> {
        loop {
            let joined = self
                .inner
                .inflight
                .get(&key)
                .map(|flight| flight.value().clone());
            if let Some(mut rx) = joined {
                match rx.wait_for(|state| state.is_some()).await {
                    Ok(state) => {
                        if let Some(result) = state.clone() {
                            return result;
                        }
                    }
                    Err(_) => {
                        // Leader dropped without publishing; take over below.
                    }
                }
                continue;
            }

            let (tx, rx) = watch::channel(None);
            match self.inner.inflight.entry(key.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(vacant) => {
                    vacant.insert(rx);
                }
            }

            let result = self.run_flight(&key).await;
            self.inner.inflight.remove(&key);
            let _ = tx.send(Some(result.clone()));
            return result;
        }
    }

    async fn run_flight(&self, key: &ListKey) -> Result<PageEntry<T>, FetchError> {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let fetched = self
            .inner
            .loader
            .load_page(key.resource, &key.term, key.page)
            .await?;

        let entry = PageEntry {
            rows: fetched.rows,
            total: fetched.total,
            page_count: fetched.last_page.max(1),
            from: fetched.from,
            to: fetched.to,
            fetched_at: OffsetDateTime::now_utc(),
            epoch,
        };
        self.inner.store.insert_if_newer(key.clone(), entry.clone());
        Ok(entry)
    }
}
