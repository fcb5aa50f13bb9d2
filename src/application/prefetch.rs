//! Speculative warming of neighbour pages.

use tracing::debug;

use crate::cache::{ListKey, QueryCache};
use crate::domain::types::Resource;

/// Warms the cache around the page the user has settled on, so adjacent page
/// changes resolve synchronously.
pub struct PrefetchScheduler<T> {
    cache: QueryCache<T>,
}

impl<T: Clone + Send + Sync + 'static> PrefetchScheduler<T> {
    pub fn new(cache: QueryCache<T>) -> Self {
        Self { cache }
    }

    /// Schedule neighbour prefetches for `(term, current_page)`.
    ///
    /// The next page is always warmed while one exists; the previous page only
    /// when it is not already held. Work runs on background tasks and failures
    /// are absorbed inside the cache. Returns the keys that were scheduled.
    pub fn warm_neighbours(
        &self,
        resource: Resource,
        term: &str,
        current_page: u32,
        total_pages: u32,
    ) -> Vec<ListKey> {
        let mut scheduled = Vec::new();

        if current_page < total_pages {
            scheduled.push(ListKey::new(resource, term, current_page + 1));
        }

        if current_page > 1 {
            let previous = ListKey::new(resource, term, current_page - 1);
            if !self.cache.contains(&previous) {
                scheduled.push(previous);
            }
        }

        for key in &scheduled {
            debug!(key = %key, "Scheduling neighbour prefetch");
            let cache = self.cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache.prefetch(key).await;
            });
        }

        scheduled
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::application::loader::{FetchError, FetchedPage, PageLoader};
    use crate::cache::CacheConfig;

    use super::*;

    struct StubLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageLoader<String> for StubLoader {
        async fn load_page(
            &self,
            _resource: Resource,
            term: &str,
            page: u32,
        ) -> Result<FetchedPage<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchedPage {
                rows: vec![format!("{term}:{page}")],
                last_page: 5,
                from: Some(1),
                to: Some(1),
                total: 50,
            })
        }
    }

    fn scheduler() -> (PrefetchScheduler<String>, QueryCache<String>, Arc<StubLoader>) {
        let loader = Arc::new(StubLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = QueryCache::new(CacheConfig::default(), loader.clone());
        (PrefetchScheduler::new(cache.clone()), cache, loader)
    }

    #[tokio::test]
    async fn middle_page_warms_both_neighbours() {
        let (scheduler, _cache, _loader) = scheduler();

        let keys = scheduler.warm_neighbours(Resource::Category, "", 3, 5);
        assert_eq!(
            keys,
            vec![
                ListKey::new(Resource::Category, "", 4),
                ListKey::new(Resource::Category, "", 2),
            ]
        );
    }

    #[tokio::test]
    async fn last_page_only_warms_previous() {
        let (scheduler, _cache, _loader) = scheduler();

        let keys = scheduler.warm_neighbours(Resource::Category, "", 5, 5);
        assert_eq!(keys, vec![ListKey::new(Resource::Category, "", 4)]);
    }

    #[tokio::test]
    async fn first_page_only_warms_next() {
        let (scheduler, _cache, _loader) = scheduler();

        let keys = scheduler.warm_neighbours(Resource::Category, "", 1, 5);
        assert_eq!(keys, vec![ListKey::new(Resource::Category, "", 2)]);
    }

    #[tokio::test]
    async fn cached_previous_page_is_skipped_but_next_is_not() {
        let (scheduler, cache, _loader) = scheduler();

        // Hold both neighbours, then settle between them.
        cache
            .fetch(&ListKey::new(Resource::Category, "", 2))
            .await
            .expect("primed previous");
        cache
            .fetch(&ListKey::new(Resource::Category, "", 4))
            .await
            .expect("primed next");

        let keys = scheduler.warm_neighbours(Resource::Category, "", 3, 5);
        // Previous is held and skipped; next is scheduled regardless.
        assert_eq!(keys, vec![ListKey::new(Resource::Category, "", 4)]);
    }

    #[tokio::test]
    async fn single_page_list_warms_nothing() {
        let (scheduler, _cache, _loader) = scheduler();

        let keys = scheduler.warm_neighbours(Resource::Category, "", 1, 1);
        assert!(keys.is_empty());
    }
}
