//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_FRESHNESS_SECS: u64 = 5 * 60;
const DEFAULT_PAGE_LIMIT: usize = 64;

/// Query cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds before a cached page is considered stale.
    pub freshness_secs: u64,
    /// Maximum list pages held per cache (LRU beyond this).
    pub page_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_secs: DEFAULT_FRESHNESS_SECS,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl From<&crate::config::ListSettings> for CacheConfig {
    fn from(settings: &crate::config::ListSettings) -> Self {
        Self {
            freshness_secs: settings.freshness_secs,
            page_limit: settings.cache_page_limit,
        }
    }
}

impl CacheConfig {
    /// Freshness window as a [`Duration`].
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    /// Returns the page limit as NonZeroUsize, clamping to 1 if zero.
    pub fn page_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.page_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
