//! Vetrina query cache
//!
//! Keyed storage for fetched list pages, shared by the pagination controller
//! and the prefetch scheduler:
//!
//! - **Store**: LRU-bounded pages with freshness timestamps and issue-order
//!   last-write-wins.
//! - **Query**: stale-while-revalidate fetching with single-flight
//!   de-duplication and scope invalidation.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `vetrina.toml`:
//!
//! ```toml
//! [list]
//! freshness_secs = 300
//! cache_page_limit = 64
//! ```

mod config;
mod keys;
mod lock;
mod query;
mod store;

pub use config::CacheConfig;
pub use keys::{KeyScope, ListKey};
pub use query::QueryCache;
pub use store::{PageEntry, PageStore};
