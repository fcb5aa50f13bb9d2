//! The loading seam between the query cache and the backend.
//!
//! The cache never talks HTTP itself; it drives a [`PageLoader`], implemented
//! by `infra::api::ApiClient` in production and by scripted loaders in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::types::Resource;

/// One page of list results as the backend reports it.
#[derive(Debug, Clone)]
pub struct FetchedPage<T> {
    pub rows: Vec<T>,
    pub last_page: u32,
    /// 1-based ordinal of the first row on this page; absent on empty pages.
    pub from: Option<u64>,
    /// 1-based ordinal of the last row on this page; absent on empty pages.
    pub to: Option<u64>,
    pub total: u64,
}

/// Failure of a single page load.
///
/// Clone-able so one in-flight request can report the same failure to every
/// caller merged into it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Loads one page of a resource's list from the backend.
#[async_trait]
pub trait PageLoader<T>: Send + Sync {
    async fn load_page(
        &self,
        resource: Resource,
        term: &str,
        page: u32,
    ) -> Result<FetchedPage<T>, FetchError>;
}
