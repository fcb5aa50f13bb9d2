//! Vetrina list console
//!
//! A headless administrative list controller for content-management REST
//! backends. One generic controller serves every resource list (categories,
//! sponsors, blogs, donors):
//!
//! - **Debounce**: raw keystrokes settle into a search term after a quiet
//!   period.
//! - **Query cache**: keyed page store with stale-while-revalidate, in-flight
//!   de-duplication, and scope invalidation.
//! - **Pagination**: cache-aware page navigation with deterministic page
//!   buttons.
//! - **Prefetch**: speculative warming of neighbour pages.
//!
//! ## Configuration
//!
//! Behavior is controlled via `vetrina.toml`:
//!
//! ```toml
//! [api]
//! base_url = "https://backend.example.com"
//!
//! [list]
//! page_size = 10
//! debounce_ms = 500
//! freshness_secs = 300
//! ```

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
