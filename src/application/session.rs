//! The list screen as a headless state machine.
//!
//! One `ListSession` drives one resource's list: search input flows through
//! the debouncer, settled terms reset pagination and pick the cache key, page
//! changes resolve synchronously on cache hits, and neighbour pages are warmed
//! after every settle. Rendering is someone else's problem; the session only
//! exposes commands in and a view snapshot out.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::cache::{KeyScope, ListKey, PageEntry, QueryCache};
use crate::domain::types::Resource;

use super::debounce::Debouncer;
use super::loader::FetchError;
use super::pagination::{PageButton, PaginationState, page_buttons, parse_manual_page};
use super::prefetch::PrefetchScheduler;

/// Everything a list screen can ask the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    /// A raw keystroke in the search box.
    SearchInput(String),
    /// Escape pressed in the search box.
    ClearSearch,
    /// Navigate to a 0-based page index.
    GoToPage(u32),
    NextPage,
    PreviousPage,
    /// A keystroke in the "go to page" field.
    PageInput(String),
    /// The "go to page" field lost focus.
    PageInputBlur,
    /// Re-issue the fetch for the current key after a failure.
    Retry,
    /// Force-refresh the current page past the freshness window.
    Refresh,
}

/// What the table body should show.
#[derive(Debug, Clone)]
pub enum ListPhase<T> {
    /// Nothing requested yet.
    Idle,
    /// First fetch for the current key; no cached rows to show.
    Loading,
    /// Rows available (fresh or stale).
    Ready(PageEntry<T>),
    /// The current key's fetch failed; retry is offered.
    Failed(FetchError),
}

/// Owned snapshot of the screen state, computed on demand.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    pub resource: Resource,
    pub rows: Vec<T>,
    pub loading: bool,
    pub error: Option<FetchError>,
    pub current_page: u32,
    pub total_pages: u32,
    pub buttons: Vec<PageButton>,
    pub can_previous: bool,
    pub can_next: bool,
    /// `Showing {from} to {to} of {total}` summary, zeroed while empty.
    pub showing_from: u64,
    pub showing_to: u64,
    pub total: u64,
    pub raw_term: String,
    pub settled_term: String,
    pub page_input: String,
}

pub struct ListSession<T> {
    resource: Resource,
    cache: QueryCache<T>,
    prefetch: PrefetchScheduler<T>,
    debouncer: Debouncer,
    settled_rx: mpsc::UnboundedReceiver<String>,
    pagination: PaginationState,
    raw_term: String,
    settled_term: String,
    page_input: String,
    phase: ListPhase<T>,
}

impl<T: Clone + Send + Sync + 'static> ListSession<T> {
    pub fn new(resource: Resource, cache: QueryCache<T>, page_size: u32, quiet: Duration) -> Self {
        let (debouncer, settled_rx) = Debouncer::spawn(quiet);
        Self {
            resource,
            prefetch: PrefetchScheduler::new(cache.clone()),
            cache,
            debouncer,
            settled_rx,
            pagination: PaginationState::new(page_size),
            raw_term: String::new(),
            settled_term: String::new(),
            page_input: String::new(),
            phase: ListPhase::Idle,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Apply one screen command.
    pub async fn apply(&mut self, command: ListCommand) {
        match command {
            ListCommand::SearchInput(raw) => {
                self.raw_term = raw.clone();
                self.debouncer.update(raw);
            }
            ListCommand::ClearSearch => {
                self.raw_term.clear();
                self.debouncer.update("");
            }
            ListCommand::GoToPage(index) => self.request_page(index).await,
            ListCommand::NextPage => {
                if self.pagination.current_page() < self.total_pages() {
                    self.request_page(self.pagination.page_index() + 1).await;
                }
            }
            ListCommand::PreviousPage => {
                if let Some(previous) = self.pagination.page_index().checked_sub(1) {
                    self.request_page(previous).await;
                }
            }
            ListCommand::PageInput(raw) => {
                self.page_input = raw;
                if let Some(page) = parse_manual_page(&self.page_input, self.total_pages()) {
                    self.request_page(page - 1).await;
                }
            }
            ListCommand::PageInputBlur => self.page_input.clear(),
            ListCommand::Retry => self.load_current().await,
            ListCommand::Refresh => self.refresh_current().await,
        }
    }

    /// Wait for the next settled search term and apply it.
    ///
    /// Returns `false` once the debouncer is gone and no settle can follow.
    pub async fn pump_settled(&mut self) -> bool {
        match self.settled_rx.recv().await {
            Some(term) => {
                self.apply_settled(term).await;
                true
            }
            None => false,
        }
    }

    /// Settle a term immediately, bypassing the debouncer.
    ///
    /// For non-interactive callers (the CLI, tests); interactive input goes
    /// through [`ListCommand::SearchInput`] and [`Self::pump_settled`].
    pub async fn submit_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.raw_term = term.clone();
        self.apply_settled(term).await;
    }

    /// Invalidate this resource's whole key family and reload the current
    /// page; call after a successful create/update/delete.
    pub async fn after_mutation(&mut self) {
        self.cache.invalidate(&KeyScope::Family(self.resource));
        self.load_current().await;
    }

    /// Snapshot the screen state.
    pub fn view(&self) -> ListView<T> {
        let entry = match &self.phase {
            ListPhase::Ready(entry) => Some(entry),
            _ => None,
        };
        let current_page = self.pagination.current_page();
        let total_pages = self.total_pages();

        ListView {
            resource: self.resource,
            rows: entry.map(|e| e.rows.clone()).unwrap_or_default(),
            loading: matches!(self.phase, ListPhase::Loading),
            error: match &self.phase {
                ListPhase::Failed(error) => Some(error.clone()),
                _ => None,
            },
            current_page,
            total_pages,
            buttons: page_buttons(current_page, total_pages),
            can_previous: self.pagination.page_index() > 0,
            can_next: current_page < total_pages,
            showing_from: entry.and_then(|e| e.from).unwrap_or(0),
            showing_to: entry.and_then(|e| e.to).unwrap_or(0),
            total: entry.map(|e| e.total).unwrap_or(0),
            raw_term: self.raw_term.clone(),
            settled_term: self.settled_term.clone(),
            page_input: self.page_input.clone(),
        }
    }

    /// Serial number of a row across the whole result set.
    pub fn row_number(&self, row_index: usize) -> u64 {
        self.pagination.global_row_number(row_index)
    }

    fn total_pages(&self) -> u32 {
        match &self.phase {
            ListPhase::Ready(entry) => entry.page_count.max(1),
            _ => 1,
        }
    }

    fn current_key(&self) -> ListKey {
        ListKey::new(
            self.resource,
            self.settled_term.clone(),
            self.pagination.current_page(),
        )
    }

    /// The pagination reset must land before the key for the new term is
    /// computed; a fetch already in flight for the old term cannot move the
    /// new term's page.
    async fn apply_settled(&mut self, term: String) {
        let reset = self.pagination.note_settled_term(&term);
        self.settled_term = term;
        if reset {
            debug!(resource = %self.resource, term = %self.settled_term, "New search reset to first page");
        }
        self.load_current().await;
    }

    async fn request_page(&mut self, target_index: u32) {
        self.pagination.set_page_index(target_index);
        self.load_current().await;
    }

    async fn load_current(&mut self) {
        let key = self.current_key();

        // A held page renders instantly; only a cold key shows the skeleton.
        if !self.cache.contains(&key) {
            self.phase = ListPhase::Loading;
        }

        match self.cache.fetch(&key).await {
            Ok(entry) => {
                self.prefetch.warm_neighbours(
                    self.resource,
                    &self.settled_term,
                    self.pagination.current_page(),
                    entry.page_count,
                );
                self.phase = ListPhase::Ready(entry);
            }
            Err(error) => self.phase = ListPhase::Failed(error),
        }
    }

    async fn refresh_current(&mut self) {
        let key = self.current_key();
        match self.cache.refetch(&key).await {
            Ok(entry) => self.phase = ListPhase::Ready(entry),
            Err(error) => self.phase = ListPhase::Failed(error),
        }
    }
}
