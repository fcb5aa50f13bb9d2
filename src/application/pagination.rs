//! Server-driven pagination state and page-button layout.

use serde::Serialize;

/// Page position for one list screen.
///
/// `page_index` is 0-based internally; the backend and every display surface
/// use 1-based page numbers.
#[derive(Debug, Clone)]
pub struct PaginationState {
    page_index: u32,
    page_size: u32,
    previous_settled_term: String,
}

impl PaginationState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            previous_settled_term: String::new(),
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// 1-based page number.
    pub fn current_page(&self) -> u32 {
        self.page_index + 1
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn set_page_index(&mut self, index: u32) {
        self.page_index = index;
    }

    /// Record a settled search term, resetting to the first page when it
    /// starts a new search.
    ///
    /// A new search is a change between two different terms while the previous
    /// one was non-empty; the first search after an empty term keeps the page.
    /// Returns whether the page was reset.
    pub fn note_settled_term(&mut self, new_term: &str) -> bool {
        let is_new_search =
            new_term != self.previous_settled_term && !self.previous_settled_term.is_empty();
        if is_new_search {
            self.page_index = 0;
        }
        self.previous_settled_term = new_term.to_string();
        is_new_search
    }

    /// Serial number of a row across the whole result set, for display.
    pub fn global_row_number(&self, row_index: usize) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size) + row_index as u64 + 1
    }
}

/// One slot in the rendered page-button row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageButton {
    Page(u32),
    Ellipsis,
}

/// Deterministic page-button layout: first and last page always, up to three
/// pages centred on the current one, ellipses for the gaps.
///
/// Degenerates to a single button when `total_pages <= 1`.
pub fn page_buttons(current_page: u32, total_pages: u32) -> Vec<PageButton> {
    let mut buttons = vec![PageButton::Page(1)];

    if current_page > 3 {
        buttons.push(PageButton::Ellipsis);
    }

    let low = current_page.saturating_sub(1).max(2);
    let high = (current_page + 1).min(total_pages.saturating_sub(1));
    for page in low..=high {
        if page != 1 && page != total_pages {
            buttons.push(PageButton::Page(page));
        }
    }

    if total_pages > 2 && current_page < total_pages - 2 {
        buttons.push(PageButton::Ellipsis);
    }

    if total_pages > 1 {
        buttons.push(PageButton::Page(total_pages));
    }

    buttons
}

/// Parse the "go to page" input.
///
/// Only numeric text inside `[1, total_pages]` navigates; anything else is
/// kept in the field without effect (the field clears on blur).
pub fn parse_manual_page(raw: &str, total_pages: u32) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|page| (1..=total_pages).contains(page))
}
