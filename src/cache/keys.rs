//! Cache key definitions.
//!
//! A list page is identified by `(resource, settled search term, 1-based page
//! number)`. Invalidation operates on widening scopes of that tuple.

use crate::domain::types::Resource;

/// Identifies one page of list results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub resource: Resource,
    pub term: String,
    pub page: u32,
}

impl ListKey {
    pub fn new(resource: Resource, term: impl Into<String>, page: u32) -> Self {
        Self {
            resource,
            term: term.into(),
            page,
        }
    }
}

impl std::fmt::Display for ListKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.resource.key_family(),
            self.term,
            self.page
        )
    }
}

/// Widening invalidation scope over [`ListKey`]s.
///
/// Mutations invalidate a whole [`KeyScope::Family`]; targeted refreshes can
/// narrow to one search term's pages or a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyScope {
    /// Every page of every search term for one resource.
    Family(Resource),
    /// Every page of one `(resource, term)` pair.
    Search(Resource, String),
    /// Exactly one page.
    Page(ListKey),
}

impl KeyScope {
    pub fn matches(&self, key: &ListKey) -> bool {
        match self {
            KeyScope::Family(resource) => key.resource == *resource,
            KeyScope::Search(resource, term) => key.resource == *resource && key.term == *term,
            KeyScope::Page(exact) => key == exact,
        }
    }
}
