//! # Pagination Controller
//!
//! Lookahead pagination: every query asks for one row more than the page
//! size, and the presence of that row (after deduplication) is the only
//! signal that a further page exists. No count query is ever issued.

use crate::primitives::{MAX_PAGE_INDEX, MAX_PAGE_SIZE, PAGE_SIZE};
use crate::CofiantError;
use serde::{Deserialize, Serialize};

// =============================================================================
// PAGE
// =============================================================================

/// A page request: 1-based index and fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Page {
    index: u32,
    size: usize,
}

impl Page {
    /// Create a validated page.
    pub fn new(index: u32, size: usize) -> Result<Self, CofiantError> {
        if index == 0 || index > MAX_PAGE_INDEX {
            return Err(CofiantError::Config(format!(
                "Page index must be between 1 and {MAX_PAGE_INDEX}, got {index}"
            )));
        }
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(CofiantError::Config(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
            )));
        }
        Ok(Self { index, size })
    }

    /// First page of the given size. Out-of-range sizes are clamped.
    #[must_use]
    pub fn first(size: usize) -> Self {
        Self {
            index: 1,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// 1-based page index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Rows shown per page.
    #[must_use]
    pub const fn size(self) -> usize {
        self.size
    }

    /// Rows to skip: `(index - 1) * size`.
    #[must_use]
    pub const fn offset(self) -> usize {
        (self.index as usize - 1) * self.size
    }

    /// Rows to request: one page plus the lookahead row.
    #[must_use]
    pub const fn limit(self) -> usize {
        self.size + 1
    }

    /// The following page.
    pub fn next(self) -> Result<Self, CofiantError> {
        Self::new(self.index.saturating_add(1), self.size)
    }

    /// The preceding page.
    pub fn previous(self) -> Result<Self, CofiantError> {
        if self.index <= 1 {
            return Err(CofiantError::NoPreviousPage);
        }
        Ok(Self {
            index: self.index - 1,
            size: self.size,
        })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(PAGE_SIZE)
    }
}

// =============================================================================
// WINDOW
// =============================================================================

/// Deduplicated rows of one search, split for the two projections.
///
/// The list sees at most one page; the graph sees the full lookahead set so
/// relationship fan-out is not visibly cut off.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow<T> {
    rows: Vec<T>,
    page_size: usize,
}

impl<T> PageWindow<T> {
    /// Wrap deduplicated rows.
    #[must_use]
    pub fn new(rows: Vec<T>, page_size: usize) -> Self {
        Self { rows, page_size }
    }

    /// Whether a further page exists.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.rows.len() > self.page_size
    }

    /// Rows for the list projection (truncated to the page size).
    #[must_use]
    pub fn list_rows(&self) -> &[T] {
        let end = self.rows.len().min(self.page_size);
        &self.rows[..end]
    }

    /// Rows for the graph projection (untruncated).
    #[must_use]
    pub fn graph_rows(&self) -> &[T] {
        &self.rows
    }

    /// Number of deduplicated rows, lookahead included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cut deduplicated rows into a window for `page_size`.
#[must_use]
pub fn window<T>(rows: Vec<T>, page_size: usize) -> PageWindow<T> {
    PageWindow::new(rows, page_size)
}

// =============================================================================
// CONTROLLER STATE
// =============================================================================

/// Current page index and the last known has-more flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page_index: u32,
    has_more: bool,
    #[serde(default)]
    hidden: bool,
}

impl Pagination {
    /// Fresh state: page 1, no further page known.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page_index: 1,
            has_more: false,
            hidden: false,
        }
    }

    /// Current page index.
    #[must_use]
    pub const fn page_index(self) -> u32 {
        self.page_index
    }

    /// Last known has-more flag.
    #[must_use]
    pub const fn has_more(self) -> bool {
        self.has_more
    }

    /// "Next" is enabled only when a further page exists.
    #[must_use]
    pub const fn can_next(self) -> bool {
        self.has_more
    }

    /// "Previous" is enabled only after the first page, and never while
    /// pagination is hidden.
    #[must_use]
    pub const fn can_previous(self) -> bool {
        !self.hidden && self.page_index > 1
    }

    /// Whether the last search hid pagination (failure or empty result).
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        self.hidden
    }

    /// Record the outcome of a search for `page`.
    pub fn record(&mut self, page: Page, has_more: bool) {
        self.page_index = page.index();
        self.has_more = has_more;
        self.hidden = false;
    }

    /// Hide pagination after a failure or empty result.
    pub fn hide(&mut self, page: Page) {
        self.page_index = page.index();
        self.has_more = false;
        self.hidden = true;
    }

    /// Back to page 1.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_has_zero_offset_and_lookahead_limit() {
        let page = Page::first(24);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn second_page_offset() {
        let page = Page::new(2, 24).expect("page");
        assert_eq!(page.offset(), 24);
        assert_eq!(page.next().expect("next").offset(), 48);
    }

    #[test]
    fn page_zero_rejected() {
        assert!(Page::new(0, 24).is_err());
        assert!(Page::new(1, 0).is_err());
    }

    #[test]
    fn previous_of_first_page_fails() {
        assert!(matches!(
            Page::first(24).previous(),
            Err(CofiantError::NoPreviousPage)
        ));
    }

    #[test]
    fn window_has_more_only_with_lookahead_row() {
        let exact = PageWindow::new((0..24).collect::<Vec<_>>(), 24);
        assert!(!exact.has_more());
        assert_eq!(exact.list_rows().len(), 24);

        let over = PageWindow::new((0..25).collect::<Vec<_>>(), 24);
        assert!(over.has_more());
        assert_eq!(over.list_rows().len(), 24);
        assert_eq!(over.graph_rows().len(), 25);
    }

    #[test]
    fn controller_buttons() {
        let mut state = Pagination::new();
        assert!(!state.can_next());
        assert!(!state.can_previous());

        state.record(Page::new(3, 24).expect("page"), true);
        assert!(state.can_next());
        assert!(state.can_previous());

        state.reset();
        assert_eq!(state.page_index(), 1);
        assert!(!state.has_more());
    }

    #[test]
    fn hidden_pagination_disables_both_buttons() {
        let mut state = Pagination::new();
        state.hide(Page::new(3, 24).expect("page"));
        assert!(state.is_hidden());
        assert_eq!(state.page_index(), 3);
        assert!(!state.can_next());
        assert!(!state.can_previous());

        state.record(Page::new(2, 24).expect("page"), false);
        assert!(!state.is_hidden());
        assert!(state.can_previous());
    }
}
