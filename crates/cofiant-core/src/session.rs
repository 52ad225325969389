//! # Search Session
//!
//! Explicit, caller-owned state of one user's search session: the live
//! selection, the response language, pagination and the last successful
//! request.
//!
//! A search is split in two halves around the transport call:
//!
//! 1. `begin_*` bumps the generation, freezes a `SearchRequest` and returns
//!    a `SearchTicket` carrying the query text.
//! 2. `complete` / `fail` consume the ticket once the transport resolves.
//!
//! Only the ticket of the current generation is accepted. A ticket from a
//! superseded search yields `None` and leaves the session untouched, so a
//! slow response can never overwrite fresher state.

use crate::outcome::{process, SearchOutcome};
use crate::pagination::{Page, Pagination};
use crate::primitives::PAGE_SIZE;
use crate::query::SearchRequest;
use crate::registry::FacetKey;
use crate::rows::RawRow;
use crate::selection::{FacetValue, Selection};
use crate::{CofiantError, Language};

// =============================================================================
// TICKET
// =============================================================================

/// A started search waiting for its transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    request: SearchRequest,
    query: String,
}

impl SearchTicket {
    /// Generation this ticket belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Frozen inputs of the search.
    #[must_use]
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Query text to send to the endpoint.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// What a new search needs next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStep {
    /// Send the ticket's query and report back.
    Execute(SearchTicket),
    /// Resolved without a transport call.
    Resolved(SearchOutcome),
}

// =============================================================================
// SESSION
// =============================================================================

/// State of one search session.
#[derive(Debug, Clone)]
pub struct SearchSession {
    selection: Selection,
    language: Language,
    page_size: usize,
    pagination: Pagination,
    last_success: Option<SearchRequest>,
    generation: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl SearchSession {
    /// Create a session with the default page size.
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self::with_page_size(language, PAGE_SIZE)
    }

    /// Create a session with a custom page size (clamped to a legal range).
    #[must_use]
    pub fn with_page_size(language: Language, page_size: usize) -> Self {
        Self {
            selection: Selection::new(),
            language,
            page_size: Page::first(page_size).size(),
            pagination: Pagination::new(),
            last_success: None,
            generation: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The live selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Current response language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Pagination state of the last resolved search.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Request of the last search that got a valid response.
    #[must_use]
    pub fn last_success(&self) -> Option<&SearchRequest> {
        self.last_success.as_ref()
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a ticket still belongs to the current generation.
    #[must_use]
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.generation == self.generation
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Set a facet value. Takes effect on the next `begin_search`.
    pub fn set(&mut self, key: FacetKey, value: FacetValue) -> Result<(), CofiantError> {
        self.selection.set(key, value)
    }

    /// Parse and set a boundary value.
    pub fn set_raw(&mut self, key: FacetKey, raw: &str) -> Result<(), CofiantError> {
        self.selection.set_raw(key, raw)
    }

    /// Unset one facet.
    pub fn clear(&mut self, key: FacetKey) {
        self.selection.clear(key);
    }

    /// Unset every facet.
    pub fn clear_all(&mut self) {
        self.selection.clear_all();
    }

    /// Back to a fresh session in the same language.
    ///
    /// Any in-flight search is superseded.
    pub fn reset(&mut self) {
        self.selection.clear_all();
        self.pagination.reset();
        self.last_success = None;
        self.supersede();
    }

    /// Invalidate every outstanding ticket.
    pub fn supersede(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    // -------------------------------------------------------------------------
    // Starting searches
    // -------------------------------------------------------------------------

    /// Start a new search from the live selection, on page 1.
    ///
    /// An empty selection resolves immediately to the "choose a filter"
    /// prompt; nothing is built or sent, and the previous search is
    /// forgotten.
    pub fn begin_search(&mut self) -> SearchStep {
        self.supersede();
        self.pagination.reset();

        if self.selection.is_empty() {
            self.last_success = None;
            return SearchStep::Resolved(SearchOutcome::needs_selection(self.language));
        }

        let request = SearchRequest::new(
            self.selection.snapshot(),
            Page::first(self.page_size),
            self.language,
        );
        match self.ticket(request) {
            Ok(ticket) => SearchStep::Execute(ticket),
            Err(_) => SearchStep::Resolved(SearchOutcome::needs_selection(self.language)),
        }
    }

    /// Re-run the last successful selection on the following page.
    pub fn begin_next(&mut self) -> Result<SearchTicket, CofiantError> {
        let last = self
            .last_success
            .as_ref()
            .ok_or(CofiantError::NoPreviousSearch)?;
        if !self.pagination.can_next() {
            return Err(CofiantError::NoNextPage);
        }
        let request = SearchRequest::new(
            last.selection.clone(),
            last.page.next()?,
            self.language,
        );
        self.supersede();
        self.ticket(request)
    }

    /// Re-run the last successful selection on the preceding page.
    ///
    /// Only allowed while the shown page is past the first one and
    /// pagination is visible.
    pub fn begin_previous(&mut self) -> Result<SearchTicket, CofiantError> {
        let last = self
            .last_success
            .as_ref()
            .ok_or(CofiantError::NoPreviousSearch)?;
        if !self.pagination.can_previous() {
            return Err(CofiantError::NoPreviousPage);
        }
        let request = SearchRequest::new(
            last.selection.clone(),
            last.page.previous()?,
            self.language,
        );
        self.supersede();
        self.ticket(request)
    }

    /// Switch the response language.
    ///
    /// With a previous successful search, its selection is re-run in the new
    /// language from page 1 and the ticket is returned. Without one, only
    /// the language changes.
    pub fn begin_language_change(&mut self, language: Language) -> Option<SearchTicket> {
        self.language = language;
        let last = self.last_success.as_ref()?;
        let request = SearchRequest::new(
            last.selection.clone(),
            Page::first(self.page_size),
            language,
        );
        self.supersede();
        self.pagination.reset();
        self.ticket(request).ok()
    }

    fn ticket(&self, request: SearchRequest) -> Result<SearchTicket, CofiantError> {
        let query = request.to_query()?;
        Ok(SearchTicket {
            generation: self.generation,
            request,
            query,
        })
    }

    // -------------------------------------------------------------------------
    // Resolving searches
    // -------------------------------------------------------------------------

    /// Feed the endpoint's rows back in.
    ///
    /// Returns `None` for a superseded ticket.
    pub fn complete(&mut self, ticket: SearchTicket, rows: Vec<RawRow>) -> Option<SearchOutcome> {
        if !self.is_current(&ticket) {
            return None;
        }
        let request = ticket.request;
        let outcome = process(rows, request.page, request.language);
        if matches!(outcome, SearchOutcome::Empty { .. }) {
            self.pagination.hide(request.page);
        } else {
            self.pagination.record(request.page, outcome.summary().has_more);
        }
        self.last_success = Some(request);
        Some(outcome)
    }

    /// Report a transport or parse failure.
    ///
    /// Returns `None` for a superseded ticket. The last successful request is
    /// kept, so a language change can still re-run it.
    pub fn fail(&mut self, ticket: SearchTicket, error: &CofiantError) -> Option<SearchOutcome> {
        if !self.is_current(&ticket) {
            return None;
        }
        let request = ticket.request;
        self.pagination.hide(request.page);
        Some(SearchOutcome::failed(error, request.page, request.language))
    }
}

// =============================================================================
// TESTS
// =============================================================================
