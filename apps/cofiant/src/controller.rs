//! # Search Controller
//!
//! Async owner of a `SearchSession`. Enforces single-flight: starting a
//! search bumps the session generation, which cancels the request in flight,
//! and the new request is sent only after the previous one has resolved or
//! been cancelled.
//!
//! ```text
//! begin_* (session lock) -> announce generation -> flight lock
//!     -> select! { executor, generation changed } -> complete / fail
//! ```

use crate::executor::SearchExecutor;
use cofiant_core::{
    CofiantError, FacetKey, Language, SearchOutcome, SearchRequest, SearchSession, SearchStep,
    SearchTicket, process,
};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// Run one request outside any session.
///
/// An empty selection resolves to the "choose a filter" outcome without
/// touching the executor.
pub async fn run_request(executor: &dyn SearchExecutor, request: &SearchRequest) -> SearchOutcome {
    let Ok(query) = request.to_query() else {
        return SearchOutcome::needs_selection(request.language);
    };
    match executor.execute(&query).await {
        Ok(rows) => process(rows, request.page, request.language),
        Err(e) => SearchOutcome::failed(&e, request.page, request.language),
    }
}

/// Single-flight search controller.
pub struct SearchController {
    session: Mutex<SearchSession>,
    executor: Arc<dyn SearchExecutor>,
    flight: Mutex<()>,
    generation: watch::Sender<u64>,
}

impl SearchController {
    /// Wrap a session and an executor.
    pub fn new(session: SearchSession, executor: Arc<dyn SearchExecutor>) -> Self {
        let (generation, _) = watch::channel(session.generation());
        Self {
            session: Mutex::new(session),
            executor,
            flight: Mutex::new(()),
            generation,
        }
    }

    /// Read the session.
    pub async fn with_session<T>(&self, f: impl FnOnce(&SearchSession) -> T) -> T {
        let session = self.session.lock().await;
        f(&session)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Parse and set a facet value.
    pub async fn set_raw(&self, key: FacetKey, raw: &str) -> Result<(), CofiantError> {
        self.session.lock().await.set_raw(key, raw)
    }

    /// Unset one facet.
    pub async fn clear(&self, key: FacetKey) {
        self.session.lock().await.clear(key);
    }

    /// Unset every facet.
    pub async fn clear_all(&self) {
        self.session.lock().await.clear_all();
    }

    /// Fresh session; cancels the search in flight.
    pub async fn reset(&self) {
        let mut session = self.session.lock().await;
        session.reset();
        self.announce(session.generation());
    }

    // -------------------------------------------------------------------------
    // Searches
    // -------------------------------------------------------------------------

    /// New search from the live selection.
    ///
    /// `None` when a newer search superseded this one.
    pub async fn search(&self) -> Option<SearchOutcome> {
        let step = {
            let mut session = self.session.lock().await;
            let step = session.begin_search();
            self.announce(session.generation());
            step
        };
        match step {
            SearchStep::Resolved(outcome) => Some(outcome),
            SearchStep::Execute(ticket) => self.dispatch(ticket).await,
        }
    }

    /// Following page of the last successful search.
    pub async fn next_page(&self) -> Result<Option<SearchOutcome>, CofiantError> {
        let ticket = {
            let mut session = self.session.lock().await;
            let ticket = session.begin_next()?;
            self.announce(ticket.generation());
            ticket
        };
        Ok(self.dispatch(ticket).await)
    }

    /// Preceding page of the last successful search.
    pub async fn previous_page(&self) -> Result<Option<SearchOutcome>, CofiantError> {
        let ticket = {
            let mut session = self.session.lock().await;
            let ticket = session.begin_previous()?;
            self.announce(ticket.generation());
            ticket
        };
        Ok(self.dispatch(ticket).await)
    }

    /// Switch language, re-running the last successful search if any.
    ///
    /// `None` when there was nothing to re-run, or the re-run was superseded.
    pub async fn set_language(&self, language: Language) -> Option<SearchOutcome> {
        let ticket = {
            let mut session = self.session.lock().await;
            let ticket = session.begin_language_change(language);
            self.announce(session.generation());
            ticket
        };
        match ticket {
            Some(ticket) => self.dispatch(ticket).await,
            None => None,
        }
    }

    // Called with the session lock held, so generations are published in order.
    fn announce(&self, generation: u64) {
        self.generation.send_if_modified(|current| {
            if *current == generation {
                return false;
            }
            *current = generation;
            true
        });
    }

    async fn dispatch(&self, ticket: SearchTicket) -> Option<SearchOutcome> {
        let _flight = self.flight.lock().await;
        let generation = ticket.generation();

        if !self.session.lock().await.is_current(&ticket) {
            tracing::debug!(generation, "Search superseded before dispatch");
            return None;
        }

        let mut changed = self.generation.subscribe();
        let result = tokio::select! {
            result = self.executor.execute(ticket.query()) => Some(result),
            _ = changed.wait_for(|current| *current != generation) => None,
        };

        let Some(result) = result else {
            tracing::debug!(generation, "Search cancelled by a newer one");
            return None;
        };

        let mut session = self.session.lock().await;
        let outcome = match result {
            Ok(rows) => session.complete(ticket, rows),
            Err(e) => session.fail(ticket, &e),
        };
        if outcome.is_none() {
            tracing::debug!(generation, "Discarded stale search result");
        }
        outcome
    }
}

// =============================================================================
// TESTS
// =============================================================================
