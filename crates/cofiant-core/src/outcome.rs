//! # Search Outcomes
//!
//! What one search invocation produces, and the callback interface that
//! hands it to a presentation layer.
//!
//! The core never formats output. A `SearchOutcome` is plain data; an
//! adapter implements `Renderer` and calls `SearchOutcome::render` to
//! receive the values in a fixed order.
//!
//! ## Outcome Table
//!
//! | Outcome | Summary | Message | Pagination |
//! |---------|---------|---------|------------|
//! | `NeedsSelection` | 0 visible, page 1 | choose a filter | hidden |
//! | `Results` | list length, has-more | none | shown |
//! | `Empty` | 0 visible | no results | hidden |
//! | `Failed` | 0 visible | generic error | hidden |

use crate::dedupe::dedupe;
use crate::pagination::{window, Page};
use crate::projection::{project_graph, project_list, GraphEdge, GraphNode, ResultGraph, ResultRecord};
use crate::rows::RawRow;
use crate::{CofiantError, Language};
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR KINDS
// =============================================================================

/// Renderer-facing outcome category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// No facet chosen; surfaced as a prompt.
    SelectionEmpty,
    /// Network or HTTP failure.
    Transport,
    /// Unexpected payload shape.
    Parse,
    /// Valid response without usable rows.
    EmptyResultSet,
}

impl ErrorKind {
    /// Built-in localized message.
    ///
    /// Transport and parse failures share one message.
    #[must_use]
    pub const fn message(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::SelectionEmpty, Language::En) => "Choose at least one filter to search.",
            (Self::SelectionEmpty, Language::Cy) => "Dewiswch o leiaf un hidlydd i chwilio.",
            (Self::Transport | Self::Parse, Language::En) => {
                "Something went wrong while searching. Please try again."
            }
            (Self::Transport | Self::Parse, Language::Cy) => {
                "Aeth rhywbeth o'i le wrth chwilio. Rhowch gynnig arall arni."
            }
            (Self::EmptyResultSet, Language::En) => "No results found.",
            (Self::EmptyResultSet, Language::Cy) => "Dim canlyniadau.",
        }
    }

    /// Whether this kind is an error state (prompt and empty are not).
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Transport | Self::Parse)
    }

    /// Category of a pipeline error.
    ///
    /// Anything that is neither a selection nor a parse problem is reported
    /// as a transport failure.
    #[must_use]
    pub fn of(error: &CofiantError) -> Self {
        match error {
            CofiantError::SelectionEmpty => Self::SelectionEmpty,
            CofiantError::Parse(_) => Self::Parse,
            _ => Self::Transport,
        }
    }
}

// =============================================================================
// RENDERER
// =============================================================================

/// Callbacks consumed by a presentation layer.
pub trait Renderer {
    /// The list view's records for the current page.
    fn on_list_results(&mut self, records: &[ResultRecord]);

    /// The graph view's nodes and edges.
    fn on_graph_results(&mut self, nodes: &[GraphNode], edges: &[GraphEdge]);

    /// Counts and pagination state.
    fn on_summary(&mut self, visible_count: usize, has_more: bool, page_index: u32);

    /// A prompt, a "no results" notice or a failure.
    fn on_error(&mut self, kind: ErrorKind, message: &str);
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Counts reported alongside every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Records in the list view.
    pub visible_count: usize,
    /// Whether a further page exists.
    pub has_more: bool,
    /// 1-based page index.
    pub page_index: u32,
}

impl Summary {
    /// Zero visible, pagination hidden.
    #[must_use]
    pub const fn hidden(page_index: u32) -> Self {
        Self {
            visible_count: 0,
            has_more: false,
            page_index,
        }
    }
}

/// Result of one search invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SearchOutcome {
    /// The selection was empty; nothing was executed.
    NeedsSelection {
        /// Localized prompt.
        message: String,
    },
    /// At least one usable row.
    Results {
        /// List view for the page.
        records: Vec<ResultRecord>,
        /// Graph view over the full lookahead set.
        graph: ResultGraph,
        /// Counts.
        summary: Summary,
    },
    /// A valid response with zero usable rows.
    Empty {
        /// Counts (always hidden pagination).
        summary: Summary,
        /// Localized notice.
        message: String,
    },
    /// Transport or parse failure.
    Failed {
        /// Failure category.
        kind: ErrorKind,
        /// Localized message.
        message: String,
        /// Page the failed request was for.
        page_index: u32,
    },
}

impl SearchOutcome {
    /// The "choose a filter" prompt.
    #[must_use]
    pub fn needs_selection(language: Language) -> Self {
        Self::NeedsSelection {
            message: ErrorKind::SelectionEmpty.message(language).to_string(),
        }
    }

    /// Outcome of a failed invocation.
    #[must_use]
    pub fn failed(error: &CofiantError, page: Page, language: Language) -> Self {
        let kind = ErrorKind::of(error);
        if kind == ErrorKind::SelectionEmpty {
            return Self::needs_selection(language);
        }
        Self::Failed {
            kind,
            message: kind.message(language).to_string(),
            page_index: page.index(),
        }
    }

    /// Counts of this outcome.
    #[must_use]
    pub fn summary(&self) -> Summary {
        match self {
            Self::NeedsSelection { .. } => Summary::hidden(1),
            Self::Results { summary, .. } | Self::Empty { summary, .. } => *summary,
            Self::Failed { page_index, .. } => Summary::hidden(*page_index),
        }
    }

    /// Renderer-facing kind, if this outcome carries a message.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::NeedsSelection { .. } => Some(ErrorKind::SelectionEmpty),
            Self::Results { .. } => None,
            Self::Empty { .. } => Some(ErrorKind::EmptyResultSet),
            Self::Failed { kind, .. } => Some(*kind),
        }
    }

    /// Whether this is a transport or parse failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Hand the outcome to a renderer.
    ///
    /// Result views come first, the summary after them, and a message last.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        match self {
            Self::Results {
                records,
                graph,
                summary,
            } => {
                renderer.on_list_results(records);
                renderer.on_graph_results(&graph.nodes, &graph.edges);
                renderer.on_summary(summary.visible_count, summary.has_more, summary.page_index);
            }
            Self::NeedsSelection { message } => {
                let summary = self.summary();
                renderer.on_summary(summary.visible_count, summary.has_more, summary.page_index);
                renderer.on_error(ErrorKind::SelectionEmpty, message);
            }
            Self::Empty { summary, message } => {
                renderer.on_list_results(&[]);
                renderer.on_graph_results(&[], &[]);
                renderer.on_summary(summary.visible_count, summary.has_more, summary.page_index);
                renderer.on_error(ErrorKind::EmptyResultSet, message);
            }
            Self::Failed {
                kind,
                message,
                page_index,
            } => {
                renderer.on_summary(0, false, *page_index);
                renderer.on_error(*kind, message);
            }
        }
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Run the post-transport pipeline over raw endpoint rows.
///
/// Deduplicate the full lookahead set, cut the page window, then project the
/// truncated rows into the list and the full set into the graph.
#[must_use]
pub fn process(rows: Vec<RawRow>, page: Page, language: Language) -> SearchOutcome {
    let window = window(dedupe(rows), page.size());

    if window.is_empty() {
        return SearchOutcome::Empty {
            summary: Summary::hidden(page.index()),
            message: ErrorKind::EmptyResultSet.message(language).to_string(),
        };
    }

    let records = project_list(window.list_rows());
    let graph = project_graph(window.graph_rows());
    let summary = Summary {
        visible_count: records.len(),
        has_more: window.has_more(),
        page_index: page.index(),
    };

    SearchOutcome::Results {
        records,
        graph,
        summary,
    }
}

// =============================================================================
// TESTS
// =============================================================================
