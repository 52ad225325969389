//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//! Search results are returned as `SearchOutcome` unchanged.

#![deny(missing_docs)]

use cofiant_core::{
    CofiantError, FacetDefinition, FacetEntry, FacetKey, FacetKind, Language, Page, SearchRequest,
    Selection, min_query_chars,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// FACETS RESPONSE
// =============================================================================

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetInfo {
    /// Facet name as accepted in selections.
    pub key: String,
    /// `single` or `union`.
    pub kind: String,
    /// Graph predicates, in emission order.
    pub predicates: Vec<String>,
    /// Selection tokens (union facet only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    /// Backing local list.
    pub list: String,
    /// Characters needed before autocomplete opens.
    pub min_query_chars: usize,
}

impl From<&FacetDefinition> for FacetInfo {
    fn from(definition: &FacetDefinition) -> Self {
        let (kind, predicates, tokens) = match definition.kind {
            FacetKind::Single { predicate } => ("single", vec![predicate.to_string()], Vec::new()),
            FacetKind::Union { members } => (
                "union",
                members.iter().map(|m| m.predicate.to_string()).collect(),
                members.iter().map(|m| m.token.to_string()).collect(),
            ),
        };
        Self {
            key: definition.key.name().to_string(),
            kind: kind.to_string(),
            predicates,
            tokens,
            list: definition.list.file_stem().to_string(),
            min_query_chars: min_query_chars(definition.list),
        }
    }
}

/// Facet registry, in declared order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetsResponse {
    /// One entry per facet.
    pub facets: Vec<FacetInfo>,
}

// =============================================================================
// SUGGEST REQUEST/RESPONSE
// =============================================================================

/// Query string of `GET /suggest`.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestParams {
    /// Facet name.
    pub facet: String,
    /// Text typed so far.
    #[serde(default)]
    pub q: String,
    /// Label language (server default when absent).
    #[serde(default)]
    pub lang: Option<Language>,
}

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionJson {
    /// Entity id or relation token.
    pub id: String,
    /// Label in the requested language.
    pub label: String,
    /// Description in the requested language, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SuggestionJson {
    /// Localize an index entry.
    #[must_use]
    pub fn localized(entry: &FacetEntry, language: Language) -> Self {
        Self {
            id: entry.id.clone(),
            label: entry.label(language).to_string(),
            description: entry.description(language).map(str::to_string),
        }
    }
}

/// Autocomplete response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestResponse {
    /// Whether the facet was recognised.
    pub success: bool,
    /// Whether the lookup opened (input long enough).
    pub open: bool,
    /// Matches in list order.
    pub suggestions: Vec<SuggestionJson>,
    /// Error message on failure.
    pub error: Option<String>,
}

impl SuggestResponse {
    /// Lookup below the minimum input length.
    #[must_use]
    pub fn closed() -> Self {
        Self {
            success: true,
            open: false,
            suggestions: Vec::new(),
            error: None,
        }
    }

    /// Matches of an open lookup.
    #[must_use]
    pub fn open(suggestions: Vec<SuggestionJson>) -> Self {
        Self {
            success: true,
            open: true,
            suggestions,
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            open: false,
            suggestions: Vec::new(),
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// SEARCH REQUEST
// =============================================================================

/// Body of `POST /search` and `POST /query`.
///
/// ```json
/// {"selection": {"gender": "Q6581072", "relation": "any"}, "page": 2, "lang": "cy"}
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchBody {
    /// Facet name to boundary value.
    #[serde(default)]
    pub selection: BTreeMap<String, String>,
    /// 1-based page index (default 1).
    #[serde(default)]
    pub page: Option<u32>,
    /// Response language (server default when absent).
    #[serde(default)]
    pub lang: Option<Language>,
}

impl SearchBody {
    /// Validate the body into a request.
    ///
    /// Unknown facet names and invalid values are rejected. An empty
    /// selection is allowed here and resolves to the "choose a filter"
    /// outcome.
    pub fn to_request(
        &self,
        default_language: Language,
        page_size: usize,
    ) -> Result<SearchRequest, CofiantError> {
        let pairs = self
            .selection
            .iter()
            .map(|(name, raw)| name.parse::<FacetKey>().map(|key| (key, raw.as_str())))
            .collect::<Result<Vec<_>, _>>()?;
        let selection = Selection::try_from_raw(pairs)?;
        let page = Page::new(self.page.unwrap_or(1), page_size)?;
        Ok(SearchRequest::new(
            selection.snapshot(),
            page,
            self.lang.unwrap_or(default_language),
        ))
    }
}

// =============================================================================
// QUERY RESPONSE
// =============================================================================

/// Generated query text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Whether a query could be built.
    pub success: bool,
    /// Query text on success.
    pub query: Option<String>,
    /// Error message on failure.
    pub error: Option<String>,
}

impl QueryResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(query: String) -> Self {
        Self {
            success: true,
            query: Some(query),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            query: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Rejected request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Why the request was rejected.
    pub error: String,
}

impl ErrorResponse {
    /// Create an error response.
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
