//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        ErrorResponse, FacetInfo, FacetsResponse, HealthResponse, QueryResponse, SearchBody,
        SuggestParams, SuggestResponse, SuggestionJson,
    },
};
use crate::controller::run_request;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cofiant_core::{FacetKey, FacetRegistry, Suggestions};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// FACETS HANDLER
// =============================================================================

/// The facet registry.
pub async fn facets_handler() -> impl IntoResponse {
    Json(FacetsResponse {
        facets: FacetRegistry.iter().map(FacetInfo::from).collect(),
    })
}

// =============================================================================
// SUGGEST HANDLER
// =============================================================================

/// Autocomplete against the local index.
pub async fn suggest_handler(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> impl IntoResponse {
    let key: FacetKey = match params.facet.parse() {
        Ok(key) => key,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SuggestResponse::error(e.to_string())),
            );
        }
    };
    let language = params.lang.unwrap_or(state.language);

    let response = match state.index.autocomplete(&params.q, key, language) {
        Suggestions::Closed => SuggestResponse::closed(),
        Suggestions::Open(entries) => SuggestResponse::open(
            entries
                .into_iter()
                .map(|entry| SuggestionJson::localized(entry, language))
                .collect(),
        ),
    };
    (StatusCode::OK, Json(response))
}

// =============================================================================
// SEARCH HANDLER
// =============================================================================

/// Run one search.
///
/// The body is the `SearchOutcome`. Transport and parse failures answer
/// 502 so proxies can tell them apart from an empty result.
pub async fn search_handler(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Response {
    let request = match body.to_request(state.language, state.page_size) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string())))
                .into_response();
        }
    };

    let outcome = run_request(state.executor.as_ref(), &request).await;
    let status = if outcome.is_failure() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    (status, Json(outcome)).into_response()
}

// =============================================================================
// QUERY HANDLER
// =============================================================================

/// The query text a search would send, without sending it.
pub async fn query_handler(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> impl IntoResponse {
    match body
        .to_request(state.language, state.page_size)
        .and_then(|request| request.to_query())
    {
        Ok(query) => (StatusCode::OK, Json(QueryResponse::success(query))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(QueryResponse::error(e.to_string()))),
    }
}

// =============================================================================
// CAPABILITIES HANDLER
// =============================================================================

/// Views this deployment can draw.
pub async fn capabilities_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.capabilities.as_ref().clone())
}
