//! # Cofiant HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /facets` - Facet registry
//! - `GET /suggest?facet=&q=&lang=` - Autocomplete
//! - `POST /search` - Run a search
//! - `POST /query` - Show the generated query text
//! - `GET /capabilities` - Drawable result views
//!
//! ## Security Configuration
//!
//! - `COFIANT_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `COFIANT_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use middleware::create_rate_limiter;
// Re-export handlers and types for integration tests (via `cofiant::api::*`)
pub use handlers::{
    capabilities_handler, facets_handler, health_handler, query_handler, search_handler,
    suggest_handler,
};
pub use types::{
    ErrorResponse, FacetInfo, FacetsResponse, HealthResponse, QueryResponse, SearchBody,
    SuggestParams, SuggestResponse, SuggestionJson,
};

use crate::config::{AppConfig, ServerConfig};
use crate::executor::SearchExecutor;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use cofiant_core::{CapabilityReport, CofiantError, Language, LocalFacetIndex, RenderCapabilities};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// Everything is read-only after startup; each request builds its own
/// search request, so no lock is needed.
#[derive(Clone)]
pub struct AppState {
    /// Local facet lists for autocomplete.
    pub index: Arc<LocalFacetIndex>,
    /// Graph-query executor.
    pub executor: Arc<dyn SearchExecutor>,
    /// Views this deployment can draw.
    pub capabilities: Arc<CapabilityReport>,
    /// Language used when a request names none.
    pub language: Language,
    /// Records per page.
    pub page_size: usize,
}

impl AppState {
    /// Create app state from loaded parts and the configuration.
    pub fn new(
        index: LocalFacetIndex,
        executor: Arc<dyn SearchExecutor>,
        config: &AppConfig,
    ) -> Self {
        Self {
            index: Arc::new(index),
            executor,
            capabilities: Arc::new(RenderCapabilities::detect(config.render.graph)),
            language: config.search.language,
            page_size: config.search.page_size,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from the configured origins.
///
/// - `*`: allows all origins (development only)
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (COFIANT_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - protects the upstream endpoint (if enabled)
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let cors = build_cors_layer(server.cors_origins.as_deref());

    let rate_limiter = if server.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", server.rate_limit);
        Some(create_rate_limiter(server.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/facets", get(handlers::facets_handler))
        .route("/suggest", get(handlers::suggest_handler))
        .route("/search", post(handlers::search_handler))
        .route("/query", post(handlers::query_handler))
        .route("/capabilities", get(handlers::capabilities_handler));

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server; stops on Ctrl+C.
pub async fn run_server(config: &AppConfig, state: AppState) -> Result<(), CofiantError> {
    let addr = config.server_addr();
    let router = create_router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CofiantError::Io(format!("Bind failed: {e}")))?;

    tracing::info!("Cofiant HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
            }
        })
        .await
        .map_err(|e| CofiantError::Io(format!("Server error: {e}")))
}
