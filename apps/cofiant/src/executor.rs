//! # Search Executor
//!
//! Sends built query text to the graph-query endpoint and decodes the JSON
//! result set into raw rows.
//!
//! The protocol is SPARQL 1.1 over HTTP GET. No retries: a failed request
//! is reported once and the caller decides what to show.

use crate::config::EndpointConfig;
use async_trait::async_trait;
use cofiant_core::{CofiantError, QueryResults, RawRow, dropped_count};
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Media type of SPARQL JSON results.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Longest error body echoed back in a transport error.
const MAX_ERROR_BODY: usize = 200;

/// Executes one query against a graph-query endpoint.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Run `query` and return its rows in endpoint order.
    async fn execute(&self, query: &str) -> Result<Vec<RawRow>, CofiantError>;
}

/// HTTP executor backed by `reqwest`.
#[derive(Clone)]
pub struct HttpExecutor {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpExecutor {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &EndpointConfig) -> Result<Self, CofiantError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CofiantError::Config(format!("Cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.url.trim().to_string(),
        })
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Map the response status, then decode the result set.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<Vec<RawRow>, CofiantError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(CofiantError::Transport(format!(
                "Endpoint returned {status}: {}",
                snippet.trim()
            )));
        }
        let results = resp
            .json::<QueryResults>()
            .await
            .map_err(|e| CofiantError::Parse(format!("Undecodable result set: {e}")))?;
        Ok(results.into_rows())
    }
}

#[async_trait]
impl SearchExecutor for HttpExecutor {
    async fn execute(&self, query: &str) -> Result<Vec<RawRow>, CofiantError> {
        tracing::debug!(endpoint = %self.endpoint, bytes = query.len(), "Dispatching query");

        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query), ("format", "json")])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Endpoint unreachable: {e}");
                CofiantError::Transport(format!("{}: {e}", self.endpoint))
            })?;

        let rows = self.handle_response(resp).await.inspect_err(|e| {
            tracing::warn!("Query failed: {e}");
        })?;
        tracing::debug!(
            rows = rows.len(),
            dropped = dropped_count(&rows),
            "Query returned"
        );
        Ok(rows)
    }
}
