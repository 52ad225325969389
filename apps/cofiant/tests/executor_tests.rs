//! Integration tests for the HTTP search executor.
//!
//! Each test starts a throwaway axum endpoint on an ephemeral port.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use cofiant::config::EndpointConfig;
use cofiant::executor::{HttpExecutor, SPARQL_RESULTS_JSON, SearchExecutor};
use cofiant_core::{CofiantError, Relation};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const RESULTS: &str = r#"{
    "head": {"vars": ["person", "personLabel", "birthPlace", "birthPlaceLabel"]},
    "results": {"bindings": [
        {
            "person": {"type": "uri", "value": "http://www.wikidata.org/entity/Q272213"},
            "personLabel": {"type": "literal", "value": "Kate Roberts", "xml:lang": "en"},
            "birthPlace": {"type": "uri", "value": "http://www.wikidata.org/entity/Q3402862"},
            "birthPlaceLabel": {"type": "literal", "value": "Rhosgadfan", "xml:lang": "en"}
        },
        {
            "person": {"type": "uri", "value": "http://www.wikidata.org/entity/Q355504"}
        }
    ]}
}"#;

/// What the fake endpoint saw.
#[derive(Default)]
struct Seen {
    params: HashMap<String, String>,
    accept: Option<String>,
    user_agent: Option<String>,
}

type Shared = Arc<Mutex<Seen>>;

async fn sparql_ok(
    State(seen): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let text = |name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let mut seen = seen.lock().unwrap();
    seen.params = params;
    seen.accept = text(header::ACCEPT);
    seen.user_agent = text(header::USER_AGENT);
    ([(header::CONTENT_TYPE, SPARQL_RESULTS_JSON)], RESULTS)
}

/// Serve a router on 127.0.0.1 and return its `/sparql` URL.
async fn spawn_endpoint(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/sparql")
}

fn executor(url: String, timeout_secs: u64) -> HttpExecutor {
    HttpExecutor::new(&EndpointConfig {
        url,
        timeout_secs,
        user_agent: "cofiant-tests/1.0".to_string(),
    })
    .unwrap()
}

// =============================================================================
// SUCCESS PATH
// =============================================================================

#[tokio::test]
async fn test_rows_decoded_in_endpoint_order() {
    let seen = Shared::default();
    let router = Router::new()
        .route("/sparql", get(sparql_ok))
        .with_state(seen.clone());
    let url = spawn_endpoint(router).await;

    let query = "SELECT ?person WHERE { ?person wdt:P31 wd:Q5 . } LIMIT 25";
    let rows = executor(url, 5).execute(query).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].person_label.as_deref(), Some("Kate Roberts"));
    let birth = rows[0].related(Relation::BirthPlace).unwrap();
    assert_eq!(birth.label.as_deref(), Some("Rhosgadfan"));
    assert!(rows[1].person_label.is_none());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.params.get("query").map(String::as_str), Some(query));
    assert_eq!(seen.params.get("format").map(String::as_str), Some("json"));
    assert_eq!(seen.accept.as_deref(), Some(SPARQL_RESULTS_JSON));
    assert_eq!(seen.user_agent.as_deref(), Some("cofiant-tests/1.0"));
}

#[tokio::test]
async fn test_empty_bindings_are_not_an_error() {
    let router = Router::new().route(
        "/sparql",
        get(|| async { r#"{"head":{"vars":["person"]},"results":{"bindings":[]}}"# }),
    );
    let url = spawn_endpoint(router).await;

    let rows = executor(url, 5).execute("ASK {}").await.unwrap();
    assert!(rows.is_empty());
}

// =============================================================================
// FAILURE PATHS
// =============================================================================

#[tokio::test]
async fn test_error_status_is_transport_failure() {
    let router = Router::new().route(
        "/sparql",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy, try later") }),
    );
    let url = spawn_endpoint(router).await;

    let err = executor(url, 5).execute("SELECT *").await.unwrap_err();
    let CofiantError::Transport(message) = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(message.contains("503"));
    assert!(message.contains("busy, try later"));
}

#[tokio::test]
async fn test_undecodable_body_is_parse_failure() {
    let router = Router::new().route("/sparql", get(|| async { "<html>oops</html>" }));
    let url = spawn_endpoint(router).await;

    let err = executor(url, 5).execute("SELECT *").await.unwrap_err();
    assert!(matches!(err, CofiantError::Parse(_)));
}

#[tokio::test]
async fn test_missing_bindings_is_parse_failure() {
    let router = Router::new().route(
        "/sparql",
        get(|| async { r#"{"head":{"vars":["person"]}}"# }),
    );
    let url = spawn_endpoint(router).await;

    let err = executor(url, 5).execute("SELECT *").await.unwrap_err();
    assert!(matches!(err, CofiantError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = executor(format!("http://{addr}/sparql"), 5)
        .execute("SELECT *")
        .await
        .unwrap_err();
    assert!(matches!(err, CofiantError::Transport(_)));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let router = Router::new().route(
        "/sparql",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            RESULTS
        }),
    );
    let url = spawn_endpoint(router).await;

    let err = executor(url, 1).execute("SELECT *").await.unwrap_err();
    assert!(matches!(err, CofiantError::Transport(_)));
}
