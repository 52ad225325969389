//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::output::{choose_view, format_outcome};
use super::shell::Shell;
use crate::api::{self, AppState, FacetInfo, SuggestionJson};
use crate::config::AppConfig;
use crate::controller::{SearchController, run_request};
use crate::executor::{HttpExecutor, SearchExecutor};
use crate::loader::{load_index, load_list_dir, write_bundle};
use cofiant_core::{
    CofiantError, FacetKey, FacetRegistry, Language, LocalFacetIndex, Page, RenderCapabilities,
    SearchRequest, SearchSession, Selection, Suggestions, ViewMode, min_query_chars,
};
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// SHARED SETUP
// =============================================================================

/// Facet values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct FacetValues {
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub birth_place: Option<String>,
    pub death_place: Option<String>,
    pub relation: Option<String>,
}

impl FacetValues {
    /// Build a validated selection.
    pub fn to_selection(&self) -> Result<Selection, CofiantError> {
        let values = [
            (FacetKey::Gender, &self.gender),
            (FacetKey::Occupation, &self.occupation),
            (FacetKey::Education, &self.education),
            (FacetKey::BirthPlace, &self.birth_place),
            (FacetKey::DeathPlace, &self.death_place),
            (FacetKey::Relation, &self.relation),
        ];
        Selection::try_from_raw(
            values
                .into_iter()
                .filter_map(|(key, value)| value.as_deref().map(|raw| (key, raw))),
        )
    }
}

fn build_request(
    config: &AppConfig,
    facets: &FacetValues,
    page: u32,
) -> Result<SearchRequest, CofiantError> {
    Ok(SearchRequest::new(
        facets.to_selection()?.snapshot(),
        Page::new(page, config.search.page_size)?,
        config.search.language,
    ))
}

fn http_executor(config: &AppConfig) -> Result<Arc<dyn SearchExecutor>, CofiantError> {
    Ok(Arc::new(HttpExecutor::new(&config.endpoint)?))
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Run one search and print it.
pub async fn cmd_search(
    config: &AppConfig,
    facets: &FacetValues,
    page: u32,
    view: ViewMode,
    json_mode: bool,
) -> Result<(), CofiantError> {
    let request = build_request(config, facets, page)?;
    let executor = http_executor(config)?;
    let view = choose_view(&RenderCapabilities::detect(config.render.graph), view);

    let outcome = run_request(executor.as_ref(), &request).await;
    println!("{}", format_outcome(&outcome, view, json_mode));

    if outcome.is_failure() {
        return Err(CofiantError::Transport("Search failed".to_string()));
    }
    Ok(())
}

// =============================================================================
// QUERY COMMAND
// =============================================================================

/// Print the query text without sending it.
pub fn cmd_query(
    config: &AppConfig,
    facets: &FacetValues,
    page: u32,
    json_mode: bool,
) -> Result<(), CofiantError> {
    let query = build_request(config, facets, page)?.to_query()?;
    if json_mode {
        let output = serde_json::json!({ "query": query });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        println!("{query}");
    }
    Ok(())
}

// =============================================================================
// SUGGEST COMMAND
// =============================================================================

/// Autocomplete against the local lists.
pub fn cmd_suggest(
    config: &AppConfig,
    facet: &str,
    text: &str,
    json_mode: bool,
) -> Result<(), CofiantError> {
    let key: FacetKey = facet.parse()?;
    let index = load_index(&config.index.path)?;
    let language = config.search.language;
    let suggestions = index.autocomplete(text, key, language);

    if json_mode {
        let entries: Vec<SuggestionJson> = suggestions
            .entries()
            .iter()
            .map(|entry| SuggestionJson::localized(entry, language))
            .collect();
        let output = serde_json::json!({
            "facet": key.name(),
            "open": suggestions.is_open(),
            "suggestions": entries,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    match suggestions {
        Suggestions::Closed => println!(
            "Type at least {} characters.",
            min_query_chars(key.definition().list)
        ),
        Suggestions::Open(entries) if entries.is_empty() => println!("No matches."),
        Suggestions::Open(entries) => {
            for entry in entries {
                match entry.description(language) {
                    Some(desc) => println!("  {} ({}) - {desc}", entry.label(language), entry.id),
                    None => println!("  {} ({})", entry.label(language), entry.id),
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// FACETS COMMAND
// =============================================================================

/// Print the facet registry.
pub fn cmd_facets(json_mode: bool) -> Result<(), CofiantError> {
    let facets: Vec<FacetInfo> = FacetRegistry.iter().map(FacetInfo::from).collect();

    if json_mode {
        let output = serde_json::json!({ "facets": facets });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    println!("Facets (query order):");
    for facet in &facets {
        let mut line = format!(
            "  {:<11} {:<6} {:<18} list={}",
            facet.key,
            facet.kind,
            facet.predicates.join(","),
            facet.list
        );
        if !facet.tokens.is_empty() {
            line.push_str(&format!(" tokens=any,{}", facet.tokens.join(",")));
        }
        println!("{line}");
    }
    Ok(())
}

// =============================================================================
// SHELL COMMAND
// =============================================================================

/// Start the interactive shell.
pub async fn cmd_shell(config: &AppConfig, view: ViewMode, json_mode: bool) -> Result<(), CofiantError> {
    let index = Arc::new(load_index(&config.index.path)?);
    let session = SearchSession::with_page_size(config.search.language, config.search.page_size);
    let controller = SearchController::new(session, http_executor(config)?);
    let view = choose_view(&RenderCapabilities::detect(config.render.graph), view);

    Shell::new(controller, index, view, json_mode).run().await
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(config: &AppConfig) -> Result<(), CofiantError> {
    let index = load_index(&config.index.path)?;
    let executor = http_executor(config)?;

    println!("Cofiant Search Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", config.server_addr());
    println!("  Endpoint: {}", config.endpoint.url);
    println!("  Language: {}", config.search.language);
    println!("  Index:    {} ({} entries)", config.index.path.display(), index.len());
    println!();
    println!("Endpoints:");
    println!("  GET  /health       - Health check");
    println!("  GET  /facets       - Facet registry");
    println!("  GET  /suggest      - Autocomplete");
    println!("  POST /search       - Run a search");
    println!("  POST /query        - Show generated query");
    println!("  GET  /capabilities - Result views");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(index, executor, config);
    api::run_server(config, state).await
}

// =============================================================================
// PACK-INDEX COMMAND
// =============================================================================

/// Pack a directory of JSON lists into one bundle.
pub fn cmd_pack_index(
    config: &AppConfig,
    source: Option<&Path>,
    output: &Path,
    json_mode: bool,
) -> Result<(), CofiantError> {
    let source = source.unwrap_or(config.index.path.as_path());
    if !source.is_dir() {
        return Err(CofiantError::Io(format!(
            "'{}' is not a directory of facet lists",
            source.display()
        )));
    }
    let index: LocalFacetIndex = load_list_dir(source)?;
    let digest = write_bundle(&index, output)?;

    if json_mode {
        let output = serde_json::json!({
            "source": source.to_string_lossy(),
            "output": output.to_string_lossy(),
            "entries": index.len(),
            "blake3": digest,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        println!("Packed {} entries into {}", index.len(), output.display());
        println!("BLAKE3: {digest}");
    }
    Ok(())
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

/// File, then environment, then command-line overrides.
pub fn load_config(
    path: Option<&Path>,
    endpoint: Option<&str>,
    language: Option<Language>,
    index: Option<&Path>,
) -> Result<AppConfig, CofiantError> {
    let mut config = AppConfig::load(path)?;
    config.apply_env()?;
    if let Some(url) = endpoint {
        config.endpoint.url = url.to_string();
    }
    if let Some(language) = language {
        config.search.language = language;
    }
    if let Some(index) = index {
        config.index.path = index.to_path_buf();
    }
    config.validate()?;
    Ok(config)
}

// =============================================================================
// TESTS
// =============================================================================
