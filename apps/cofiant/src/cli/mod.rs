//! # Cofiant CLI Module
//!
//! This module implements the CLI interface for Cofiant.
//!
//! ## Available Commands
//!
//! - `search` - Run one search and print the results
//! - `query` - Print the generated query without sending it
//! - `suggest` - Autocomplete a facet value from the local lists
//! - `facets` - Show the facet registry
//! - `shell` - Interactive search session
//! - `serve` - Start the HTTP server
//! - `pack-index` - Pack the JSON lists into one bundle

mod commands;
mod output;
mod shell;

use clap::{Args, Parser, Subcommand};
use cofiant_core::{CofiantError, Language, ViewMode};
use std::path::PathBuf;

pub use commands::*;
pub use output::{TextRenderer, choose_view, format_outcome};
pub use shell::{Shell, ShellCommand, describe_session, parse_line};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Cofiant - faceted biography search
///
/// Finds people in a public knowledge graph by gender, occupation,
/// education, birth and death place, and family relation.
#[derive(Parser, Debug)]
#[command(name = "cofiant")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ./cofiant.toml when present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Graph-query endpoint URL
    #[arg(short = 'e', long, global = true)]
    pub endpoint: Option<String>,

    /// Response language (en, cy)
    #[arg(short = 'l', long, global = true)]
    pub lang: Option<Language>,

    /// Facet list directory or packed bundle
    #[arg(short = 'i', long, global = true)]
    pub index: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long = "json", global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Facet flags shared by `search` and `query`.
#[derive(Args, Debug, Clone, Default)]
pub struct FacetArgs {
    /// Gender entity id (e.g. Q6581072)
    #[arg(long)]
    pub gender: Option<String>,

    /// Occupation entity id
    #[arg(long)]
    pub occupation: Option<String>,

    /// Place of education entity id
    #[arg(long)]
    pub education: Option<String>,

    /// Place of birth entity id
    #[arg(long)]
    pub birth_place: Option<String>,

    /// Place of death entity id
    #[arg(long)]
    pub death_place: Option<String>,

    /// Relation token: any, father, mother, spouse, sibling, child, relative
    #[arg(long)]
    pub relation: Option<String>,

    /// Page number (1-based)
    #[arg(short, long, default_value = "1")]
    pub page: u32,
}

impl FacetArgs {
    fn values(&self) -> FacetValues {
        FacetValues {
            gender: self.gender.clone(),
            occupation: self.occupation.clone(),
            education: self.education.clone(),
            birth_place: self.birth_place.clone(),
            death_place: self.death_place.clone(),
            relation: self.relation.clone(),
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one search and print the results
    Search {
        #[command(flatten)]
        facets: FacetArgs,

        /// Result view (list, graph)
        #[arg(long, default_value = "list")]
        view: ViewMode,
    },

    /// Print the generated query without sending it
    Query {
        #[command(flatten)]
        facets: FacetArgs,
    },

    /// Autocomplete a facet value from the local lists
    Suggest {
        /// Facet name (gender, occupation, education, birthPlace, deathPlace, relation)
        facet: String,

        /// Text typed so far
        text: String,
    },

    /// Show the facet registry
    Facets,

    /// Interactive search session
    Shell {
        /// Result view (list, graph)
        #[arg(long, default_value = "list")]
        view: ViewMode,
    },

    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Pack a directory of JSON facet lists into one bundle
    PackIndex {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// List directory (default: the configured index path)
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CofiantError> {
    let mut config = load_config(
        cli.config.as_deref(),
        cli.endpoint.as_deref(),
        cli.lang,
        cli.index.as_deref(),
    )?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Search { facets, view }) => {
            cmd_search(&config, &facets.values(), facets.page, view, json_mode).await
        }
        Some(Commands::Query { facets }) => {
            cmd_query(&config, &facets.values(), facets.page, json_mode)
        }
        Some(Commands::Suggest { facet, text }) => cmd_suggest(&config, &facet, &text, json_mode),
        Some(Commands::Facets) => cmd_facets(json_mode),
        Some(Commands::Shell { view }) => cmd_shell(&config, view, json_mode).await,
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_serve(&config).await
        }
        Some(Commands::PackIndex { output, source }) => {
            cmd_pack_index(&config, source.as_deref(), &output, json_mode)
        }
        None => {
            // No subcommand - show the registry by default
            cmd_facets(json_mode)
        }
    }
}
