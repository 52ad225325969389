//! # Interactive Shell
//!
//! A line-oriented session over one `SearchController`. Searches run in
//! background tasks, so a new command can supersede a slow search; a
//! superseded search prints nothing.

use super::output::format_outcome;
use crate::controller::SearchController;
use cofiant_core::{
    CofiantError, FacetKey, Language, LocalFacetIndex, SearchOutcome, SearchSession, Suggestions,
    ViewMode,
};
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  set <facet> <value>    choose a value (facets: gender, occupation, education,
                         birthPlace, deathPlace, relation)
  clear [facet]          unset one facet, or all of them
  reset                  fresh session, cancels a running search
  run                    search with the current selection
  next | prev            page through the last results
  lang <en|cy>           switch language (re-runs the last search)
  suggest <facet> <text> autocomplete from the local lists
  show                   current selection and page
  help                   this text
  quit                   leave the shell";

// =============================================================================
// COMMAND PARSING
// =============================================================================

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Set { facet: FacetKey, value: String },
    Clear(Option<FacetKey>),
    Reset,
    Run,
    Next,
    Prev,
    Lang(Language),
    Suggest { facet: FacetKey, text: String },
    Show,
    Help,
    Quit,
    Empty,
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn facet(name: &str) -> Result<FacetKey, String> {
    name.parse().map_err(|e: CofiantError| e.to_string())
}

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let (word, rest) = split_word(line);
    match word.to_ascii_lowercase().as_str() {
        "" => Ok(ShellCommand::Empty),
        "set" => {
            let (name, value) = split_word(rest);
            if value.is_empty() {
                return Err("usage: set <facet> <value>".to_string());
            }
            Ok(ShellCommand::Set {
                facet: facet(name)?,
                value: value.to_string(),
            })
        }
        "clear" if rest.is_empty() => Ok(ShellCommand::Clear(None)),
        "clear" => Ok(ShellCommand::Clear(Some(facet(rest)?))),
        "reset" => Ok(ShellCommand::Reset),
        "run" | "search" => Ok(ShellCommand::Run),
        "next" => Ok(ShellCommand::Next),
        "prev" | "previous" => Ok(ShellCommand::Prev),
        "lang" => rest
            .parse()
            .map(ShellCommand::Lang)
            .map_err(|e: CofiantError| e.to_string()),
        "suggest" => {
            let (name, text) = split_word(rest);
            Ok(ShellCommand::Suggest {
                facet: facet(name)?,
                text: text.to_string(),
            })
        }
        "show" => Ok(ShellCommand::Show),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("Unknown command '{other}' (try 'help')")),
    }
}

/// Human-readable session state.
pub fn describe_session(session: &SearchSession) -> String {
    let snapshot = session.selection().snapshot();
    let selection = if snapshot.is_empty() {
        "(none)".to_string()
    } else {
        snapshot
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let pagination = session.pagination();
    let mut page = format!("Page:      {}", pagination.page_index());
    if pagination.is_hidden() {
        page.push_str(" (paging unavailable)");
    } else if pagination.can_next() {
        page.push_str(" (next available)");
    }
    if pagination.can_previous() {
        page.push_str(" (previous available)");
    }
    format!(
        "Language:  {}\nSelection: {selection}\n{page}",
        session.language()
    )
}

// =============================================================================
// SHELL
// =============================================================================

/// Interactive search session.
pub struct Shell {
    controller: Arc<SearchController>,
    index: Arc<LocalFacetIndex>,
    view: ViewMode,
    json_mode: bool,
}

impl Shell {
    pub fn new(
        controller: SearchController,
        index: Arc<LocalFacetIndex>,
        view: ViewMode,
        json_mode: bool,
    ) -> Self {
        Self {
            controller: Arc::new(controller),
            index,
            view,
            json_mode,
        }
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(self) -> Result<(), CofiantError> {
        println!("Cofiant shell. Type 'help' for commands.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| CofiantError::Io(format!("Cannot read input: {e}")))?
        {
            match parse_line(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => self.apply(command).await,
                Err(message) => println!("{message}"),
            }
        }
        Ok(())
    }

    async fn apply(&self, command: ShellCommand) {
        let controller = Arc::clone(&self.controller);
        match command {
            ShellCommand::Set { facet, value } => {
                if let Err(e) = controller.set_raw(facet, &value).await {
                    println!("{e}");
                }
            }
            ShellCommand::Clear(Some(facet)) => controller.clear(facet).await,
            ShellCommand::Clear(None) => controller.clear_all().await,
            ShellCommand::Reset => controller.reset().await,
            ShellCommand::Run => self.spawn(async move { Ok(controller.search().await) }),
            ShellCommand::Next => self.spawn(async move { controller.next_page().await }),
            ShellCommand::Prev => self.spawn(async move { controller.previous_page().await }),
            ShellCommand::Lang(language) => {
                self.spawn(async move { Ok(controller.set_language(language).await) });
            }
            ShellCommand::Suggest { facet, text } => {
                let language = controller.with_session(|s| s.language()).await;
                match self.index.autocomplete(&text, facet, language) {
                    Suggestions::Closed => println!("Type a little more."),
                    Suggestions::Open(entries) if entries.is_empty() => println!("No matches."),
                    Suggestions::Open(entries) => {
                        for entry in entries {
                            println!("  {} ({})", entry.label(language), entry.id);
                        }
                    }
                }
            }
            ShellCommand::Show => println!("{}", controller.with_session(describe_session).await),
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit | ShellCommand::Empty => {}
        }
    }

    /// Run a search in the background and print whatever it resolves to.
    fn spawn<F>(&self, search: F)
    where
        F: Future<Output = Result<Option<SearchOutcome>, CofiantError>> + Send + 'static,
    {
        let view = self.view;
        let json_mode = self.json_mode;
        tokio::spawn(async move {
            match search.await {
                Ok(Some(outcome)) => println!("{}", format_outcome(&outcome, view, json_mode)),
                Ok(None) => {}
                Err(e) => println!("{e}"),
            }
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================
