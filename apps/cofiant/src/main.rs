//! # Cofiant
//!
//! Command-line entry point.
//!
//! ## Usage
//!
//! ```bash
//! # One search, printed as a list
//! cofiant search --occupation Q36180 --birth-place Q10690
//!
//! # Same search as a relationship graph, in Welsh
//! cofiant --lang cy search --occupation Q36180 --view graph
//!
//! # Interactive session
//! cofiant shell
//!
//! # Start the HTTP server
//! cofiant serve --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use cofiant::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing. COFIANT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("COFIANT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "cofiant=debug,tower_http=debug"
    } else {
        "cofiant=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so command output stays pipeable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Cofiant startup banner.
fn print_banner() {
    println!(
        r#"
   ___      __ _             _
  / __|___ / _(_)__ _ _ _  | |_
 | (__/ _ \  _| / _` | ' \ |  _|
  \___\___/_| |_\__,_|_||_| \__|

  Faceted biography search v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
