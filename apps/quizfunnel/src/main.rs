//! # Quiz Funnel Server
//!
//! The main binary of the quiz funnel.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 apps/quizfunnel (THE BINARY)                 │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────┐  │
//! │  │    CLI      │    │  HTTP API   │    │   Generator     │  │
//! │  │   (clap)    │    │   (axum)    │    │   (reqwest)     │  │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬────────┘  │
//! │         └──────────────────┼────────────────────┘           │
//! │                            ▼                                │
//! │                  ┌──────────────────┐                       │
//! │                  │ quizfunnel-core  │                       │
//! │                  │   (THE LOGIC)    │                       │
//! │                  └──────────────────┘                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server with a persistent store
//! quizfunnel serve -D quizfunnel.redb --port 8080
//!
//! # Offline tools
//! quizfunnel classify -f answers.json
//! quizfunnel render -f answers.json --template cta
//! quizfunnel stats -D quizfunnel.redb --json-mode
//! ```

use clap::Parser;
use quizfunnel::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // QUIZFUNNEL_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("QUIZFUNNEL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "quizfunnel=debug,quizfunnel_core=debug,tower_http=debug"
    } else {
        "quizfunnel=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
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

fn print_banner() {
    println!(
        r#"
   ___        _         _____                       _
  / _ \ _   _(_)____   |  ___|   _ _ __  _ __   ___| |
 | | | | | | | |_  /   | |_ | | | | '_ \| '_ \ / _ \ |
 | |_| | |_| | |/ /    |  _|| |_| | | | | | | |  __/ |
  \__\_\\__,_|_/___|   |_|   \__,_|_| |_|_| |_|\___|_|

  Quiz Funnel Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
