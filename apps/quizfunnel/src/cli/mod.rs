//! # Quiz Funnel CLI Module
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `stats` - Show aggregate statistics of stored responses
//! - `render` - Render the fallback result for an answers file
//! - `classify` - Print the stage for an answers file

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use quizfunnel_core::QuizError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Quiz funnel server
///
/// Classifies quiz answers into a life stage and serves personalized results.
#[derive(Parser, Debug)]
#[command(name = "quizfunnel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the redb database (overrides configuration; omit for in-memory)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show aggregate statistics
    Stats,

    /// Render the fallback result for an answers file
    Render {
        /// JSON file: `{name, answers, questionTexts, answerTexts}`
        #[arg(short, long)]
        file: PathBuf,

        /// Template version (overrides configuration)
        #[arg(short, long)]
        template: Option<String>,
    },

    /// Classify an answers file
    Classify {
        /// JSON file: `{answers}` or a bare answers object
        #[arg(short, long)]
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), QuizError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.storage.database = Some(database);
    }
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_serve(&config, cli.quiet).await
        }
        Some(Commands::Stats) | None => cmd_stats(&config, json_mode),
        Some(Commands::Render { file, template }) => {
            if let Some(template) = template {
                config.render.template = template.parse()?;
            }
            cmd_render(&config, json_mode, &file)
        }
        Some(Commands::Classify { file }) => cmd_classify(json_mode, &file),
    }
}
