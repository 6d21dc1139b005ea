//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState, GenerateRequest};
use crate::config::Config;
use crate::generator;
use quizfunnel_core::{
    AnswerSet, FallbackRenderer, QuizError, ResponseStore, Stage, StageTally, StatsReport,
    Storage,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Maximum size of an answers file (1 MB).
const MAX_ANSWERS_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), QuizError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| QuizError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(QuizError::Serialization(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve symlinks and `..`, and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, QuizError> {
    let canonical = path.canonicalize().map_err(|e| {
        QuizError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(QuizError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Parse an answers file.
///
/// Accepts a full generate request (`{name, answers, questionTexts,
/// answerTexts}`) or a bare `{"q1": "A", ...}` answers object.
fn parse_answers_json(text: &str) -> Result<GenerateRequest, QuizError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| QuizError::Serialization(e.to_string()))?;

    if value.get("answers").is_some() {
        serde_json::from_value(value).map_err(|e| QuizError::Serialization(e.to_string()))
    } else {
        let answers: AnswerSet =
            serde_json::from_value(value).map_err(|e| QuizError::Serialization(e.to_string()))?;
        Ok(GenerateRequest {
            answers,
            ..GenerateRequest::default()
        })
    }
}

fn read_answers_file(path: &Path) -> Result<GenerateRequest, QuizError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_ANSWERS_FILE_SIZE)?;
    let text = std::fs::read_to_string(&path)
        .map_err(|e| QuizError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
    parse_answers_json(&text)
}

/// Open the configured store: redb when a path is set, memory otherwise.
fn open_storage(config: &Config) -> Result<Storage, QuizError> {
    match &config.storage.database {
        Some(path) => Storage::with_redb(path),
        None => Ok(Storage::in_memory()),
    }
}

fn to_pretty_json(value: &impl serde::Serialize) -> Result<String, QuizError> {
    serde_json::to_string_pretty(value).map_err(|e| QuizError::Serialization(e.to_string()))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), QuizError> {
    println!("{}", to_pretty_json(value)?);
    Ok(())
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(config: &Config, quiet: bool) -> Result<(), QuizError> {
    let storage = open_storage(config)?;
    let persistent = storage.is_persistent();
    let generator = generator::from_config(&config.generator)
        .map_err(|e| QuizError::Config(e.to_string()))?;
    let model_enabled = generator.is_some();

    let state = AppState::new(storage)
        .with_generator(generator)
        .with_renderer(FallbackRenderer::new(config.render.template));

    if !quiet {
        println!("Configuration:");
        println!("  Address:   {}", config.server.addr());
        match &config.storage.database {
            Some(path) if persistent => println!("  Database:  {}", path.display()),
            _ => println!("  Database:  in-memory (responses are lost on exit)"),
        }
        if model_enabled {
            println!("  Generator: {}", config.generator.model);
        } else {
            println!("  Generator: disabled (fallback content only)");
        }
        println!("  Template:  {}", config.render.template.name());
        println!();
        println!("Endpoints:");
        println!("  GET  /health               - Health check");
        println!("  POST /api/submit           - Submit quiz answers");
        println!("  POST /api/generate-result  - Personalized result");
        println!("  POST /api/booking          - Book a consultation");
        println!("  GET  /api/stats            - Aggregate statistics");
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    api::run_server(&config.server.addr(), state).await
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Show aggregate statistics of the stored responses.
pub fn cmd_stats(config: &Config, json_mode: bool) -> Result<(), QuizError> {
    let storage = open_storage(config)?;
    let responses = storage.list_responses()?;
    let bookings = storage.list_bookings()?;
    let report = StatsReport::from_responses(&responses);

    if json_mode {
        return print_json(&report);
    }

    println!("Quiz Funnel Statistics");
    println!("======================");
    match &config.storage.database {
        Some(path) => println!("Database: {}", path.display()),
        None => println!("Database: in-memory"),
    }
    println!();
    println!("Responses: {}", report.total_responses);
    println!("Bookings:  {}", bookings.len());
    println!();
    println!("Results:");
    for stage in Stage::ALL {
        let count = report.results_distribution.get(&stage).copied().unwrap_or(0);
        println!("  {}  {:>5}  {}", stage, count, stage.content().title);
    }

    if !report.recent_responses.is_empty() {
        println!();
        println!("Recent:");
        for recent in &report.recent_responses {
            println!(
                "  #{:<5} {}  {}  ({})",
                recent.id, recent.result, recent.name, recent.created_at
            );
        }
    }

    Ok(())
}

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Print the fallback HTML for an answers file.
pub fn cmd_render(config: &Config, json_mode: bool, file: &Path) -> Result<(), QuizError> {
    let request = read_answers_file(file)?;
    let renderer = FallbackRenderer::new(config.render.template);
    let html = renderer.render(&request.name, &request.answers, &request.labels);

    if json_mode {
        print_json(&serde_json::json!({
            "stage": quizfunnel_core::determine_stage(&request.answers),
            "template": renderer.version().name(),
            "result": html,
        }))?;
    } else {
        println!("{}", html);
    }
    Ok(())
}

// =============================================================================
// CLASSIFY COMMAND
// =============================================================================

/// Print the stage and per-stage tally for an answers file.
pub fn cmd_classify(json_mode: bool, file: &Path) -> Result<(), QuizError> {
    let request = read_answers_file(file)?;
    let tally = StageTally::from_answers(&request.answers);
    let stage = tally.leader();

    if json_mode {
        let counts: serde_json::Map<String, serde_json::Value> = Stage::ALL
            .iter()
            .map(|s| (s.code().to_string(), tally.count(*s).into()))
            .collect();
        return print_json(&serde_json::json!({
            "stage": stage,
            "title": stage.content().title,
            "counts": counts,
            "counted": tally.total(),
        }));
    }

    println!("Stage: {} ({})", stage, stage.content().title);
    println!();
    for s in Stage::ALL {
        let marker = if s == stage { "*" } else { " " };
        println!("{} {}  {}", marker, s, tally.count(s));
    }
    println!();
    println!("Counted answers: {}", tally.total());
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
