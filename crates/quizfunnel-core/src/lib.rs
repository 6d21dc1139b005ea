//! # quizfunnel-core
//!
//! The synchronous heart of the quiz funnel - THE LOGIC.
//!
//! This crate decides everything that can be decided without the network:
//! which stage a respondent is in, what the fallback result says, what the
//! completion prompt looks like, and how stored responses aggregate.
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Classification and rendering are total: they never fail
//! - Stage content is static and compiled in
//! - Storage is insert + list-all; the app injects it, nothing is global

// =============================================================================
// MODULES
// =============================================================================

pub mod content;
pub mod primitives;
pub mod prompt;
pub mod records;
pub mod render;
pub mod stage;
pub mod stats;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AnswerSet, LabelLookups, QuizError};

// =============================================================================
// RE-EXPORTS: Classification & Rendering
// =============================================================================

pub use content::{StageContent, Timeline, content_for};
pub use prompt::{CompletionPrompt, build_prompt, format_answers};
pub use render::{FallbackRenderer, Highlight, TemplateVersion, escape_html, highlights};
pub use stage::{Stage, StageTally, determine_stage};

// =============================================================================
// RE-EXPORTS: Records, Storage & Stats
// =============================================================================

pub use records::{Booking, NewBooking, NewQuizResponse, QuizResponse};
pub use stats::{RecentResponse, StatsReport};
pub use storage::{MemoryStore, RedbStore, ResponseStore, Storage};
