//! # Core Type Definitions
//!
//! This module contains the request-scoped inputs shared by every part of the
//! funnel:
//! - The respondent's answers (`AnswerSet`)
//! - Display labels for questions and answers (`LabelLookups`)
//! - Error types (`QuizError`)
//!
//! ## Ordering Guarantees
//!
//! `AnswerSet` keeps answers in the order they were first given. Highlights
//! and prompt formatting depend on this order, so it is never sorted.
//! Lookups go through a hash index, and deserialization stops after
//! `MAX_ANSWERS` entries.
//! Label lookups are plain `BTreeMap`s since they are only ever read by key.

use crate::primitives::{CONCERN_QUESTION, MAX_ANSWERS, NAME_QUESTION};
use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// ANSWER SET
// =============================================================================

/// A respondent's answers for one quiz attempt: question id -> answer.
///
/// `q0` carries the display name and `q10` the free-text concern; every
/// other question carries one of the codes `A`..`D`. Nothing here enforces
/// that, the classifier simply ignores what it does not recognize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    entries: IndexMap<String, String>,
}

impl AnswerSet {
    /// Create an empty answer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer.
    ///
    /// Answering the same question again replaces the value but keeps the
    /// position of the first answer.
    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.entries.insert(question.into(), answer.into());
    }

    /// Get the answer for a question.
    #[must_use]
    pub fn get(&self, question: &str) -> Option<&str> {
        self.entries.get(question).map(String::as_str)
    }

    /// Iterate over `(question, answer)` pairs in answer order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    /// Answers to the multiple-choice questions only (no name, no concern).
    pub fn choices(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(q, _)| *q != NAME_QUESTION && *q != CONCERN_QUESTION)
    }

    /// The name given in the reserved name question, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_QUESTION)
    }

    /// Number of answered questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no question has been answered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<Q: Into<String>, A: Into<String>> FromIterator<(Q, A)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (Q, A)>>(iter: I) -> Self {
        let mut answers = Self::new();
        for (q, a) in iter {
            answers.insert(q, a);
        }
        answers
    }
}

impl Serialize for AnswerSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (q, a) in &self.entries {
            map.serialize_entry(q, a)?;
        }
        map.end()
    }
}

struct AnswerSetVisitor;

impl<'de> Visitor<'de> for AnswerSetVisitor {
    type Value = AnswerSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of question ids to answers")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut answers = AnswerSet::new();
        while let Some((q, a)) = access.next_entry::<String, String>()? {
            if answers.len() >= MAX_ANSWERS && answers.get(&q).is_none() {
                return Err(de::Error::custom(format!(
                    "more than {} answers",
                    MAX_ANSWERS
                )));
            }
            answers.insert(q, a);
        }
        Ok(answers)
    }
}

impl<'de> Deserialize<'de> for AnswerSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AnswerSetVisitor)
    }
}

// =============================================================================
// LABEL LOOKUPS
// =============================================================================

/// Human-readable texts for questions and answers, as sent by the front-end.
///
/// Used for display only. Missing labels fall back to the raw id or code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelLookups {
    /// question id -> question text
    #[serde(default)]
    pub question_texts: BTreeMap<String, String>,
    /// question id -> answer code -> answer text
    #[serde(default)]
    pub answer_texts: BTreeMap<String, BTreeMap<String, String>>,
}

impl LabelLookups {
    /// Create empty lookups (every label falls back to its raw id).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text for a question, or the question id itself.
    #[must_use]
    pub fn question_label<'a>(&'a self, question: &'a str) -> &'a str {
        self.question_texts
            .get(question)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(question)
    }

    /// Text for an answer to a question, or the answer code itself.
    #[must_use]
    pub fn answer_label<'a>(&'a self, question: &str, answer: &'a str) -> &'a str {
        self.answer_texts
            .get(question)
            .and_then(|answers| answers.get(answer))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(answer)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the quiz funnel.
///
/// Classification and fallback rendering never fail; these errors come from
/// input validation at the API boundary and from storage.
#[derive(Debug, Error)]
pub enum QuizError {
    /// A required field is missing or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field exceeds its length limit.
    #[error("Field '{field}' is {len} bytes, maximum is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The submission carries no answers.
    #[error("Submission contains no answers")]
    EmptyAnswers,

    /// The submission carries more answers than the quiz has questions.
    #[error("Submission contains {0} answers, maximum is {1}")]
    TooManyAnswers(usize, usize),

    /// The request carries more question/answer labels than allowed.
    #[error("Request contains {0} labels, maximum is {1}")]
    TooManyLabels(usize, usize),

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A configuration value is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl QuizError {
    /// Whether the error was caused by the caller's input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::FieldTooLong { .. }
                | Self::EmptyAnswers
                | Self::TooManyAnswers(..)
                | Self::TooManyLabels(..)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
