//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use quizfunnel_core::{
    AnswerSet, Booking, LabelLookups, NewBooking, NewQuizResponse, QuizError, Stage,
    determine_stage,
    primitives::{
        DEFAULT_BOOKING_SOURCE, MAX_ANSWER_LENGTH, MAX_ANSWERS, MAX_CONTACT_LENGTH,
        MAX_LABEL_LENGTH, MAX_LABELS, MAX_NAME_LENGTH, MAX_SOURCE_LENGTH,
    },
    render::resolve_name,
};
use serde::{Deserialize, Serialize};

/// Reject `value` if it is longer than `max` bytes.
fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), QuizError> {
    if value.len() > max {
        return Err(QuizError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// SUBMIT REQUEST/RESPONSE
// =============================================================================

/// Quiz submission request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Display name; falls back to the `q0` answer.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub answers: AnswerSet,
}

impl SubmitRequest {
    /// Validate the submission and classify it.
    ///
    /// # Validation
    ///
    /// - at least one answer, at most `MAX_ANSWERS`
    /// - every answer within `MAX_ANSWER_LENGTH`
    /// - the name within `MAX_NAME_LENGTH`
    pub fn to_new_response(&self, created_at: u64) -> Result<NewQuizResponse, QuizError> {
        if self.answers.is_empty() {
            return Err(QuizError::EmptyAnswers);
        }
        if self.answers.len() > MAX_ANSWERS {
            return Err(QuizError::TooManyAnswers(self.answers.len(), MAX_ANSWERS));
        }
        for (_, answer) in self.answers.iter() {
            check_len("answer", answer, MAX_ANSWER_LENGTH)?;
        }

        let raw_name = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.answers.name())
            .unwrap_or_default();
        let name = resolve_name(raw_name);
        check_len("name", name, MAX_NAME_LENGTH)?;

        Ok(NewQuizResponse {
            name: name.to_string(),
            answers: self.answers.clone(),
            result: determine_stage(&self.answers),
            created_at,
        })
    }
}

/// What the client learns about a stored submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedData {
    pub id: u64,
    pub result: Stage,
}

/// Quiz submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<SubmittedData>,
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn success(id: u64, result: Stage) -> Self {
        Self {
            success: true,
            message: "Answers submitted successfully".to_string(),
            data: Some(SubmittedData { id, result }),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// GENERATE REQUEST/RESPONSE
// =============================================================================

/// Personalized result request. Every field is optional, but sizes are
/// bounded by [`GenerateRequest::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub answers: AnswerSet,
    #[serde(flatten)]
    pub labels: LabelLookups,
}

impl GenerateRequest {
    /// Enforce the submission limits before anything reaches the prompt.
    ///
    /// Empty answers are allowed here; they classify as `A`.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.answers.len() > MAX_ANSWERS {
            return Err(QuizError::TooManyAnswers(self.answers.len(), MAX_ANSWERS));
        }
        check_len("name", &self.name, MAX_NAME_LENGTH)?;
        for (question, answer) in self.answers.iter() {
            check_len("question", question, MAX_LABEL_LENGTH)?;
            check_len("answer", answer, MAX_ANSWER_LENGTH)?;
        }

        let label_count = self.labels.question_texts.len()
            + self.labels.answer_texts.values().map(|a| a.len()).sum::<usize>();
        if label_count > MAX_LABELS {
            return Err(QuizError::TooManyLabels(label_count, MAX_LABELS));
        }
        for (question, text) in &self.labels.question_texts {
            check_len("questionTexts", question, MAX_LABEL_LENGTH)?;
            check_len("questionTexts", text, MAX_LABEL_LENGTH)?;
        }
        for (question, answers) in &self.labels.answer_texts {
            check_len("answerTexts", question, MAX_LABEL_LENGTH)?;
            for (code, text) in answers {
                check_len("answerTexts", code, MAX_LABEL_LENGTH)?;
                check_len("answerTexts", text, MAX_LABEL_LENGTH)?;
            }
        }
        Ok(())
    }
}

/// Where a generated result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Written by the completion service.
    Model,
    /// Rendered from static stage content.
    Fallback,
}

/// Personalized result response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// HTML fragment.
    pub result: String,
    pub stage: Stage,
    pub source: ResultSource,
    /// Set whenever the fallback was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub warning: Option<String>,
}

// =============================================================================
// BOOKING REQUEST/RESPONSE
// =============================================================================

/// Consultation booking request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Client-side timestamp, stored verbatim.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl BookingRequest {
    /// Validate and convert to a storable booking.
    ///
    /// Name and contact are required; blank counts as missing.
    pub fn to_new_booking(&self, created_at: u64) -> Result<NewBooking, QuizError> {
        let name = self.name.trim();
        let contact = self.contact.trim();
        if name.is_empty() {
            return Err(QuizError::MissingField("name"));
        }
        if contact.is_empty() {
            return Err(QuizError::MissingField("contact"));
        }
        check_len("name", name, MAX_NAME_LENGTH)?;
        check_len("contact", contact, MAX_CONTACT_LENGTH)?;

        let source = self
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_BOOKING_SOURCE);
        check_len("source", source, MAX_SOURCE_LENGTH)?;

        let requested_at = self
            .timestamp
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some(ts) = &requested_at {
            check_len("timestamp", ts, MAX_SOURCE_LENGTH)?;
        }

        Ok(NewBooking {
            name: name.to_string(),
            contact: contact.to_string(),
            source: source.to_string(),
            requested_at,
            created_at,
        })
    }
}

/// Consultation booking response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<Booking>,
    pub error: Option<String>,
}

impl BookingResponse {
    pub fn success(booking: Booking) -> Self {
        Self {
            success: true,
            message: "Booking received successfully".to_string(),
            data: Some(booking),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Generic failure body for endpoints without their own envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: error.into(),
        }
    }
}
