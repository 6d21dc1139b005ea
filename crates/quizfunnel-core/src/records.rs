//! # Stored Records
//!
//! What the funnel persists: classified quiz responses and consultation
//! bookings. `New*` types are what callers hand to a store; the store assigns
//! the id.

use crate::primitives::BOOKING_STATUS_PENDING;
use crate::{AnswerSet, Stage};
use serde::{Deserialize, Serialize};

// =============================================================================
// QUIZ RESPONSES
// =============================================================================

/// A quiz response about to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuizResponse {
    pub name: String,
    pub answers: AnswerSet,
    pub result: Stage,
    /// Unix seconds.
    pub created_at: u64,
}

/// A stored quiz response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: u64,
    pub name: String,
    pub answers: AnswerSet,
    pub result: Stage,
    pub created_at: u64,
}

impl NewQuizResponse {
    /// Attach the id assigned by the store.
    #[must_use]
    pub fn with_id(self, id: u64) -> QuizResponse {
        QuizResponse {
            id,
            name: self.name,
            answers: self.answers,
            result: self.result,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// BOOKINGS
// =============================================================================

/// A consultation booking about to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub name: String,
    pub contact: String,
    pub source: String,
    /// Timestamp sent by the client, kept verbatim.
    pub requested_at: Option<String>,
    /// Unix seconds.
    pub created_at: u64,
}

/// A stored consultation booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: u64,
    pub name: String,
    pub contact: String,
    pub source: String,
    pub status: String,
    pub requested_at: Option<String>,
    pub created_at: u64,
}

impl NewBooking {
    /// Attach the id assigned by the store. New bookings are always pending.
    #[must_use]
    pub fn with_id(self, id: u64) -> Booking {
        Booking {
            id,
            name: self.name,
            contact: self.contact,
            source: self.source,
            status: BOOKING_STATUS_PENDING.to_string(),
            requested_at: self.requested_at,
            created_at: self.created_at,
        }
    }
}
