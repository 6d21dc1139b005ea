//! # Storage Module
//!
//! Insert and list-all storage for quiz responses and bookings.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore`, volatile, used for tests and when no database
//!   path is configured
//! - `Persistent`: `RedbStore`, disk-backed ACID storage

mod redb_store;

pub use redb_store::RedbStore;

use crate::QuizError;
use crate::records::{Booking, NewBooking, NewQuizResponse, QuizResponse};
use std::path::Path;

/// Operations every storage backend provides.
///
/// Ids are assigned sequentially starting at 1, separately for responses
/// and bookings. Lists come back in insertion order.
pub trait ResponseStore {
    /// Store a quiz response and return it with its id.
    fn insert_response(&mut self, response: NewQuizResponse) -> Result<QuizResponse, QuizError>;

    /// All stored quiz responses.
    fn list_responses(&self) -> Result<Vec<QuizResponse>, QuizError>;

    /// Store a booking and return it with its id.
    fn insert_booking(&mut self, booking: NewBooking) -> Result<Booking, QuizError>;

    /// All stored bookings.
    fn list_bookings(&self) -> Result<Vec<Booking>, QuizError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile store backed by two vectors.
#[derive(Debug, Default)]
pub struct MemoryStore {
    responses: Vec<QuizResponse>,
    bookings: Vec<Booking>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseStore for MemoryStore {
    fn insert_response(&mut self, response: NewQuizResponse) -> Result<QuizResponse, QuizError> {
        let id = (self.responses.len() as u64).saturating_add(1);
        let stored = response.with_id(id);
        self.responses.push(stored.clone());
        Ok(stored)
    }

    fn list_responses(&self) -> Result<Vec<QuizResponse>, QuizError> {
        Ok(self.responses.clone())
    }

    fn insert_booking(&mut self, booking: NewBooking) -> Result<Booking, QuizError> {
        let id = (self.bookings.len() as u64).saturating_add(1);
        let stored = booking.with_id(id);
        self.bookings.push(stored.clone());
        Ok(stored)
    }

    fn list_bookings(&self) -> Result<Vec<Booking>, QuizError> {
        Ok(self.bookings.clone())
    }
}

// =============================================================================
// STORAGE (backend selection)
// =============================================================================

/// The configured storage backend.
#[derive(Debug)]
pub enum Storage {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for Storage {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl Storage {
    /// Create volatile storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open or create a redb database at the given path.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        Ok(Self::Persistent(RedbStore::open(path)?))
    }

    /// Whether records survive a restart.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }
}

impl ResponseStore for Storage {
    fn insert_response(&mut self, response: NewQuizResponse) -> Result<QuizResponse, QuizError> {
        match self {
            Self::InMemory(store) => store.insert_response(response),
            Self::Persistent(store) => store.insert_response(response),
        }
    }

    fn list_responses(&self) -> Result<Vec<QuizResponse>, QuizError> {
        match self {
            Self::InMemory(store) => store.list_responses(),
            Self::Persistent(store) => store.list_responses(),
        }
    }

    fn insert_booking(&mut self, booking: NewBooking) -> Result<Booking, QuizError> {
        match self {
            Self::InMemory(store) => store.insert_booking(booking),
            Self::Persistent(store) => store.insert_booking(booking),
        }
    }

    fn list_bookings(&self) -> Result<Vec<Booking>, QuizError> {
        match self {
            Self::InMemory(store) => store.list_bookings(),
            Self::Persistent(store) => store.list_bookings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerSet, Stage};

    fn new_response(name: &str) -> NewQuizResponse {
        NewQuizResponse {
            name: name.to_string(),
            answers: [("q1", "B")].into_iter().collect::<AnswerSet>(),
            result: Stage::B,
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn memory_store_assigns_sequential_ids() {
        let mut store = Storage::in_memory();
        let first = store.insert_response(new_response("Анна")).expect("insert");
        let second = store.insert_response(new_response("Мария")).expect("insert");
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(store.list_responses().expect("list").len(), 2);
        assert!(!store.is_persistent());
    }

    #[test]
    fn bookings_are_pending_on_insert() {
        let mut store = MemoryStore::new();
        let booking = store
            .insert_booking(NewBooking {
                name: "Анна".to_string(),
                contact: "@anna".to_string(),
                source: "quiz".to_string(),
                requested_at: None,
                created_at: 1,
            })
            .expect("insert");
        assert_eq!(booking.id, 1);
        assert_eq!(booking.status, "pending");
        assert_eq!(store.list_bookings().expect("list"), vec![booking]);
    }
}
