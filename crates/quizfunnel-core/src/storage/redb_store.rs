//! # redb-backed Response Storage
//!
//! A disk-backed store using the redb embedded database. Records are encoded
//! with postcard; each insert is its own write transaction.

use super::ResponseStore;
use crate::QuizError;
use crate::records::{Booking, NewBooking, NewQuizResponse, QuizResponse};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Table for quiz responses: id(u64) -> serialized QuizResponse bytes
const RESPONSES: TableDefinition<u64, &[u8]> = TableDefinition::new("responses");

/// Table for bookings: id(u64) -> serialized Booking bytes
const BOOKINGS: TableDefinition<u64, &[u8]> = TableDefinition::new("bookings");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_RESPONSE_ID: &str = "next_response_id";
const NEXT_BOOKING_ID: &str = "next_booking_id";

fn storage_err(e: impl std::fmt::Display) -> QuizError {
    QuizError::Storage(e.to_string())
}

/// A disk-backed response store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next id handed to a quiz response.
    next_response_id: u64,
    /// Next id handed to a booking.
    next_booking_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_response_id", &self.next_response_id)
            .field("next_booking_id", &self.next_booking_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a response database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            let _ = write_txn.open_table(RESPONSES).map_err(storage_err)?;
            let _ = write_txn.open_table(BOOKINGS).map_err(storage_err)?;
            let _ = write_txn.open_table(METADATA).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        let read_txn = db.begin_read().map_err(storage_err)?;
        let (next_response_id, next_booking_id) = {
            let table = read_txn.open_table(METADATA).map_err(storage_err)?;
            let read = |key: &str| -> Result<u64, QuizError> {
                Ok(table
                    .get(key)
                    .map_err(storage_err)?
                    .map(|v| v.value())
                    .unwrap_or(1))
            };
            (read(NEXT_RESPONSE_ID)?, read(NEXT_BOOKING_ID)?)
        };

        Ok(Self {
            db,
            next_response_id,
            next_booking_id,
        })
    }

    /// Write one record and bump its id counter in a single transaction.
    fn insert_record(
        &self,
        table: TableDefinition<'static, u64, &'static [u8]>,
        counter: &str,
        id: u64,
        bytes: &[u8],
    ) -> Result<(), QuizError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut records = write_txn.open_table(table).map_err(storage_err)?;
            records.insert(id, bytes).map_err(storage_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(storage_err)?;
            meta.insert(counter, id.saturating_add(1))
                .map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)
    }

    /// Read every record of a table in id order.
    fn list_records<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<'static, u64, &'static [u8]>,
    ) -> Result<Vec<T>, QuizError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let records = read_txn.open_table(table).map_err(storage_err)?;

        let mut out = Vec::new();
        for entry in records.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            let record = postcard::from_bytes(value.value())
                .map_err(|e| QuizError::Serialization(e.to_string()))?;
            out.push(record);
        }
        Ok(out)
    }
}

impl ResponseStore for RedbStore {
    fn insert_response(&mut self, response: NewQuizResponse) -> Result<QuizResponse, QuizError> {
        let stored = response.with_id(self.next_response_id);
        let bytes = postcard::to_allocvec(&stored)
            .map_err(|e| QuizError::Serialization(e.to_string()))?;
        self.insert_record(RESPONSES, NEXT_RESPONSE_ID, stored.id, &bytes)?;

        // Update in-memory state only after successful commit.
        self.next_response_id = stored.id.saturating_add(1);
        Ok(stored)
    }

    fn list_responses(&self) -> Result<Vec<QuizResponse>, QuizError> {
        self.list_records(RESPONSES)
    }

    fn insert_booking(&mut self, booking: NewBooking) -> Result<Booking, QuizError> {
        let stored = booking.with_id(self.next_booking_id);
        let bytes = postcard::to_allocvec(&stored)
            .map_err(|e| QuizError::Serialization(e.to_string()))?;
        self.insert_record(BOOKINGS, NEXT_BOOKING_ID, stored.id, &bytes)?;

        self.next_booking_id = stored.id.saturating_add(1);
        Ok(stored)
    }

    fn list_bookings(&self) -> Result<Vec<Booking>, QuizError> {
        self.list_records(BOOKINGS)
    }
}

// =============================================================================
// TESTS
// =============================================================================
