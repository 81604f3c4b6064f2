//! Database layer for the pet health journal.

mod events;
mod medications;
mod pets;
mod schema;

pub use schema::*;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::models::{HealthEvent, Medication, MedicationDoseRecord};
use crate::store::{EventQuery, EventStore};

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        tracing::debug!("database schema initialized");
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl EventStore for Database {
    type Error = DbError;

    fn query_events(&self, query: &EventQuery) -> DbResult<Vec<HealthEvent>> {
        Database::query_events(self, query)
    }

    fn query_medications(&self, pet_id: &str) -> DbResult<Vec<Medication>> {
        self.list_medications(pet_id)
    }

    fn query_dose_records(&self, medication_id: &str) -> DbResult<Vec<MedicationDoseRecord>> {
        self.list_dose_records(medication_id)
    }
}

/// Fixed-width UTC form so lexical order matches chronological order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidData(format!("timestamp '{}': {}", raw, e)))
}

pub(crate) fn parse_date(raw: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DbError::InvalidData(format!("date '{}': {}", raw, e)))
}

pub(crate) fn parse_optional_date(raw: Option<String>) -> DbResult<Option<NaiveDate>> {
    raw.as_deref().map(parse_date).transpose()
}
