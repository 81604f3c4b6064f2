//! Pawlog Core Library
//!
//! On-device health analytics and medication reminders for a pet health journal.
//!
//! # Architecture
//!
//! ```text
//!   Owner logs events ──► [SQLite: health_events]      [SQLite: medications]
//!                                   │                            │
//!                          EventStore::query_events     create / edit / delete
//!                                   │                            │
//!                 ┌─────────────────▼─────────────────┐          ▼
//!                 │   Aggregator (current, previous)  │   ReminderScheduler
//!                 └─────────┬───────────────┬─────────┘   cancel, then plan
//!                           │               │                    │
//!                           ▼               ▼                    ▼
//!                   PatternDetector  ScoreCalculator     NotificationSink
//!                           │               │             (iOS notification
//!                           └──────┬────────┘                 center)
//!                                  ▼
//!                         Weekly digest screen
//! ```
//!
//! # Core Principle
//!
//! **Analytics never fail.** Empty journals, missing fields and malformed
//! numbers degrade to zero results. Only storage and the notification center
//! return errors, and those reach the caller typed so optimistic UI state can
//! be rolled back.
//!
//! # Modules
//!
//! - [`db`]: SQLite storage for pets, events, medications and dose records
//! - [`models`]: Domain types (Pet, HealthEvent, Medication, HealthScore, etc.)
//! - [`store`]: The `EventStore` repository seam consumed by analytics
//! - [`analytics`]: Aggregation, pattern detection, scoring and adherence
//! - [`reminders`]: Deterministic medication reminder planning
//! - [`config`]: Engine tunables
//! - [`logging`]: tracing subscriber setup

pub mod analytics;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod reminders;
pub mod store;

// Re-export commonly used types
pub use analytics::{InsightEngine, WeeklyInsights};
pub use config::EngineConfig;
pub use db::Database;
pub use models::{
    AdherenceRate, DateRange, EventCategory, HealthEvent, HealthScore, MealType, Medication,
    MedicationDoseRecord, MedicationFrequency, Pattern, PatternKind, Pet, ScoreLabel,
    WindowAggregate,
};
pub use reminders::{
    InMemoryScheduler, NotificationRequest, NotificationScheduler, NotificationTrigger,
    ReminderScheduler,
};
pub use store::{EventQuery, EventStore, SnapshotStore};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PawlogError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),
}

impl From<db::DbError> for PawlogError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => PawlogError::NotFound(what),
            db::DbError::Constraint(reason) => PawlogError::InvalidInput(reason),
            other => PawlogError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for PawlogError {
    fn from(e: serde_json::Error) -> Self {
        PawlogError::SerializationError(e.to_string())
    }
}

impl From<models::ModelError> for PawlogError {
    fn from(e: models::ModelError) -> Self {
        PawlogError::InvalidInput(e.to_string())
    }
}

impl From<config::ConfigError> for PawlogError {
    fn from(e: config::ConfigError) -> Self {
        PawlogError::ConfigError(e.to_string())
    }
}

impl From<reminders::ReminderError> for PawlogError {
    fn from(e: reminders::ReminderError) -> Self {
        PawlogError::NotificationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PawlogError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PawlogError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

/// Log a failed write before handing it to the caller.
fn logged<T>(operation: &'static str, result: db::DbResult<T>) -> Result<T, PawlogError> {
    result.map_err(|e| {
        tracing::warn!(operation, error = %e, "persistence write failed");
        e.into()
    })
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path with default settings.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PawlogCore>, PawlogError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(PawlogCore::new(db, EngineConfig::default())))
}

/// Open or create a database, tuning the engine with a JSON config.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<PawlogCore>, PawlogError> {
    let config = EngineConfig::from_json(&config_json)?;
    let db = Database::open(&path)?;
    Ok(Arc::new(PawlogCore::new(db, config)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PawlogCore>, PawlogError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PawlogCore::new(db, EngineConfig::default())))
}

/// Install the log subscriber. Returns false if one was already installed.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    logging::init_logging(filter.as_deref())
}

// =========================================================================
// Notification Sink (implemented by the host app)
// =========================================================================

/// The platform notification center, implemented in Swift.
///
/// Scheduling an identifier that is already pending must replace it.
#[uniffi::export(with_foreign)]
pub trait NotificationSink: Send + Sync {
    fn schedule(&self, request: FfiNotificationRequest);
    fn cancel(&self, identifiers: Vec<String>);
}

struct SinkScheduler(Arc<dyn NotificationSink>);

impl NotificationScheduler for SinkScheduler {
    fn schedule(&self, request: &NotificationRequest) -> reminders::ReminderResult<()> {
        self.0.schedule(request.clone().into());
        Ok(())
    }

    fn cancel(&self, identifiers: &[String]) -> reminders::ReminderResult<()> {
        self.0.cancel(identifiers.to_vec());
        Ok(())
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe engine wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PawlogCore {
    db: Arc<Mutex<Database>>,
    config: EngineConfig,
    engine: InsightEngine,
    sink: Mutex<Option<Arc<dyn NotificationSink>>>,
}

impl PawlogCore {
    fn new(db: Database, config: EngineConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            engine: InsightEngine::new(&config),
            config,
            sink: Mutex::new(None),
        }
    }

    fn reminder_scheduler(&self) -> Result<Option<ReminderScheduler<SinkScheduler>>, PawlogError> {
        let sink = self.sink.lock()?;
        Ok(sink
            .clone()
            .map(|sink| ReminderScheduler::new(&self.config, SinkScheduler(sink))))
    }

    /// Push a reminder change to the registered sink. Callers release the
    /// database lock first so the sink may call back into the core. The
    /// stored medication stays authoritative: a failed sync is logged.
    fn sync_reminders<T, F>(&self, medication_id: &str, apply: F) -> Result<(), PawlogError>
    where
        F: FnOnce(&ReminderScheduler<SinkScheduler>) -> reminders::ReminderResult<T>,
    {
        let Some(scheduler) = self.reminder_scheduler()? else {
            return Ok(());
        };
        if let Err(e) = apply(&scheduler) {
            tracing::warn!(medication_id, error = %e, "reminder sync failed");
        }
        Ok(())
    }

    fn require_pet(&self, db: &Database, pet_id: &str) -> Result<Pet, PawlogError> {
        db.get_pet(pet_id)?
            .ok_or_else(|| PawlogError::NotFound(format!("pet {}", pet_id)))
    }
}

#[uniffi::export]
impl PawlogCore {
    /// Register the platform notification center. Reminders are only
    /// scheduled while a sink is registered.
    pub fn set_notification_sink(&self, sink: Arc<dyn NotificationSink>) -> Result<(), PawlogError> {
        *self.sink.lock()? = Some(sink);
        Ok(())
    }

    // =========================================================================
    // Pet Operations
    // =========================================================================

    /// Create a new pet.
    pub fn create_pet(&self, name: String, species: String) -> Result<FfiPet, PawlogError> {
        let db = self.db.lock()?;
        let pet = Pet::new(name, species);
        logged("create_pet", db.insert_pet(&pet))?;
        Ok(pet.into())
    }

    /// Save edits to an existing pet. Returns false if it does not exist.
    pub fn update_pet(&self, pet: FfiPet) -> Result<bool, PawlogError> {
        let db = self.db.lock()?;
        let mut pet = Pet::try_from(pet)?;
        pet.updated_at = Utc::now().to_rfc3339();
        logged("update_pet", db.update_pet(&pet))
    }

    /// Get a pet by ID.
    pub fn get_pet(&self, pet_id: String) -> Result<Option<FfiPet>, PawlogError> {
        let db = self.db.lock()?;
        Ok(db.get_pet(&pet_id)?.map(|p| p.into()))
    }

    /// All pets, by name.
    pub fn list_pets(&self) -> Result<Vec<FfiPet>, PawlogError> {
        let db = self.db.lock()?;
        Ok(db.list_pets()?.into_iter().map(|p| p.into()).collect())
    }

    /// Delete a pet with its journal and medications.
    pub fn delete_pet(&self, pet_id: String) -> Result<bool, PawlogError> {
        let medications = {
            let db = self.db.lock()?;
            let medications = db.list_medications(&pet_id)?;
            if !logged("delete_pet", db.delete_pet(&pet_id))? {
                return Ok(false);
            }
            medications
        };
        for medication in &medications {
            self.sync_reminders(&medication.id, |scheduler| scheduler.on_deleted(medication))?;
        }
        Ok(true)
    }

    // =========================================================================
    // Event Operations
    // =========================================================================

    /// Log a new event. An empty `id` gets a fresh one.
    pub fn log_event(&self, event: FfiEvent) -> Result<FfiEvent, PawlogError> {
        let mut event = HealthEvent::try_from(event)?;
        let db = self.db.lock()?;
        if event.id.is_empty() {
            event.id = uuid::Uuid::new_v4().to_string();
        }
        logged("log_event", db.insert_event(&event))?;
        Ok(event.into())
    }

    /// Edit an event in place, keeping its identity and flagging it for sync.
    pub fn edit_event(&self, event: FfiEvent) -> Result<bool, PawlogError> {
        let db = self.db.lock()?;
        let mut edited = HealthEvent::try_from(event)?;
        let Some(existing) = db.get_event(&edited.id)? else {
            return Ok(false);
        };
        edited.created_at = existing.created_at;
        edited.mark_edited();
        logged("edit_event", db.update_event(&edited))
    }

    /// Delete an event.
    pub fn delete_event(&self, event_id: String) -> Result<bool, PawlogError> {
        let db = self.db.lock()?;
        logged("delete_event", db.delete_event(&event_id))
    }

    /// Events for a pet, newest first, optionally by category and
    /// within `[start_ms, end_ms)`.
    pub fn list_events(
        &self,
        pet_id: String,
        category: Option<String>,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    ) -> Result<Vec<FfiEvent>, PawlogError> {
        let db = self.db.lock()?;
        let mut query = EventQuery::for_pet(&pet_id);
        if let Some(raw) = category {
            query = query.category(parse_category(&raw)?);
        }
        query.range_start = start_ms.map(timestamp_from_ms).transpose()?;
        query.range_end = end_ms.map(timestamp_from_ms).transpose()?;
        Ok(db
            .query_events(&query)?
            .into_iter()
            .map(|e| e.into())
            .collect())
    }

    /// Events edited since the last sync.
    pub fn list_unsynced_events(&self) -> Result<Vec<FfiEvent>, PawlogError> {
        let db = self.db.lock()?;
        Ok(db
            .list_unsynced_events()?
            .into_iter()
            .map(|e| e.into())
            .collect())
    }

    /// Clear an event's sync flag.
    pub fn mark_event_synced(&self, event_id: String) -> Result<bool, PawlogError> {
        let db = self.db.lock()?;
        logged("mark_event_synced", db.mark_event_synced(&event_id))
    }

    // =========================================================================
    // Medication Operations
    // =========================================================================

    /// Add a medication and schedule its reminders.
    pub fn add_medication(&self, medication: FfiMedication) -> Result<FfiMedication, PawlogError> {
        let mut medication = Medication::try_from(medication)?;
        if medication.id.is_empty() {
            medication.id = uuid::Uuid::new_v4().to_string();
        }
        {
            let db = self.db.lock()?;
            logged("add_medication", db.insert_medication(&medication))?;
        }
        self.sync_reminders(&medication.id, |scheduler| scheduler.on_created(&medication))?;
        Ok(medication.into())
    }

    /// Save medication edits and reschedule its reminders.
    pub fn update_medication(&self, medication: FfiMedication) -> Result<bool, PawlogError> {
        let mut medication = Medication::try_from(medication)?;
        let previous = {
            let db = self.db.lock()?;
            let Some(previous) = db.get_medication(&medication.id)? else {
                return Ok(false);
            };
            medication.created_at = previous.created_at.clone();
            medication.touch();
            if !logged("update_medication", db.update_medication(&medication))? {
                return Ok(false);
            }
            previous
        };
        self.sync_reminders(&medication.id, |scheduler| {
            scheduler.on_updated(Some(&previous), &medication)
        })?;
        Ok(true)
    }

    /// Delete a medication, its dose history and its reminders.
    pub fn delete_medication(&self, medication_id: String) -> Result<bool, PawlogError> {
        let medication = {
            let db = self.db.lock()?;
            let Some(medication) = db.get_medication(&medication_id)? else {
                return Ok(false);
            };
            if !logged("delete_medication", db.delete_medication(&medication_id))? {
                return Ok(false);
            }
            medication
        };
        self.sync_reminders(&medication.id, |scheduler| scheduler.on_deleted(&medication))?;
        Ok(true)
    }

    /// Get a medication by ID.
    pub fn get_medication(
        &self,
        medication_id: String,
    ) -> Result<Option<FfiMedication>, PawlogError> {
        let db = self.db.lock()?;
        Ok(db.get_medication(&medication_id)?.map(|m| m.into()))
    }

    /// Medications for a pet, active first.
    pub fn list_medications(&self, pet_id: String) -> Result<Vec<FfiMedication>, PawlogError> {
        let db = self.db.lock()?;
        Ok(db
            .list_medications(&pet_id)?
            .into_iter()
            .map(|m| m.into())
            .collect())
    }

    /// Record a dose as given or skipped.
    pub fn record_dose(
        &self,
        medication_id: String,
        timestamp_ms: i64,
        skipped: bool,
        notes: Option<String>,
    ) -> Result<FfiDoseRecord, PawlogError> {
        let timestamp = timestamp_from_ms(timestamp_ms)?;
        let db = self.db.lock()?;
        let mut record = if skipped {
            MedicationDoseRecord::skipped(medication_id, timestamp)
        } else {
            MedicationDoseRecord::given(medication_id, timestamp)
        };
        record.notes = notes;
        logged("record_dose", db.insert_dose_record(&record))?;
        Ok(record.into())
    }

    /// Dose history for a medication, newest first.
    pub fn list_dose_records(
        &self,
        medication_id: String,
    ) -> Result<Vec<FfiDoseRecord>, PawlogError> {
        let db = self.db.lock()?;
        Ok(db
            .list_dose_records(&medication_id)?
            .into_iter()
            .map(|r| r.into())
            .collect())
    }

    /// Reminders a medication would register, without scheduling them.
    pub fn planned_reminders(
        &self,
        medication_id: String,
    ) -> Result<Vec<FfiNotificationRequest>, PawlogError> {
        let db = self.db.lock()?;
        let medication = db
            .get_medication(&medication_id)?
            .ok_or_else(|| PawlogError::NotFound(format!("medication {}", medication_id)))?;
        let planner = reminders::ReminderPlanner::new(&self.config);
        Ok(planner
            .plan(&medication)
            .into_iter()
            .map(|r| r.into())
            .collect())
    }

    // =========================================================================
    // Insight Operations
    // =========================================================================

    /// Weekly digest for a pet: both windows, patterns, score and streak.
    /// `now_ms` defaults to the current time.
    pub fn weekly_insights(
        &self,
        pet_id: String,
        now_ms: Option<i64>,
    ) -> Result<FfiWeeklyInsights, PawlogError> {
        let now = now_or(now_ms)?;
        let db = self.db.lock()?;
        let pet = self.require_pet(&db, &pet_id)?;
        let insights = self.engine.weekly_insights(&*db, &pet, now)?;
        Ok(insights.into())
    }

    /// Just the composite health score for the current window.
    pub fn health_score(
        &self,
        pet_id: String,
        now_ms: Option<i64>,
    ) -> Result<FfiHealthScore, PawlogError> {
        Ok(self.weekly_insights(pet_id, now_ms)?.score)
    }

    /// Adherence for each medication of a pet whose course covers `now_ms`.
    pub fn medication_adherence(
        &self,
        pet_id: String,
        now_ms: Option<i64>,
    ) -> Result<Vec<FfiAdherence>, PawlogError> {
        let now = now_or(now_ms)?;
        let db = self.db.lock()?;
        let rates = self.engine.adherence().rates_for_pet(&*db, &pet_id, now)?;
        Ok(rates.into_iter().map(|r| r.into()).collect())
    }
}

// =========================================================================
// Conversion Helpers
// =========================================================================

/// Millisecond timestamps are accepted for years 0000-9999 only.
fn timestamp_from_ms(ms: i64) -> Result<DateTime<Utc>, PawlogError> {
    let ts = Utc
        .timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| PawlogError::InvalidInput(format!("timestamp out of range: {}", ms)))?;
    models::check_timestamp("timestamp", &ts)?;
    Ok(ts)
}

fn now_or(now_ms: Option<i64>) -> Result<DateTime<Utc>, PawlogError> {
    now_ms.map(timestamp_from_ms).unwrap_or_else(|| Ok(Utc::now()))
}

fn parse_category(raw: &str) -> Result<EventCategory, PawlogError> {
    EventCategory::parse(raw)
        .ok_or_else(|| PawlogError::InvalidInput(format!("unknown category: {}", raw)))
}

fn parse_ffi_date(raw: &str) -> Result<NaiveDate, PawlogError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| PawlogError::InvalidInput(format!("date '{}': {}", raw, e)))
}

fn parse_ffi_time(raw: &str) -> Result<NaiveTime, PawlogError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| PawlogError::InvalidInput(format!("time '{}': {}", raw, e)))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe pet. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPet {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}

impl From<Pet> for FfiPet {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id,
            name: pet.name,
            species: pet.species,
            breed: pet.breed,
            birth_date: pet.birth_date.map(format_date),
            weight_kg: pet.weight_kg,
            notes: pet.notes,
        }
    }
}

impl TryFrom<FfiPet> for Pet {
    type Error = PawlogError;

    fn try_from(pet: FfiPet) -> Result<Self, Self::Error> {
        let mut converted = Pet::new(pet.name, pet.species);
        converted.id = pet.id;
        converted.breed = pet.breed;
        converted.birth_date = pet.birth_date.as_deref().map(parse_ffi_date).transpose()?;
        converted.weight_kg = pet.weight_kg;
        converted.notes = pet.notes;
        Ok(converted)
    }
}

/// FFI-safe health event. Timestamps are Unix milliseconds and
/// `category` is a snake_case key such as `"walk"` or `"medication_note"`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEvent {
    pub id: String,
    pub pet_id: String,
    pub category: String,
    pub timestamp_ms: i64,
    pub notes: String,
    pub duration_minutes: Option<String>,
    pub meal_type: Option<String>,
    pub mood_level: Option<u8>,
    pub symptom_type: Option<String>,
    pub severity_level: Option<u8>,
    pub digestion_quality: Option<String>,
    pub amount: Option<String>,
    pub water_amount: Option<String>,
    pub appointment_type: Option<String>,
    pub location: Option<String>,
    pub needs_sync: bool,
}

impl From<HealthEvent> for FfiEvent {
    fn from(event: HealthEvent) -> Self {
        Self {
            id: event.id,
            pet_id: event.pet_id,
            category: event.category.as_str().to_string(),
            timestamp_ms: event.timestamp.timestamp_millis(),
            notes: event.notes,
            duration_minutes: event.duration_minutes,
            meal_type: event.meal_type.map(|m| m.as_str().to_string()),
            mood_level: event.mood_level,
            symptom_type: event.symptom_type,
            severity_level: event.severity_level,
            digestion_quality: event.digestion_quality,
            amount: event.amount,
            water_amount: event.water_amount,
            appointment_type: event.appointment_type,
            location: event.location,
            needs_sync: event.needs_sync,
        }
    }
}

impl TryFrom<FfiEvent> for HealthEvent {
    type Error = PawlogError;

    fn try_from(event: FfiEvent) -> Result<Self, Self::Error> {
        let category = parse_category(&event.category)?;
        let meal_type = match event.meal_type.as_deref() {
            Some(raw) => Some(
                MealType::parse(raw)
                    .ok_or_else(|| PawlogError::InvalidInput(format!("unknown meal type: {}", raw)))?,
            ),
            None => None,
        };

        let mut converted =
            HealthEvent::new(event.pet_id, category, timestamp_from_ms(event.timestamp_ms)?);
        converted.id = event.id;
        converted.notes = event.notes;
        converted.duration_minutes = event.duration_minutes;
        converted.meal_type = meal_type;
        converted.mood_level = event.mood_level;
        converted.symptom_type = event.symptom_type;
        converted.severity_level = event.severity_level;
        converted.digestion_quality = event.digestion_quality;
        converted.amount = event.amount;
        converted.water_amount = event.water_amount;
        converted.appointment_type = event.appointment_type;
        converted.location = event.location;
        converted.needs_sync = event.needs_sync;
        Ok(converted)
    }
}

/// FFI-safe medication. Times are `HH:MM`, dates `YYYY-MM-DD`, and
/// `frequency` is one of `daily`, `twice_daily`, `every_other_day`,
/// `weekly`, `as_needed`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub id: String,
    pub pet_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub scheduled_times: Vec<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub active: bool,
    pub refill_reminder: bool,
    pub refill_date: Option<String>,
}

impl From<Medication> for FfiMedication {
    fn from(medication: Medication) -> Self {
        Self {
            id: medication.id,
            pet_id: medication.pet_id,
            name: medication.name,
            dosage: medication.dosage,
            frequency: medication.frequency.as_str().to_string(),
            scheduled_times: medication
                .scheduled_times
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect(),
            start_date: format_date(medication.start_date),
            end_date: medication.end_date.map(format_date),
            active: medication.active,
            refill_reminder: medication.refill_reminder,
            refill_date: medication.refill_date.map(format_date),
        }
    }
}

impl TryFrom<FfiMedication> for Medication {
    type Error = PawlogError;

    fn try_from(medication: FfiMedication) -> Result<Self, Self::Error> {
        let frequency = MedicationFrequency::parse(&medication.frequency).ok_or_else(|| {
            PawlogError::InvalidInput(format!("unknown frequency: {}", medication.frequency))
        })?;
        let times = medication
            .scheduled_times
            .iter()
            .map(|t| parse_ffi_time(t))
            .collect::<Result<Vec<_>, _>>()?;

        let mut converted = Medication::new(
            medication.pet_id,
            medication.name,
            medication.dosage,
            frequency,
            parse_ffi_date(&medication.start_date)?,
        )
        .with_times(times);
        converted.id = medication.id;
        converted.end_date = medication.end_date.as_deref().map(parse_ffi_date).transpose()?;
        converted.active = medication.active;
        converted.refill_reminder = medication.refill_reminder;
        converted.refill_date = medication
            .refill_date
            .as_deref()
            .map(parse_ffi_date)
            .transpose()?;
        Ok(converted)
    }
}

/// FFI-safe dose record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoseRecord {
    pub id: String,
    pub medication_id: String,
    pub timestamp_ms: i64,
    pub skipped: bool,
    pub notes: Option<String>,
}

impl From<MedicationDoseRecord> for FfiDoseRecord {
    fn from(record: MedicationDoseRecord) -> Self {
        Self {
            id: record.id,
            medication_id: record.medication_id,
            timestamp_ms: record.timestamp.timestamp_millis(),
            skipped: record.skipped,
            notes: record.notes,
        }
    }
}

/// FFI-safe detected pattern.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPattern {
    /// `positive`, `warning`, `alert` or `info`
    pub kind: String,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

impl From<Pattern> for FfiPattern {
    fn from(pattern: Pattern) -> Self {
        Self {
            kind: pattern.kind.as_str().to_string(),
            title: pattern.title,
            description: pattern.description,
            recommendation: pattern.recommendation,
        }
    }
}

/// FFI-safe health score.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiHealthScore {
    pub overall: u8,
    pub activity: u8,
    pub nutrition: u8,
    pub wellness: u8,
    pub consistency: u8,
    pub label: String,
}

impl From<HealthScore> for FfiHealthScore {
    fn from(score: HealthScore) -> Self {
        Self {
            overall: score.overall,
            activity: score.activity,
            nutrition: score.nutrition,
            wellness: score.wellness,
            consistency: score.consistency,
            label: score.label.as_str().to_string(),
        }
    }
}

/// FFI-safe window summary (counts only).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiWindowSummary {
    pub start_ms: i64,
    pub end_ms: i64,
    pub total_events: u32,
    pub meals_count: u32,
    pub activity_minutes: u32,
    pub symptom_count: u32,
    pub average_mood: Option<f64>,
    pub poor_digestion_count: u32,
    pub water_logs: u32,
    pub logged_days: u32,
}

impl From<WindowAggregate> for FfiWindowSummary {
    fn from(window: WindowAggregate) -> Self {
        Self {
            start_ms: window.range.start.timestamp_millis(),
            end_ms: window.range.end.timestamp_millis(),
            total_events: window.total_events,
            meals_count: window.meals_count,
            activity_minutes: window.activity_minutes,
            symptom_count: window.symptom_events.len() as u32,
            average_mood: window.average_mood,
            poor_digestion_count: window.poor_digestion_events.len() as u32,
            water_logs: window.water_logs,
            logged_days: window.logged_days,
        }
    }
}

/// FFI-safe weekly digest.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiWeeklyInsights {
    pub current: FfiWindowSummary,
    pub previous: FfiWindowSummary,
    pub patterns: Vec<FfiPattern>,
    pub score: FfiHealthScore,
    pub logging_streak: u32,
}

impl From<WeeklyInsights> for FfiWeeklyInsights {
    fn from(insights: WeeklyInsights) -> Self {
        Self {
            current: insights.current.into(),
            previous: insights.previous.into(),
            patterns: insights.patterns.into_iter().map(|p| p.into()).collect(),
            score: insights.score.into(),
            logging_streak: insights.logging_streak,
        }
    }
}

/// FFI-safe adherence summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAdherence {
    pub medication_id: String,
    pub rate: f64,
    pub percent: u8,
    pub expected_doses: u32,
    pub actual_doses: u32,
    pub skipped_doses: u32,
    pub lookback_days: u32,
}

impl From<AdherenceRate> for FfiAdherence {
    fn from(rate: AdherenceRate) -> Self {
        Self {
            percent: rate.percent(),
            medication_id: rate.medication_id,
            rate: rate.rate,
            expected_doses: rate.expected_doses,
            actual_doses: rate.actual_doses,
            skipped_doses: rate.skipped_doses,
            lookback_days: rate.lookback_days,
        }
    }
}

/// FFI-safe notification trigger.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiTrigger {
    /// Local date-time as `YYYY-MM-DDTHH:MM:SS`.
    OneTime { at: String },
    DailyRepeating { hour: u32, minute: u32 },
    /// `weekday` counts from 1 = Sunday, as Foundation's Calendar does.
    WeekdayRepeating { weekday: u32, hour: u32, minute: u32 },
}

impl From<NotificationTrigger> for FfiTrigger {
    fn from(trigger: NotificationTrigger) -> Self {
        match trigger {
            NotificationTrigger::OneTime { at } => FfiTrigger::OneTime {
                at: at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            },
            NotificationTrigger::DailyRepeating { hour, minute } => {
                FfiTrigger::DailyRepeating { hour, minute }
            }
            NotificationTrigger::WeekdayRepeating {
                weekday,
                hour,
                minute,
            } => FfiTrigger::WeekdayRepeating {
                weekday: weekday.number_from_sunday(),
                hour,
                minute,
            },
        }
    }
}

/// FFI-safe notification request.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiNotificationRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub trigger: FfiTrigger,
}

impl From<NotificationRequest> for FfiNotificationRequest {
    fn from(request: NotificationRequest) -> Self {
        Self {
            identifier: request.identifier,
            title: request.title,
            body: request.body,
            trigger: request.trigger.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        pending: Mutex<Vec<FfiNotificationRequest>>,
    }

    impl NotificationSink for RecordingSink {
        fn schedule(&self, request: FfiNotificationRequest) {
            let mut pending = self.pending.lock().unwrap();
            pending.retain(|r| r.identifier != request.identifier);
            pending.push(request);
        }

        fn cancel(&self, identifiers: Vec<String>) {
            self.pending
                .lock()
                .unwrap()
                .retain(|r| !identifiers.contains(&r.identifier));
        }
    }

    /// Reads stored medications back through the core from inside sink
    /// callbacks, recording how many it saw per call.
    #[derive(Default)]
    struct ReadBackSink {
        core: Mutex<Option<Arc<PawlogCore>>>,
        observed: Mutex<Vec<(&'static str, usize)>>,
    }

    impl ReadBackSink {
        fn read_back(&self, call: &'static str) {
            let core = self.core.lock().unwrap().clone();
            if let Some(core) = core {
                let stored: usize = core
                    .list_pets()
                    .unwrap()
                    .into_iter()
                    .map(|pet| core.list_medications(pet.id).unwrap().len())
                    .sum();
                self.observed.lock().unwrap().push((call, stored));
            }
        }

        fn take(&self) -> Vec<(&'static str, usize)> {
            std::mem::take(&mut *self.observed.lock().unwrap())
        }
    }

    impl NotificationSink for ReadBackSink {
        fn schedule(&self, _request: FfiNotificationRequest) {
            self.read_back("schedule");
        }

        fn cancel(&self, _identifiers: Vec<String>) {
            self.read_back("cancel");
        }
    }

    fn ms(rfc3339: &str) -> i64 {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .timestamp_millis()
    }

    fn ffi_event(pet_id: &str, category: &str, at: &str) -> FfiEvent {
        FfiEvent {
            id: String::new(),
            pet_id: pet_id.into(),
            category: category.into(),
            timestamp_ms: ms(at),
            notes: String::new(),
            duration_minutes: None,
            meal_type: None,
            mood_level: None,
            symptom_type: None,
            severity_level: None,
            digestion_quality: None,
            amount: None,
            water_amount: None,
            appointment_type: None,
            location: None,
            needs_sync: false,
        }
    }

    fn ffi_medication(pet_id: &str, times: &[&str]) -> FfiMedication {
        FfiMedication {
            id: String::new(),
            pet_id: pet_id.into(),
            name: "Apoquel".into(),
            dosage: "16 mg".into(),
            frequency: "daily".into(),
            scheduled_times: times.iter().map(|t| t.to_string()).collect(),
            start_date: "2026-06-01".into(),
            end_date: None,
            active: true,
            refill_reminder: false,
            refill_date: None,
        }
    }

    #[test]
    fn test_pet_round_trip() {
        let core = open_database_in_memory().unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();

        let mut edited = pet.clone();
        edited.birth_date = Some("2020-03-14".into());
        edited.weight_kg = Some(12.5);
        assert!(core.update_pet(edited).unwrap());

        let loaded = core.get_pet(pet.id.clone()).unwrap().unwrap();
        assert_eq!(loaded.birth_date.as_deref(), Some("2020-03-14"));
        assert_eq!(core.list_pets().unwrap().len(), 1);
    }

    #[test]
    fn test_log_and_edit_event() {
        let core = open_database_in_memory().unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();

        let mut walk = ffi_event(&pet.id, "walk", "2026-06-05T08:00:00Z");
        walk.duration_minutes = Some("30".into());
        let logged = core.log_event(walk).unwrap();
        assert!(!logged.id.is_empty());
        assert!(!logged.needs_sync);

        let mut edited = logged.clone();
        edited.duration_minutes = Some("45".into());
        assert!(core.edit_event(edited).unwrap());

        let events = core
            .list_events(pet.id.clone(), Some("walk".into()), None, None)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, logged.id);
        assert_eq!(events[0].duration_minutes.as_deref(), Some("45"));
        assert!(events[0].needs_sync);
    }

    #[test]
    fn test_invalid_inputs_are_typed_errors() {
        let core = open_database_in_memory().unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();

        let bad_category = ffi_event(&pet.id, "skydiving", "2026-06-05T08:00:00Z");
        assert!(matches!(
            core.log_event(bad_category),
            Err(PawlogError::InvalidInput(_))
        ));

        let mut bad_mood = ffi_event(&pet.id, "mood", "2026-06-05T08:00:00Z");
        bad_mood.mood_level = Some(9);
        assert!(matches!(
            core.log_event(bad_mood),
            Err(PawlogError::InvalidInput(_))
        ));

        assert!(matches!(
            core.weekly_insights("missing".into(), None),
            Err(PawlogError::NotFound(_))
        ));
    }

    #[test]
    fn test_edge_of_range_now_is_rejected_and_core_stays_usable() {
        let core = open_database_in_memory().unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();
        let earliest = DateTime::<Utc>::MIN_UTC.timestamp_millis();
        let latest = DateTime::<Utc>::MAX_UTC.timestamp_millis();

        for now_ms in [earliest, latest] {
            assert!(matches!(
                core.weekly_insights(pet.id.clone(), Some(now_ms)),
                Err(PawlogError::InvalidInput(_))
            ));
            assert!(matches!(
                core.health_score(pet.id.clone(), Some(now_ms)),
                Err(PawlogError::InvalidInput(_))
            ));
            assert!(matches!(
                core.medication_adherence(pet.id.clone(), Some(now_ms)),
                Err(PawlogError::InvalidInput(_))
            ));
        }

        assert_eq!(core.list_pets().unwrap().len(), 1);
        let insights = core
            .weekly_insights(pet.id.clone(), Some(ms("0001-01-20T00:00:00Z")))
            .unwrap();
        assert_eq!(insights.score.overall, 0);
    }

    #[test]
    fn test_five_digit_year_timestamps_rejected() {
        let core = open_database_in_memory().unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();
        core.log_event(ffi_event(&pet.id, "water", "2026-06-05T08:00:00Z"))
            .unwrap();

        let mut far_future = ffi_event(&pet.id, "water", "2026-06-05T08:00:00Z");
        far_future.timestamp_ms = 300_000_000_000_000;
        assert!(matches!(
            core.log_event(far_future),
            Err(PawlogError::InvalidInput(_))
        ));
        assert_eq!(
            core.list_events(pet.id.clone(), None, None, None).unwrap().len(),
            1
        );

        let med = core.add_medication(ffi_medication(&pet.id, &["08:00"])).unwrap();
        assert!(matches!(
            core.record_dose(med.id.clone(), 300_000_000_000_000, false, None),
            Err(PawlogError::InvalidInput(_))
        ));
        assert!(core.list_dose_records(med.id).unwrap().is_empty());
    }

    #[test]
    fn test_medication_lifecycle_drives_sink() {
        let core = open_database_in_memory().unwrap();
        let sink = Arc::new(RecordingSink::default());
        core.set_notification_sink(sink.clone()).unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();

        let med = core
            .add_medication(ffi_medication(&pet.id, &["08:00", "20:00"]))
            .unwrap();
        assert_eq!(sink.pending.lock().unwrap().len(), 2);

        let mut edited = med.clone();
        edited.scheduled_times = vec!["09:30".into()];
        assert!(core.update_medication(edited).unwrap());
        {
            let pending = sink.pending.lock().unwrap();
            assert_eq!(pending.len(), 1);
            assert_eq!(
                pending[0].trigger,
                FfiTrigger::DailyRepeating { hour: 9, minute: 30 }
            );
        }

        assert!(core.delete_medication(med.id.clone()).unwrap());
        assert!(sink.pending.lock().unwrap().is_empty());
    }

    #[test]
    fn test_adherence_through_ffi() {
        let core = open_database_in_memory().unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();
        let med = core
            .add_medication(ffi_medication(&pet.id, &["08:00", "20:00"]))
            .unwrap();

        for day in 1..=5 {
            for hour in ["08", "20"] {
                let at = format!("2026-06-{:02}T{}:00:00Z", day + 2, hour);
                core.record_dose(med.id.clone(), ms(&at), false, None)
                    .unwrap();
            }
        }

        let rates = core
            .medication_adherence(pet.id.clone(), Some(ms("2026-06-08T21:00:00Z")))
            .unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].expected_doses, 14);
        assert_eq!(rates[0].actual_doses, 10);
        assert_eq!(rates[0].percent, 71);
    }

    #[test]
    fn test_empty_journal_insights() {
        let core = open_database_in_memory().unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();

        let insights = core.weekly_insights(pet.id, None).unwrap();
        assert_eq!(insights.score.overall, 0);
        assert_eq!(insights.score.label, "Needs Attention");
        assert!(insights.patterns.is_empty());
    }

    #[test]
    fn test_weekday_trigger_counts_from_sunday() {
        let trigger: FfiTrigger = NotificationTrigger::WeekdayRepeating {
            weekday: chrono::Weekday::Sun,
            hour: 9,
            minute: 0,
        }
        .into();
        assert_eq!(
            trigger,
            FfiTrigger::WeekdayRepeating {
                weekday: 1,
                hour: 9,
                minute: 0
            }
        );
    }

    #[test]
    fn test_sink_may_call_back_into_core() {
        let core = open_database_in_memory().unwrap();
        let sink = Arc::new(ReadBackSink::default());
        *sink.core.lock().unwrap() = Some(core.clone());
        core.set_notification_sink(sink.clone()).unwrap();
        let pet = core.create_pet("Biscuit".into(), "dog".into()).unwrap();

        let med = core.add_medication(ffi_medication(&pet.id, &["08:00"])).unwrap();
        assert_eq!(sink.take(), vec![("schedule", 1)]);

        let mut edited = med.clone();
        edited.scheduled_times = vec!["09:00".into()];
        assert!(core.update_medication(edited).unwrap());
        assert_eq!(sink.take(), vec![("cancel", 1), ("schedule", 1)]);

        // Reminders are cancelled only once the row is gone.
        assert!(core.delete_medication(med.id.clone()).unwrap());
        assert_eq!(sink.take(), vec![("cancel", 0)]);
        assert!(!core.delete_medication(med.id).unwrap());
        assert!(sink.take().is_empty());

        core.add_medication(ffi_medication(&pet.id, &["08:00"])).unwrap();
        core.add_medication(ffi_medication(&pet.id, &["20:00"])).unwrap();
        sink.take();
        assert!(core.delete_pet(pet.id.clone()).unwrap());
        assert_eq!(sink.take(), vec![("cancel", 0), ("cancel", 0)]);
        assert!(!core.delete_pet(pet.id).unwrap());
        assert!(sink.take().is_empty());

        *sink.core.lock().unwrap() = None;
    }
}
