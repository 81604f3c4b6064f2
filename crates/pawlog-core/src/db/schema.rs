//! SQLite schema definition.

/// Complete database schema for the pet health journal.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Pets
-- ============================================================================

CREATE TABLE IF NOT EXISTS pets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    breed TEXT,
    birth_date TEXT,                             -- YYYY-MM-DD
    weight_kg REAL,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_pets_name ON pets(name);

-- ============================================================================
-- Health Events (append-mostly journal)
-- ============================================================================

CREATE TABLE IF NOT EXISTS health_events (
    id TEXT PRIMARY KEY,
    pet_id TEXT NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    category TEXT NOT NULL,
    timestamp TEXT NOT NULL,                     -- RFC 3339 UTC, millisecond precision
    notes TEXT NOT NULL DEFAULT '',
    duration_minutes TEXT,                       -- raw user text, parsed leniently
    meal_type TEXT,
    mood_level INTEGER CHECK (mood_level IS NULL OR mood_level BETWEEN 1 AND 5),
    symptom_type TEXT,
    severity_level INTEGER CHECK (severity_level IS NULL OR severity_level BETWEEN 1 AND 5),
    digestion_quality TEXT,
    amount TEXT,
    water_amount TEXT,
    appointment_type TEXT,
    location TEXT,
    needs_sync INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_events_pet_time ON health_events(pet_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_events_pet_category ON health_events(pet_id, category, timestamp);
CREATE INDEX IF NOT EXISTS idx_events_needs_sync ON health_events(needs_sync);

-- ============================================================================
-- Medications
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id TEXT PRIMARY KEY,
    pet_id TEXT NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    dosage TEXT NOT NULL DEFAULT '',
    frequency TEXT NOT NULL,                     -- daily, twice_daily, every_other_day, weekly, as_needed
    scheduled_times TEXT NOT NULL DEFAULT '[]',  -- JSON array of "HH:MM:SS"
    start_date TEXT NOT NULL,
    end_date TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    refill_reminder INTEGER NOT NULL DEFAULT 0,
    refill_date TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medications_pet ON medications(pet_id);

-- Dose log (immutable; removed only with its medication)
CREATE TABLE IF NOT EXISTS medication_doses (
    id TEXT PRIMARY KEY,
    medication_id TEXT NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
    timestamp TEXT NOT NULL,
    skipped INTEGER NOT NULL DEFAULT 0,
    notes TEXT
);

CREATE INDEX IF NOT EXISTS idx_doses_medication_time ON medication_doses(medication_id, timestamp);

CREATE TRIGGER IF NOT EXISTS medication_doses_immutable BEFORE UPDATE ON medication_doses
BEGIN
    SELECT RAISE(ABORT, 'Dose records are immutable');
END;
"#;
