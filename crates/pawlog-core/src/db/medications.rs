//! Medication and dose record database operations.

use chrono::NaiveTime;
use rusqlite::{params, OptionalExtension, Row};

use super::{
    format_timestamp, parse_date, parse_optional_date, parse_timestamp, Database, DbError,
    DbResult,
};
use crate::models::{Medication, MedicationDoseRecord, MedicationFrequency};

const MEDICATION_COLUMNS: &str = r#"
    id, pet_id, name, dosage, frequency, scheduled_times, start_date, end_date,
    active, refill_reminder, refill_date, created_at, updated_at
"#;

/// Raw medication row before JSON/date parsing.
struct MedicationRow {
    id: String,
    pet_id: String,
    name: String,
    dosage: String,
    frequency: String,
    scheduled_times: String,
    start_date: String,
    end_date: Option<String>,
    active: bool,
    refill_reminder: bool,
    refill_date: Option<String>,
    created_at: String,
    updated_at: String,
}

impl MedicationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            pet_id: row.get(1)?,
            name: row.get(2)?,
            dosage: row.get(3)?,
            frequency: row.get(4)?,
            scheduled_times: row.get(5)?,
            start_date: row.get(6)?,
            end_date: row.get(7)?,
            active: row.get(8)?,
            refill_reminder: row.get(9)?,
            refill_date: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

impl TryFrom<MedicationRow> for Medication {
    type Error = DbError;

    fn try_from(row: MedicationRow) -> Result<Self, Self::Error> {
        let frequency = MedicationFrequency::parse(&row.frequency)
            .ok_or_else(|| DbError::InvalidData(format!("frequency '{}'", row.frequency)))?;
        let scheduled_times: Vec<NaiveTime> = serde_json::from_str(&row.scheduled_times)?;

        Ok(Medication {
            id: row.id,
            pet_id: row.pet_id,
            name: row.name,
            dosage: row.dosage,
            frequency,
            scheduled_times,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_optional_date(row.end_date)?,
            active: row.active,
            refill_reminder: row.refill_reminder,
            refill_date: parse_optional_date(row.refill_date)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn dose_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, bool, Option<String>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

impl Database {
    /// Insert a new medication.
    pub fn insert_medication(&self, medication: &Medication) -> DbResult<()> {
        medication
            .validate()
            .map_err(|e| DbError::Constraint(e.to_string()))?;
        let times_json = serde_json::to_string(&medication.scheduled_times)?;

        self.conn.execute(
            &format!(
                "INSERT INTO medications ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                MEDICATION_COLUMNS
            ),
            params![
                medication.id,
                medication.pet_id,
                medication.name,
                medication.dosage,
                medication.frequency.as_str(),
                times_json,
                medication.start_date.to_string(),
                medication.end_date.map(|d| d.to_string()),
                medication.active,
                medication.refill_reminder,
                medication.refill_date.map(|d| d.to_string()),
                medication.created_at,
                medication.updated_at,
            ],
        )?;
        tracing::info!(
            medication_id = %medication.id,
            pet_id = %medication.pet_id,
            frequency = medication.frequency.as_str(),
            "medication created"
        );
        Ok(())
    }

    /// Update an existing medication.
    pub fn update_medication(&self, medication: &Medication) -> DbResult<bool> {
        medication
            .validate()
            .map_err(|e| DbError::Constraint(e.to_string()))?;
        let times_json = serde_json::to_string(&medication.scheduled_times)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE medications SET
                name = ?2,
                dosage = ?3,
                frequency = ?4,
                scheduled_times = ?5,
                start_date = ?6,
                end_date = ?7,
                active = ?8,
                refill_reminder = ?9,
                refill_date = ?10,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                medication.id,
                medication.name,
                medication.dosage,
                medication.frequency.as_str(),
                times_json,
                medication.start_date.to_string(),
                medication.end_date.map(|d| d.to_string()),
                medication.active,
                medication.refill_reminder,
                medication.refill_date.map(|d| d.to_string()),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a medication by ID.
    pub fn get_medication(&self, id: &str) -> DbResult<Option<Medication>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM medications WHERE id = ?", MEDICATION_COLUMNS),
                [id],
                MedicationRow::from_row,
            )
            .optional()?
            .map(Medication::try_from)
            .transpose()
    }

    /// Medications for a pet, active first, then by name.
    pub fn list_medications(&self, pet_id: &str) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM medications WHERE pet_id = ? ORDER BY active DESC, name",
            MEDICATION_COLUMNS
        ))?;
        let rows = stmt.query_map([pet_id], MedicationRow::from_row)?;

        let mut medications = Vec::new();
        for row in rows {
            medications.push(row?.try_into()?);
        }
        Ok(medications)
    }

    /// Delete a medication; its dose records go with it.
    pub fn delete_medication(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(medication_id = %id, "medication deleted");
        }
        Ok(rows_affected > 0)
    }

    /// Record a dose given or skipped.
    pub fn insert_dose_record(&self, record: &MedicationDoseRecord) -> DbResult<()> {
        record
            .validate()
            .map_err(|e| DbError::Constraint(e.to_string()))?;
        self.conn.execute(
            r#"
            INSERT INTO medication_doses (id, medication_id, timestamp, skipped, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.medication_id,
                format_timestamp(&record.timestamp),
                record.skipped,
                record.notes,
            ],
        )?;
        tracing::info!(
            medication_id = %record.medication_id,
            skipped = record.skipped,
            "dose recorded"
        );
        Ok(())
    }

    /// Dose records for a medication, newest first.
    pub fn list_dose_records(&self, medication_id: &str) -> DbResult<Vec<MedicationDoseRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, medication_id, timestamp, skipped, notes
            FROM medication_doses
            WHERE medication_id = ?
            ORDER BY timestamp DESC
            "#,
        )?;
        let rows = stmt.query_map([medication_id], dose_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, medication_id, timestamp, skipped, notes) = row?;
            records.push(MedicationDoseRecord {
                id,
                medication_id,
                timestamp: parse_timestamp(&timestamp)?,
                skipped,
                notes,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pet;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn setup() -> (Database, Medication) {
        let db = Database::open_in_memory().unwrap();
        let pet = Pet::new("Luna".into(), "cat".into());
        db.insert_pet(&pet).unwrap();

        let medication = Medication::new(
            pet.id,
            "Methimazole".into(),
            "2.5 mg".into(),
            MedicationFrequency::TwiceDaily,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
        .with_times(vec![
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        ]);
        (db, medication)
    }

    #[test]
    fn test_insert_and_get() {
        let (db, mut medication) = setup();
        medication.refill_reminder = true;
        medication.refill_date = NaiveDate::from_ymd_opt(2026, 3, 28);
        db.insert_medication(&medication).unwrap();

        let retrieved = db.get_medication(&medication.id).unwrap().unwrap();
        assert_eq!(retrieved, medication);
    }

    #[test]
    fn test_update_and_list() {
        let (db, mut medication) = setup();
        db.insert_medication(&medication).unwrap();

        medication.active = false;
        medication.scheduled_times.truncate(1);
        assert!(db.update_medication(&medication).unwrap());

        let listed = db.list_medications(&medication.pet_id).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].active);
        assert_eq!(listed[0].scheduled_times.len(), 1);
    }

    #[test]
    fn test_dose_records_newest_first() {
        let (db, medication) = setup();
        db.insert_medication(&medication).unwrap();

        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        db.insert_dose_record(&MedicationDoseRecord::given(medication.id.clone(), t0))
            .unwrap();
        db.insert_dose_record(&MedicationDoseRecord::skipped(
            medication.id.clone(),
            t0 + Duration::hours(12),
        ))
        .unwrap();

        let records = db.list_dose_records(&medication.id).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].skipped);
        assert_eq!(records[1].timestamp, t0);
    }

    #[test]
    fn test_delete_cascades_dose_records() {
        let (db, medication) = setup();
        db.insert_medication(&medication).unwrap();
        db.insert_dose_record(&MedicationDoseRecord::given(medication.id.clone(), Utc::now()))
            .unwrap();

        assert!(db.delete_medication(&medication.id).unwrap());
        assert!(db.list_dose_records(&medication.id).unwrap().is_empty());
    }

    #[test]
    fn test_dose_record_outside_storable_years_rejected() {
        let (db, medication) = setup();
        db.insert_medication(&medication).unwrap();

        let far_future = Utc.timestamp_millis_opt(300_000_000_000_000).unwrap();
        let record = MedicationDoseRecord::given(medication.id.clone(), far_future);
        assert!(matches!(db.insert_dose_record(&record), Err(DbError::Constraint(_))));
        assert!(db.list_dose_records(&medication.id).unwrap().is_empty());
    }
}
