//! Health event database operations.

use rusqlite::{params, types::ToSql, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database, DbError, DbResult};
use crate::models::{EventCategory, HealthEvent, MealType};
use crate::store::EventQuery;

const EVENT_COLUMNS: &str = r#"
    id, pet_id, category, timestamp, notes, duration_minutes, meal_type,
    mood_level, symptom_type, severity_level, digestion_quality, amount,
    water_amount, appointment_type, location, needs_sync, created_at, updated_at
"#;

/// Raw event row before enum/timestamp parsing.
struct EventRow {
    id: String,
    pet_id: String,
    category: String,
    timestamp: String,
    notes: String,
    duration_minutes: Option<String>,
    meal_type: Option<String>,
    mood_level: Option<u8>,
    symptom_type: Option<String>,
    severity_level: Option<u8>,
    digestion_quality: Option<String>,
    amount: Option<String>,
    water_amount: Option<String>,
    appointment_type: Option<String>,
    location: Option<String>,
    needs_sync: bool,
    created_at: String,
    updated_at: String,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            pet_id: row.get(1)?,
            category: row.get(2)?,
            timestamp: row.get(3)?,
            notes: row.get(4)?,
            duration_minutes: row.get(5)?,
            meal_type: row.get(6)?,
            mood_level: row.get(7)?,
            symptom_type: row.get(8)?,
            severity_level: row.get(9)?,
            digestion_quality: row.get(10)?,
            amount: row.get(11)?,
            water_amount: row.get(12)?,
            appointment_type: row.get(13)?,
            location: row.get(14)?,
            needs_sync: row.get(15)?,
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }
}

impl TryFrom<EventRow> for HealthEvent {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let category = EventCategory::parse(&row.category)
            .ok_or_else(|| DbError::InvalidData(format!("event category '{}'", row.category)))?;

        // Unknown meal slots are dropped rather than failing the whole read.
        let meal_type = row.meal_type.as_deref().and_then(MealType::parse);

        Ok(HealthEvent {
            id: row.id,
            pet_id: row.pet_id,
            category,
            timestamp: parse_timestamp(&row.timestamp)?,
            notes: row.notes,
            duration_minutes: row.duration_minutes,
            meal_type,
            mood_level: row.mood_level,
            symptom_type: row.symptom_type,
            severity_level: row.severity_level,
            digestion_quality: row.digestion_quality,
            amount: row.amount,
            water_amount: row.water_amount,
            appointment_type: row.appointment_type,
            location: row.location,
            needs_sync: row.needs_sync,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Database {
    /// Insert a new event.
    pub fn insert_event(&self, event: &HealthEvent) -> DbResult<()> {
        event
            .validate()
            .map_err(|e| DbError::Constraint(e.to_string()))?;

        self.conn.execute(
            &format!(
                "INSERT INTO health_events ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                EVENT_COLUMNS
            ),
            params![
                event.id,
                event.pet_id,
                event.category.as_str(),
                format_timestamp(&event.timestamp),
                event.notes,
                event.duration_minutes,
                event.meal_type.map(|m| m.as_str()),
                event.mood_level,
                event.symptom_type,
                event.severity_level,
                event.digestion_quality,
                event.amount,
                event.water_amount,
                event.appointment_type,
                event.location,
                event.needs_sync,
                event.created_at,
                event.updated_at,
            ],
        )?;
        tracing::info!(
            event_id = %event.id,
            pet_id = %event.pet_id,
            category = event.category.as_str(),
            "event logged"
        );
        Ok(())
    }

    /// Apply an edit to an existing event and flag it for re-sync.
    ///
    /// Returns false if no event with that ID exists.
    pub fn update_event(&self, event: &HealthEvent) -> DbResult<bool> {
        event
            .validate()
            .map_err(|e| DbError::Constraint(e.to_string()))?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE health_events SET
                category = ?2,
                timestamp = ?3,
                notes = ?4,
                duration_minutes = ?5,
                meal_type = ?6,
                mood_level = ?7,
                symptom_type = ?8,
                severity_level = ?9,
                digestion_quality = ?10,
                amount = ?11,
                water_amount = ?12,
                appointment_type = ?13,
                location = ?14,
                needs_sync = 1,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                event.id,
                event.category.as_str(),
                format_timestamp(&event.timestamp),
                event.notes,
                event.duration_minutes,
                event.meal_type.map(|m| m.as_str()),
                event.mood_level,
                event.symptom_type,
                event.severity_level,
                event.digestion_quality,
                event.amount,
                event.water_amount,
                event.appointment_type,
                event.location,
            ],
        )?;
        if rows_affected == 0 {
            tracing::warn!(event_id = %event.id, "edit for unknown event");
        }
        Ok(rows_affected > 0)
    }

    /// Get an event by ID.
    pub fn get_event(&self, id: &str) -> DbResult<Option<HealthEvent>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM health_events WHERE id = ?", EVENT_COLUMNS),
                [id],
                EventRow::from_row,
            )
            .optional()?
            .map(HealthEvent::try_from)
            .transpose()
    }

    /// Events matching the query, newest first.
    pub fn query_events(&self, query: &EventQuery) -> DbResult<Vec<HealthEvent>> {
        let mut sql = format!("SELECT {} FROM health_events WHERE pet_id = ?1", EVENT_COLUMNS);
        let mut params_vec: Vec<Box<dyn ToSql>> = vec![Box::new(query.pet_id.clone())];

        if let Some(category) = query.category {
            params_vec.push(Box::new(category.as_str()));
            sql.push_str(&format!(" AND category = ?{}", params_vec.len()));
        }
        if let Some(start) = query.range_start {
            params_vec.push(Box::new(format_timestamp(&start)));
            sql.push_str(&format!(" AND timestamp >= ?{}", params_vec.len()));
        }
        if let Some(end) = query.range_end {
            params_vec.push(Box::new(format_timestamp(&end)));
            sql.push_str(&format!(" AND timestamp < ?{}", params_vec.len()));
        }
        sql.push_str(" ORDER BY timestamp DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), EventRow::from_row)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?.try_into()?);
        }
        Ok(events)
    }

    /// Events edited since the last sync.
    pub fn list_unsynced_events(&self) -> DbResult<Vec<HealthEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM health_events WHERE needs_sync = 1 ORDER BY timestamp",
            EVENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], EventRow::from_row)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?.try_into()?);
        }
        Ok(events)
    }

    /// Clear the re-sync flag after the external store has the edit.
    pub fn mark_event_synced(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("UPDATE health_events SET needs_sync = 0 WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Delete an event.
    pub fn delete_event(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM health_events WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(event_id = %id, "event deleted");
        }
        Ok(rows_affected > 0)
    }
}
