//! Read-side repository contract used by the analytics engine.
//!
//! The engine never reaches into shared state; callers hand it a store (the
//! SQLite [`Database`](crate::db::Database) in the app, a [`SnapshotStore`] in
//! tests and previews) and get plain values back.

use std::convert::Infallible;

use chrono::{DateTime, Utc};

use crate::models::{DateRange, EventCategory, HealthEvent, Medication, MedicationDoseRecord};

/// Filter for event queries.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub pet_id: String,
    pub category: Option<EventCategory>,
    /// Inclusive lower bound
    pub range_start: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub range_end: Option<DateTime<Utc>>,
}

impl EventQuery {
    /// All events for a pet.
    pub fn for_pet(pet_id: &str) -> Self {
        Self {
            pet_id: pet_id.to_string(),
            category: None,
            range_start: None,
            range_end: None,
        }
    }

    pub fn category(mut self, category: EventCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.range_start = Some(range.start);
        self.range_end = Some(range.end);
        self
    }

    /// Whether an event satisfies every filter.
    pub fn matches(&self, event: &HealthEvent) -> bool {
        event.pet_id == self.pet_id
            && self.category.map_or(true, |c| event.category == c)
            && self.range_start.map_or(true, |start| event.timestamp >= start)
            && self.range_end.map_or(true, |end| event.timestamp < end)
    }
}

/// Queryable event and medication store.
pub trait EventStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Matching events, newest first.
    fn query_events(&self, query: &EventQuery) -> Result<Vec<HealthEvent>, Self::Error>;

    fn query_medications(&self, pet_id: &str) -> Result<Vec<Medication>, Self::Error>;

    /// Dose records for one medication, newest first.
    fn query_dose_records(
        &self,
        medication_id: &str,
    ) -> Result<Vec<MedicationDoseRecord>, Self::Error>;
}

/// Immutable in-memory snapshot of a journal.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    pub events: Vec<HealthEvent>,
    pub medications: Vec<Medication>,
    pub dose_records: Vec<MedicationDoseRecord>,
}

impl SnapshotStore {
    pub fn from_events(events: Vec<HealthEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }
}

impl EventStore for SnapshotStore {
    type Error = Infallible;

    fn query_events(&self, query: &EventQuery) -> Result<Vec<HealthEvent>, Self::Error> {
        let mut events: Vec<HealthEvent> = self
            .events
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(events)
    }

    fn query_medications(&self, pet_id: &str) -> Result<Vec<Medication>, Self::Error> {
        Ok(self
            .medications
            .iter()
            .filter(|m| m.pet_id == pet_id)
            .cloned()
            .collect())
    }

    fn query_dose_records(
        &self,
        medication_id: &str,
    ) -> Result<Vec<MedicationDoseRecord>, Self::Error> {
        let mut records: Vec<MedicationDoseRecord> = self
            .dose_records
            .iter()
            .filter(|r| r.medication_id == medication_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_snapshot_query_filters_and_orders() {
        let base = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let store = SnapshotStore::from_events(vec![
            HealthEvent::meal("pet-1".into(), base, MealType::Breakfast),
            HealthEvent::mood("pet-1".into(), base + Duration::hours(2), 4),
            HealthEvent::meal("pet-1".into(), base + Duration::days(1), MealType::Dinner),
            HealthEvent::meal("pet-2".into(), base, MealType::Lunch),
        ]);

        let all = store.query_events(&EventQuery::for_pet("pet-1")).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].timestamp > all[2].timestamp);

        let meals = store
            .query_events(&EventQuery::for_pet("pet-1").category(EventCategory::Meal))
            .unwrap();
        assert_eq!(meals.len(), 2);

        let first_day = store
            .query_events(
                &EventQuery::for_pet("pet-1")
                    .within(DateRange::new(base, base + Duration::days(1))),
            )
            .unwrap();
        assert_eq!(first_day.len(), 2);
    }
}
