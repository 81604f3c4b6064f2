//! Health event models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_timestamp, ModelError, ModelResult};

/// Closed set of loggable event categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventCategory {
    Meal,
    Walk,
    Playtime,
    Water,
    Symptom,
    Mood,
    Digestion,
    MedicationNote,
    Appointment,
    Grooming,
    Supplement,
    Treat,
    Note,
}

impl EventCategory {
    pub const ALL: [EventCategory; 13] = [
        EventCategory::Meal,
        EventCategory::Walk,
        EventCategory::Playtime,
        EventCategory::Water,
        EventCategory::Symptom,
        EventCategory::Mood,
        EventCategory::Digestion,
        EventCategory::MedicationNote,
        EventCategory::Appointment,
        EventCategory::Grooming,
        EventCategory::Supplement,
        EventCategory::Treat,
        EventCategory::Note,
    ];

    /// Storage key for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Meal => "meal",
            EventCategory::Walk => "walk",
            EventCategory::Playtime => "playtime",
            EventCategory::Water => "water",
            EventCategory::Symptom => "symptom",
            EventCategory::Mood => "mood",
            EventCategory::Digestion => "digestion",
            EventCategory::MedicationNote => "medication_note",
            EventCategory::Appointment => "appointment",
            EventCategory::Grooming => "grooming",
            EventCategory::Supplement => "supplement",
            EventCategory::Treat => "treat",
            EventCategory::Note => "note",
        }
    }

    /// Parse a storage key back into a category.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Whether `duration_minutes` counts toward activity totals.
    pub fn is_activity(&self) -> bool {
        matches!(self, EventCategory::Walk | EventCategory::Playtime)
    }
}

/// Meal slot for a Meal event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }

    /// Case-insensitive parse.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged occurrence in a pet's journal.
///
/// Category-specific fields are optional and only meaningful for the
/// categories noted on each field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthEvent {
    /// Stable event identity
    pub id: String,
    /// Owning pet
    pub pet_id: String,
    pub category: EventCategory,
    /// When the event happened (not when it was logged)
    pub timestamp: DateTime<Utc>,
    /// Free text, may be empty
    pub notes: String,
    /// Walk/Playtime length as entered; parsed leniently by analytics
    pub duration_minutes: Option<String>,
    pub meal_type: Option<MealType>,
    /// 1 (very low) to 5 (very good)
    pub mood_level: Option<u8>,
    pub symptom_type: Option<String>,
    /// 1 (mild) to 5 (severe)
    pub severity_level: Option<u8>,
    pub digestion_quality: Option<String>,
    pub amount: Option<String>,
    pub water_amount: Option<String>,
    pub appointment_type: Option<String>,
    pub location: Option<String>,
    /// Set by edits so the external store knows to re-sync
    pub needs_sync: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl HealthEvent {
    /// Create a new event with only the required fields set.
    pub fn new(pet_id: String, category: EventCategory, timestamp: DateTime<Utc>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pet_id,
            category,
            timestamp,
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
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// A Meal event.
    pub fn meal(pet_id: String, timestamp: DateTime<Utc>, meal_type: MealType) -> Self {
        let mut event = Self::new(pet_id, EventCategory::Meal, timestamp);
        event.meal_type = Some(meal_type);
        event
    }

    /// A Walk or Playtime event.
    pub fn activity(
        pet_id: String,
        category: EventCategory,
        timestamp: DateTime<Utc>,
        minutes: u32,
    ) -> Self {
        let mut event = Self::new(pet_id, category, timestamp);
        event.duration_minutes = Some(minutes.to_string());
        event
    }

    /// A Symptom event.
    pub fn symptom(
        pet_id: String,
        timestamp: DateTime<Utc>,
        symptom_type: &str,
        severity_level: u8,
    ) -> Self {
        let mut event = Self::new(pet_id, EventCategory::Symptom, timestamp);
        event.symptom_type = Some(symptom_type.to_string());
        event.severity_level = Some(severity_level);
        event
    }

    /// A Mood event.
    pub fn mood(pet_id: String, timestamp: DateTime<Utc>, mood_level: u8) -> Self {
        let mut event = Self::new(pet_id, EventCategory::Mood, timestamp);
        event.mood_level = Some(mood_level);
        event
    }

    /// A Digestion event.
    pub fn digestion(pet_id: String, timestamp: DateTime<Utc>, quality: &str) -> Self {
        let mut event = Self::new(pet_id, EventCategory::Digestion, timestamp);
        event.digestion_quality = Some(quality.to_string());
        event
    }

    /// Enforce level ranges and non-empty ownership.
    pub fn validate(&self) -> ModelResult<()> {
        if self.pet_id.trim().is_empty() {
            return Err(ModelError::MissingField("pet_id"));
        }
        check_timestamp("timestamp", &self.timestamp)?;
        check_level("mood_level", self.mood_level)?;
        check_level("severity_level", self.severity_level)?;
        Ok(())
    }

    /// Duration in minutes; non-numeric or missing values count as zero.
    pub fn parsed_duration_minutes(&self) -> u32 {
        self.duration_minutes
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }

    /// Apply an edit: the identity stays, the sync flag flips.
    pub fn mark_edited(&mut self) {
        self.needs_sync = true;
        self.updated_at = Utc::now().to_rfc3339();
    }
}

fn check_level(field: &'static str, level: Option<u8>) -> ModelResult<()> {
    match level {
        Some(value) if !(1..=5).contains(&value) => Err(ModelError::OutOfRange {
            field,
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_category_round_trip_keys() {
        for category in EventCategory::ALL {
            assert_eq!(EventCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(EventCategory::parse("bath"), None);
    }

    #[test]
    fn test_meal_type_parse_case_insensitive() {
        assert_eq!(MealType::parse(" dinner "), Some(MealType::Dinner));
        assert_eq!(MealType::parse("BREAKFAST"), Some(MealType::Breakfast));
        assert_eq!(MealType::parse("brunch"), None);
    }

    #[test]
    fn test_parsed_duration() {
        let mut walk = HealthEvent::activity("pet-1".into(), EventCategory::Walk, ts(), 45);
        assert_eq!(walk.parsed_duration_minutes(), 45);

        walk.duration_minutes = Some(" 20 ".into());
        assert_eq!(walk.parsed_duration_minutes(), 20);

        walk.duration_minutes = Some("about an hour".into());
        assert_eq!(walk.parsed_duration_minutes(), 0);

        walk.duration_minutes = Some("-5".into());
        assert_eq!(walk.parsed_duration_minutes(), 0);

        walk.duration_minutes = None;
        assert_eq!(walk.parsed_duration_minutes(), 0);
    }

    #[test]
    fn test_validate_rejects_five_digit_years() {
        let far_future = Utc.timestamp_millis_opt(300_000_000_000_000).unwrap();
        let event = HealthEvent::mood("pet-1".into(), far_future, 3);
        assert!(matches!(
            event.validate(),
            Err(ModelError::OutOfRange { field: "timestamp", .. })
        ));
    }

    #[test]
    fn test_validate_levels() {
        let mood = HealthEvent::mood("pet-1".into(), ts(), 5);
        assert!(mood.validate().is_ok());

        let bad_mood = HealthEvent::mood("pet-1".into(), ts(), 6);
        assert!(matches!(
            bad_mood.validate(),
            Err(ModelError::OutOfRange { field: "mood_level", .. })
        ));

        let bad_severity = HealthEvent::symptom("pet-1".into(), ts(), "Cough", 0);
        assert!(bad_severity.validate().is_err());
    }

    #[test]
    fn test_mark_edited_keeps_identity() {
        let mut event = HealthEvent::meal("pet-1".into(), ts(), MealType::Lunch);
        let id = event.id.clone();
        event.timestamp = ts() + chrono::Duration::hours(1);
        event.mark_edited();

        assert_eq!(event.id, id);
        assert!(event.needs_sync);
    }
}
