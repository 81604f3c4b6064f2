//! Medication and dose record models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_timestamp, ModelError, ModelResult};

/// Prescribed dosing cadence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MedicationFrequency {
    Daily,
    TwiceDaily,
    EveryOtherDay,
    Weekly,
    AsNeeded,
}

impl MedicationFrequency {
    /// Storage key for this frequency.
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationFrequency::Daily => "daily",
            MedicationFrequency::TwiceDaily => "twice_daily",
            MedicationFrequency::EveryOtherDay => "every_other_day",
            MedicationFrequency::Weekly => "weekly",
            MedicationFrequency::AsNeeded => "as_needed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(MedicationFrequency::Daily),
            "twice_daily" => Some(MedicationFrequency::TwiceDaily),
            "every_other_day" => Some(MedicationFrequency::EveryOtherDay),
            "weekly" => Some(MedicationFrequency::Weekly),
            "as_needed" => Some(MedicationFrequency::AsNeeded),
            _ => None,
        }
    }

    /// Whether doses are expected on a schedule at all.
    pub fn is_scheduled(&self) -> bool {
        !matches!(self, MedicationFrequency::AsNeeded)
    }
}

/// A prescribed treatment for one pet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub pet_id: String,
    pub name: String,
    /// Free text, e.g. "5 mg" or "half a tablet"
    pub dosage: String,
    pub frequency: MedicationFrequency,
    /// Times of day, in order; empty only makes sense for AsNeeded
    pub scheduled_times: Vec<NaiveTime>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub refill_reminder: bool,
    pub refill_date: Option<NaiveDate>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Medication {
    /// Create an active medication starting on `start_date`.
    pub fn new(
        pet_id: String,
        name: String,
        dosage: String,
        frequency: MedicationFrequency,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pet_id,
            name,
            dosage,
            frequency,
            scheduled_times: Vec::new(),
            start_date,
            end_date: None,
            active: true,
            refill_reminder: false,
            refill_date: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Builder-style helper for scheduled times.
    pub fn with_times(mut self, times: Vec<NaiveTime>) -> Self {
        self.scheduled_times = times;
        self
    }

    /// Reject medications that cannot be stored.
    ///
    /// Scheduled frequencies with no times are tolerated: adherence and
    /// reminders degrade to zero for them.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingField("name"));
        }
        if self.pet_id.trim().is_empty() {
            return Err(ModelError::MissingField("pet_id"));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ModelError::OutOfRange {
                    field: "end_date",
                    value: end.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether the course covers the given day.
    pub fn is_current_on(&self, day: NaiveDate) -> bool {
        self.active && day >= self.start_date && self.end_date.map_or(true, |end| day <= end)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().to_rfc3339();
    }
}

/// One administration or skip of a medication. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationDoseRecord {
    pub id: String,
    pub medication_id: String,
    pub timestamp: DateTime<Utc>,
    pub skipped: bool,
    pub notes: Option<String>,
}

impl MedicationDoseRecord {
    /// Dose given at `timestamp`.
    pub fn given(medication_id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            medication_id,
            timestamp,
            skipped: false,
            notes: None,
        }
    }

    /// Dose skipped at `timestamp`.
    pub fn skipped(medication_id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            skipped: true,
            ..Self::given(medication_id, timestamp)
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.medication_id.trim().is_empty() {
            return Err(ModelError::MissingField("medication_id"));
        }
        check_timestamp("timestamp", &self.timestamp)
    }
}
