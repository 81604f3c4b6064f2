//! Medication adherence.

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::models::insights::days_before;
use crate::models::{AdherenceRate, Medication, MedicationDoseRecord, MedicationFrequency};
use crate::store::EventStore;

/// Doses a schedule expects over `days`.
///
/// TwiceDaily always expects two a day regardless of how many times are
/// configured; AsNeeded expects none.
pub fn expected_doses(frequency: MedicationFrequency, times_per_day: usize, days: u32) -> u32 {
    let times = u32::try_from(times_per_day).unwrap_or(u32::MAX);
    match frequency {
        MedicationFrequency::Daily => days.saturating_mul(times),
        MedicationFrequency::TwiceDaily => days.saturating_mul(2),
        MedicationFrequency::EveryOtherDay => (days / 2).saturating_mul(times),
        MedicationFrequency::Weekly => (days / 7).saturating_mul(times),
        MedicationFrequency::AsNeeded => 0,
    }
}

/// Computes adherence from dose history. Holds only the default lookback.
#[derive(Debug, Clone)]
pub struct AdherenceTracker {
    default_days: u32,
}

impl AdherenceTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            default_days: config.adherence_lookback_days,
        }
    }

    /// Adherence over the configured default lookback.
    pub fn rate(
        &self,
        medication: &Medication,
        records: &[MedicationDoseRecord],
        now: DateTime<Utc>,
    ) -> AdherenceRate {
        self.rate_over(medication, records, self.default_days, now)
    }

    /// Adherence over the last `days` days ending at `now`.
    ///
    /// Counts non-skipped records for this medication with
    /// `timestamp >= now - days`, capped at a rate of 1.0. A schedule that
    /// expects nothing reports 0.
    pub fn rate_over(
        &self,
        medication: &Medication,
        records: &[MedicationDoseRecord],
        days: u32,
        now: DateTime<Utc>,
    ) -> AdherenceRate {
        let cutoff = days_before(now, days);
        let recent = records
            .iter()
            .filter(|r| r.medication_id == medication.id && r.timestamp >= cutoff);

        let (mut actual, mut skipped) = (0u32, 0u32);
        for record in recent {
            if record.skipped {
                skipped += 1;
            } else {
                actual += 1;
            }
        }

        if medication.frequency.is_scheduled() && medication.scheduled_times.is_empty() {
            tracing::warn!(
                medication_id = %medication.id,
                "scheduled medication has no times; adherence reported as 0"
            );
        }

        let expected = expected_doses(medication.frequency, medication.scheduled_times.len(), days);
        let rate = if expected > 0 {
            (f64::from(actual) / f64::from(expected)).min(1.0)
        } else {
            0.0
        };

        AdherenceRate {
            medication_id: medication.id.clone(),
            rate,
            expected_doses: expected,
            actual_doses: actual,
            skipped_doses: skipped,
            lookback_days: days,
        }
    }

    /// Adherence for every medication of a pet whose course covers `now`.
    pub fn rates_for_pet<S: EventStore>(
        &self,
        store: &S,
        pet_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AdherenceRate>, S::Error> {
        let mut rates = Vec::new();
        for medication in store.query_medications(pet_id)? {
            if !medication.is_current_on(now.date_naive()) {
                continue;
            }
            let records = store.query_dose_records(&medication.id)?;
            rates.push(self.rate(&medication, &records, now));
        }
        Ok(rates)
    }
}
