//! Derives notification requests from a medication's schedule.

use chrono::{Datelike, NaiveTime, Timelike};

use super::identifiers::{cancellation_identifiers, dose_identifier, refill_identifier};
use super::{NotificationRequest, NotificationTrigger};
use crate::config::EngineConfig;
use crate::models::{Medication, MedicationFrequency};

pub const DOSE_REMINDER_TITLE: &str = "Medication Reminder";
pub const REFILL_REMINDER_TITLE: &str = "Refill Reminder";

/// Pure mapping from medication to notification requests.
///
/// Note: EveryOtherDay medications get a daily trigger. The every-other-day
/// cadence only exists in adherence math; reminders fire every day.
#[derive(Debug, Clone)]
pub struct ReminderPlanner {
    reminder_slots: usize,
    refill_time: NaiveTime,
}

impl ReminderPlanner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            reminder_slots: config.reminder_slots.max(1),
            refill_time: NaiveTime::from_hms_opt(config.refill_reminder_hour.min(23), 0, 0)
                .unwrap_or(NaiveTime::MIN),
        }
    }

    /// Requests to register for a medication. Inactive medications get none.
    pub fn plan(&self, medication: &Medication) -> Vec<NotificationRequest> {
        if !medication.active {
            return Vec::new();
        }

        let mut requests: Vec<NotificationRequest> = medication
            .scheduled_times
            .iter()
            .enumerate()
            .filter_map(|(index, time)| {
                let trigger = dose_trigger(medication, *time)?;
                Some(NotificationRequest {
                    identifier: dose_identifier(&medication.id, index),
                    title: DOSE_REMINDER_TITLE.into(),
                    body: dose_body(medication),
                    trigger,
                })
            })
            .collect();

        if medication.frequency.is_scheduled() && medication.scheduled_times.is_empty() {
            tracing::warn!(
                medication_id = %medication.id,
                "scheduled medication has no times; no dose reminders planned"
            );
        }

        if medication.refill_reminder {
            if let Some(refill_date) = medication.refill_date {
                requests.push(NotificationRequest {
                    identifier: refill_identifier(&medication.id),
                    title: REFILL_REMINDER_TITLE.into(),
                    body: format!("Time to refill {}.", medication.name),
                    trigger: NotificationTrigger::OneTime {
                        at: refill_date.and_time(self.refill_time),
                    },
                });
            }
        }

        requests
    }

    /// Identifiers to cancel before rescheduling or after deleting.
    ///
    /// Covers the configured slot bound, raised to the largest time count
    /// among the given versions of the medication so no slot is leaked.
    pub fn cancellation_ids(&self, medication_id: &str, known_time_counts: &[usize]) -> Vec<String> {
        let slots = known_time_counts
            .iter()
            .copied()
            .fold(self.reminder_slots, usize::max);
        cancellation_identifiers(medication_id, slots)
    }
}

fn dose_trigger(medication: &Medication, time: NaiveTime) -> Option<NotificationTrigger> {
    let (hour, minute) = (time.hour(), time.minute());
    match medication.frequency {
        MedicationFrequency::Daily
        | MedicationFrequency::TwiceDaily
        | MedicationFrequency::EveryOtherDay => {
            Some(NotificationTrigger::DailyRepeating { hour, minute })
        }
        MedicationFrequency::Weekly => Some(NotificationTrigger::WeekdayRepeating {
            weekday: medication.start_date.weekday(),
            hour,
            minute,
        }),
        MedicationFrequency::AsNeeded => None,
    }
}

fn dose_body(medication: &Medication) -> String {
    let dosage = medication.dosage.trim();
    if dosage.is_empty() {
        format!("Time to give {}.", medication.name)
    } else {
        format!("Time to give {} ({}).", medication.name, dosage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    fn medication(frequency: MedicationFrequency, times: &[(u32, u32)]) -> Medication {
        Medication::new(
            "pet-1".into(),
            "Apoquel".into(),
            "16 mg".into(),
            frequency,
            // A Wednesday.
            NaiveDate::from_ymd_opt(2026, 6, 3).unwrap(),
        )
        .with_times(
            times
                .iter()
                .map(|(h, m)| NaiveTime::from_hms_opt(*h, *m, 0).unwrap())
                .collect(),
        )
    }

    fn planner() -> ReminderPlanner {
        ReminderPlanner::new(&EngineConfig::default())
    }

    #[test]
    fn test_daily_plan() {
        let med = medication(MedicationFrequency::Daily, &[(8, 0), (19, 30)]);
        let plan = planner().plan(&med);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].identifier, format!("medication-{}-0", med.id));
        assert_eq!(plan[1].identifier, format!("medication-{}-1", med.id));
        assert_eq!(plan[0].title, "Medication Reminder");
        assert!(plan[0].body.contains("Apoquel"));
        assert!(plan[0].body.contains("16 mg"));
        assert_eq!(
            plan[1].trigger,
            NotificationTrigger::DailyRepeating { hour: 19, minute: 30 }
        );
    }

    #[test]
    fn test_every_other_day_uses_daily_trigger() {
        let med = medication(MedicationFrequency::EveryOtherDay, &[(7, 15)]);
        let plan = planner().plan(&med);
        assert_eq!(
            plan[0].trigger,
            NotificationTrigger::DailyRepeating { hour: 7, minute: 15 }
        );
    }

    #[test]
    fn test_weekly_pins_start_weekday() {
        let med = medication(MedicationFrequency::Weekly, &[(9, 0)]);
        let plan = planner().plan(&med);
        assert_eq!(
            plan[0].trigger,
            NotificationTrigger::WeekdayRepeating {
                weekday: Weekday::Wed,
                hour: 9,
                minute: 0
            }
        );
    }

    #[test]
    fn test_as_needed_has_no_dose_reminders() {
        let med = medication(MedicationFrequency::AsNeeded, &[(9, 0)]);
        assert!(planner().plan(&med).is_empty());
    }

    #[test]
    fn test_refill_reminder() {
        let mut med = medication(MedicationFrequency::AsNeeded, &[]);
        med.refill_reminder = true;
        assert!(planner().plan(&med).is_empty());

        med.refill_date = NaiveDate::from_ymd_opt(2026, 7, 1);
        let plan = planner().plan(&med);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].identifier, format!("medication-refill-{}", med.id));
        assert_eq!(plan[0].title, "Refill Reminder");
        assert_eq!(
            plan[0].trigger,
            NotificationTrigger::OneTime {
                at: NaiveDate::from_ymd_opt(2026, 7, 1)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap()
            }
        );

        med.refill_reminder = false;
        assert!(planner().plan(&med).is_empty());
    }

    #[test]
    fn test_inactive_medication_plans_nothing() {
        let mut med = medication(MedicationFrequency::Daily, &[(8, 0)]);
        med.active = false;
        assert!(planner().plan(&med).is_empty());
    }

    #[test]
    fn test_cancellation_ids_grow_with_time_count() {
        let ids = planner().cancellation_ids("m", &[]);
        assert_eq!(ids.len(), 11);

        let ids = planner().cancellation_ids("m", &[3, 12]);
        assert_eq!(ids.len(), 13);
        assert!(ids.contains(&"medication-m-11".to_string()));
        assert_eq!(ids.last().unwrap(), "medication-refill-m");
    }

    #[test]
    fn test_empty_dosage_body() {
        let mut med = medication(MedicationFrequency::Daily, &[(8, 0)]);
        med.dosage = "  ".into();
        assert_eq!(planner().plan(&med)[0].body, "Time to give Apoquel.");
    }
}
