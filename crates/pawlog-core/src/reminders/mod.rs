//! Medication reminder scheduling.
//!
//! The planner turns a [`Medication`](crate::models::Medication) into
//! [`NotificationRequest`]s with deterministic identifiers. The
//! [`ReminderScheduler`] drives a platform [`NotificationScheduler`] through
//! the medication lifecycle, always cancelling before rescheduling.

pub mod identifiers;
pub mod planner;
pub mod scheduler;

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use identifiers::{belongs_to, dose_identifier, refill_identifier};
pub use planner::{ReminderPlanner, DOSE_REMINDER_TITLE, REFILL_REMINDER_TITLE};
pub use scheduler::{ReminderOutcome, ReminderScheduler};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReminderError {
    #[error("Notification scheduler error: {0}")]
    Scheduler(String),
}

pub type ReminderResult<T> = Result<T, ReminderError>;

/// When a notification fires. Times are device-local wall-clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationTrigger {
    /// Fires once at the given local date and time.
    OneTime { at: NaiveDateTime },
    /// Repeats every day at hour:minute.
    DailyRepeating { hour: u32, minute: u32 },
    /// Repeats every week on `weekday` at hour:minute.
    WeekdayRepeating { weekday: Weekday, hour: u32, minute: u32 },
}

/// A local notification ready to hand to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub trigger: NotificationTrigger,
}

/// Platform notification center.
///
/// Scheduling an existing identifier replaces it. Cancelling an unknown
/// identifier is not an error.
pub trait NotificationScheduler {
    fn schedule(&self, request: &NotificationRequest) -> ReminderResult<()>;
    fn cancel(&self, identifiers: &[String]) -> ReminderResult<()>;
}

impl<T: NotificationScheduler + ?Sized> NotificationScheduler for &T {
    fn schedule(&self, request: &NotificationRequest) -> ReminderResult<()> {
        (**self).schedule(request)
    }

    fn cancel(&self, identifiers: &[String]) -> ReminderResult<()> {
        (**self).cancel(identifiers)
    }
}

/// Notification center kept in memory, keyed by identifier.
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    pending: Mutex<BTreeMap<String, NotificationRequest>>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All pending requests in identifier order.
    pub fn pending(&self) -> Vec<NotificationRequest> {
        match self.pending.lock() {
            Ok(pending) => pending.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        }
    }

    /// Pending requests registered for one medication.
    pub fn pending_for(&self, medication_id: &str) -> Vec<NotificationRequest> {
        self.pending()
            .into_iter()
            .filter(|request| belongs_to(&request.identifier, medication_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationScheduler for InMemoryScheduler {
    fn schedule(&self, request: &NotificationRequest) -> ReminderResult<()> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| ReminderError::Scheduler("Lock poisoned".into()))?;
        pending.insert(request.identifier.clone(), request.clone());
        Ok(())
    }

    fn cancel(&self, identifiers: &[String]) -> ReminderResult<()> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| ReminderError::Scheduler("Lock poisoned".into()))?;
        for identifier in identifiers {
            pending.remove(identifier);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(identifier: &str) -> NotificationRequest {
        NotificationRequest {
            identifier: identifier.into(),
            title: "Medication Reminder".into(),
            body: "Time to give Apoquel.".into(),
            trigger: NotificationTrigger::DailyRepeating { hour: 8, minute: 0 },
        }
    }

    #[test]
    fn test_schedule_replaces_same_identifier() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule(&request("medication-a-0")).unwrap();

        let mut updated = request("medication-a-0");
        updated.body = "changed".into();
        scheduler.schedule(&updated).unwrap();

        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.pending()[0].body, "changed");
    }

    #[test]
    fn test_cancel_unknown_is_ok() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule(&request("medication-a-0")).unwrap();
        scheduler
            .cancel(&["medication-a-0".into(), "medication-zzz-4".into()])
            .unwrap();
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_pending_for_filters_by_medication() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule(&request("medication-a-0")).unwrap();
        scheduler.schedule(&request("medication-refill-a")).unwrap();
        scheduler.schedule(&request("medication-ab-0")).unwrap();

        assert_eq!(scheduler.pending_for("a").len(), 2);
        assert_eq!(scheduler.pending_for("ab").len(), 1);
    }

    #[test]
    fn test_trigger_serializes_with_kind_tag() {
        let json = serde_json::to_value(NotificationTrigger::WeekdayRepeating {
            weekday: Weekday::Mon,
            hour: 9,
            minute: 30,
        })
        .unwrap();
        assert_eq!(json["kind"], "weekday_repeating");
        assert_eq!(json["hour"], 9);
    }
}
