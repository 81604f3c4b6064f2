//! Drives a notification center through the medication lifecycle.

use super::{NotificationScheduler, ReminderPlanner, ReminderResult};
use crate::config::EngineConfig;
use crate::models::Medication;

/// What a lifecycle call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderOutcome {
    pub cancelled: Vec<String>,
    pub scheduled: Vec<String>,
}

/// Keeps pending reminders in step with stored medications.
pub struct ReminderScheduler<N: NotificationScheduler> {
    planner: ReminderPlanner,
    notifier: N,
}

impl<N: NotificationScheduler> ReminderScheduler<N> {
    pub fn new(config: &EngineConfig, notifier: N) -> Self {
        Self {
            planner: ReminderPlanner::new(config),
            notifier,
        }
    }

    pub fn planner(&self) -> &ReminderPlanner {
        &self.planner
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Schedule reminders for a newly created medication.
    pub fn on_created(&self, medication: &Medication) -> ReminderResult<ReminderOutcome> {
        let scheduled = self.schedule_all(medication)?;
        Ok(ReminderOutcome {
            cancelled: Vec::new(),
            scheduled,
        })
    }

    /// Cancel everything the medication may have registered, then schedule
    /// again if it is still active.
    ///
    /// `previous` is the stored version before the edit, when known. Its
    /// time count widens the cancellation range so slots removed by the
    /// edit are cancelled too.
    pub fn on_updated(
        &self,
        previous: Option<&Medication>,
        medication: &Medication,
    ) -> ReminderResult<ReminderOutcome> {
        let mut counts = vec![medication.scheduled_times.len()];
        if let Some(previous) = previous {
            counts.push(previous.scheduled_times.len());
        }
        let cancelled = self.planner.cancellation_ids(&medication.id, &counts);
        self.notifier.cancel(&cancelled)?;

        let scheduled = self.schedule_all(medication)?;
        tracing::debug!(
            medication_id = %medication.id,
            cancelled = cancelled.len(),
            scheduled = scheduled.len(),
            "rescheduled medication reminders"
        );
        Ok(ReminderOutcome {
            cancelled,
            scheduled,
        })
    }

    /// Cancel all reminders of a deleted medication.
    pub fn on_deleted(&self, medication: &Medication) -> ReminderResult<ReminderOutcome> {
        let cancelled = self
            .planner
            .cancellation_ids(&medication.id, &[medication.scheduled_times.len()]);
        self.notifier.cancel(&cancelled)?;
        Ok(ReminderOutcome {
            cancelled,
            scheduled: Vec::new(),
        })
    }

    fn schedule_all(&self, medication: &Medication) -> ReminderResult<Vec<String>> {
        let requests = self.planner.plan(medication);
        let mut scheduled = Vec::with_capacity(requests.len());
        for request in &requests {
            if let Err(e) = self.notifier.schedule(request) {
                tracing::warn!(
                    identifier = %request.identifier,
                    error = %e,
                    "failed to schedule reminder"
                );
                return Err(e);
            }
            scheduled.push(request.identifier.clone());
        }
        Ok(scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicationFrequency;
    use crate::reminders::{InMemoryScheduler, NotificationRequest, ReminderError};
    use chrono::{NaiveDate, NaiveTime};

    fn times(hours: &[u32]) -> Vec<NaiveTime> {
        hours
            .iter()
            .map(|h| NaiveTime::from_hms_opt(*h, 0, 0).unwrap())
            .collect()
    }

    fn medication(hours: &[u32]) -> Medication {
        Medication::new(
            "pet-1".into(),
            "Carprofen".into(),
            "25 mg".into(),
            MedicationFrequency::Daily,
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        )
        .with_times(times(hours))
    }

    #[test]
    fn test_create_then_delete_leaves_nothing() {
        let center = InMemoryScheduler::new();
        let scheduler = ReminderScheduler::new(&EngineConfig::default(), &center);

        let mut med = medication(&[8, 20]);
        med.refill_reminder = true;
        med.refill_date = NaiveDate::from_ymd_opt(2026, 7, 1);

        let outcome = scheduler.on_created(&med).unwrap();
        assert_eq!(outcome.scheduled.len(), 3);
        assert_eq!(center.pending_for(&med.id).len(), 3);

        scheduler.on_deleted(&med).unwrap();
        assert!(center.pending_for(&med.id).is_empty());
    }

    #[test]
    fn test_update_with_fewer_times() {
        let center = InMemoryScheduler::new();
        let scheduler = ReminderScheduler::new(&EngineConfig::default(), &center);

        let before = medication(&[6, 9, 12]);
        scheduler.on_created(&before).unwrap();

        let mut after = before.clone();
        after.scheduled_times = times(&[7]);
        scheduler.on_updated(Some(&before), &after).unwrap();

        let pending = center.pending_for(&after.id);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].identifier, format!("medication-{}-0", after.id));
    }

    #[test]
    fn test_update_beyond_slot_bound_cancels_every_slot() {
        let center = InMemoryScheduler::new();
        let scheduler = ReminderScheduler::new(&EngineConfig::default(), &center);

        let hours: Vec<u32> = (0..12).collect();
        let before = medication(&hours);
        scheduler.on_created(&before).unwrap();
        assert_eq!(center.pending_for(&before.id).len(), 12);

        let mut after = before.clone();
        after.scheduled_times = times(&[8]);
        let outcome = scheduler.on_updated(Some(&before), &after).unwrap();

        assert_eq!(outcome.cancelled.len(), 13);
        assert_eq!(center.pending_for(&after.id).len(), 1);
    }

    #[test]
    fn test_deactivation_cancels_without_rescheduling() {
        let center = InMemoryScheduler::new();
        let scheduler = ReminderScheduler::new(&EngineConfig::default(), &center);

        let before = medication(&[8]);
        scheduler.on_created(&before).unwrap();

        let mut after = before.clone();
        after.active = false;
        let outcome = scheduler.on_updated(Some(&before), &after).unwrap();

        assert!(outcome.scheduled.is_empty());
        assert!(center.is_empty());
    }

    #[test]
    fn test_other_medications_untouched() {
        let center = InMemoryScheduler::new();
        let scheduler = ReminderScheduler::new(&EngineConfig::default(), &center);

        let first = medication(&[8]);
        let second = medication(&[9]);
        scheduler.on_created(&first).unwrap();
        scheduler.on_created(&second).unwrap();

        scheduler.on_deleted(&first).unwrap();
        assert_eq!(center.pending_for(&second.id).len(), 1);
    }

    struct FailingCenter;

    impl NotificationScheduler for FailingCenter {
        fn schedule(&self, _request: &NotificationRequest) -> ReminderResult<()> {
            Err(ReminderError::Scheduler("denied".into()))
        }

        fn cancel(&self, _identifiers: &[String]) -> ReminderResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_scheduler_failure_propagates() {
        let scheduler = ReminderScheduler::new(&EngineConfig::default(), FailingCenter);
        let err = scheduler.on_created(&medication(&[8])).unwrap_err();
        assert_eq!(err, ReminderError::Scheduler("denied".into()));
    }
}
