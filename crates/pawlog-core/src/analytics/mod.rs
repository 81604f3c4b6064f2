//! On-device health analytics.
//!
//! Pipeline: Event snapshot → Aggregation (current + previous window)
//! → Pattern detection + Health score. Adherence is computed independently
//! per medication.
//!
//! Everything here is pure over the snapshot it is given. Only the
//! store-backed helpers can fail, and only with the store's own error.

mod adherence;
mod aggregator;
mod patterns;
mod score;

pub use adherence::*;
pub use aggregator::*;
pub use patterns::*;
pub use score::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{DateRange, HealthEvent, HealthScore, Pattern, Pet, WindowAggregate};
use crate::store::{EventQuery, EventStore};

/// Everything the weekly digest screen shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyInsights {
    pub current: WindowAggregate,
    pub previous: WindowAggregate,
    pub patterns: Vec<Pattern>,
    pub score: HealthScore,
    /// Consecutive days with a log, ending today or yesterday
    pub logging_streak: u32,
}

/// Coordinates aggregation, pattern detection and scoring.
pub struct InsightEngine {
    window_days: u32,
    aggregator: Aggregator,
    detector: PatternDetector,
    calculator: ScoreCalculator,
    adherence: AdherenceTracker,
}

impl InsightEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window_days: config.window_days.max(1),
            aggregator: Aggregator::new(config),
            detector: PatternDetector::new(config),
            calculator: ScoreCalculator::new(config),
            adherence: AdherenceTracker::new(config),
        }
    }

    /// The current window ending at `now` and the one before it.
    pub fn windows(&self, now: DateTime<Utc>) -> (DateRange, DateRange) {
        let current = DateRange::trailing_days(now, self.window_days);
        (current, current.preceding())
    }

    /// Insights from an in-memory snapshot of the pet's events.
    pub fn insights_from_events(
        &self,
        pet: &Pet,
        events: &[HealthEvent],
        now: DateTime<Utc>,
    ) -> WeeklyInsights {
        let (current_range, previous_range) = self.windows(now);
        let current = self.aggregator.aggregate(&pet.id, current_range, events);
        let previous = self.aggregator.aggregate(&pet.id, previous_range, events);

        let patterns = self.detector.detect(&pet.name, &current, &previous);
        let score = self.calculator.score(&current);
        let logging_streak = self.aggregator.logging_streak(&pet.id, events, now);

        WeeklyInsights {
            current,
            previous,
            patterns,
            score,
            logging_streak,
        }
    }

    /// Fetch both windows from the store and compute insights.
    ///
    /// The logging streak only sees those two windows, so it tops out at
    /// twice the window length.
    pub fn weekly_insights<S: EventStore>(
        &self,
        store: &S,
        pet: &Pet,
        now: DateTime<Utc>,
    ) -> Result<WeeklyInsights, S::Error> {
        let (current_range, previous_range) = self.windows(now);
        let fetch = DateRange::new(previous_range.start, current_range.end);
        let events = store.query_events(&EventQuery::for_pet(&pet.id).within(fetch))?;

        tracing::debug!(pet_id = %pet.id, fetched = events.len(), "computing weekly insights");
        Ok(self.insights_from_events(pet, &events, now))
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn detector(&self) -> &PatternDetector {
        &self.detector
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    pub fn adherence(&self) -> &AdherenceTracker {
        &self.adherence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{EventCategory, MealType};
    use crate::store::SnapshotStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 8, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_journal() {
        let engine = InsightEngine::new(&EngineConfig::default());
        let pet = Pet::new("Biscuit".into(), "dog".into());
        let insights = engine
            .weekly_insights(&SnapshotStore::default(), &pet, now())
            .unwrap();

        assert!(insights.patterns.is_empty());
        assert_eq!(insights.score.overall, 0);
        assert_eq!(insights.logging_streak, 0);
    }

    #[test]
    fn test_windows_do_not_overlap() {
        let engine = InsightEngine::new(&EngineConfig::default());
        let (current, previous) = engine.windows(now());
        assert_eq!(previous.end, current.start);
        assert_eq!(current.end, now());
    }

    #[test]
    fn test_database_backed_insights() {
        let db = Database::open_in_memory().unwrap();
        let pet = Pet::new("Biscuit".into(), "dog".into());
        db.insert_pet(&pet).unwrap();

        // Last week: 200 minutes of walks. This week: 100.
        db.insert_event(&HealthEvent::activity(
            pet.id.clone(),
            EventCategory::Walk,
            now() - Duration::days(10),
            200,
        ))
        .unwrap();
        db.insert_event(&HealthEvent::activity(
            pet.id.clone(),
            EventCategory::Walk,
            now() - Duration::days(2),
            100,
        ))
        .unwrap();
        db.insert_event(&HealthEvent::meal(pet.id.clone(), now() - Duration::days(1), MealType::Dinner))
            .unwrap();

        let engine = InsightEngine::new(&EngineConfig::default());
        let insights = engine.weekly_insights(&db, &pet, now()).unwrap();

        assert_eq!(insights.previous.activity_minutes, 200);
        assert_eq!(insights.current.activity_minutes, 100);
        assert_eq!(insights.patterns[0].title, "Activity Decreased");
        assert!(insights.patterns[0].recommendation.contains("Biscuit"));
        assert!(insights.score.overall > 0);
        assert_eq!(insights.logging_streak, 2);
    }
}
