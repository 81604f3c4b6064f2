//! Time-window aggregation of a pet's events.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::config::EngineConfig;
use crate::models::{DateRange, EventCategory, HealthEvent, WindowAggregate};

/// Quality words that mark a Digestion event as poor.
pub const POOR_DIGESTION_QUALITY_WORDS: &[&str] = &["poor", "bad"];

/// Note words that mark a Digestion event as poor.
pub const POOR_DIGESTION_NOTE_WORDS: &[&str] = &["diarrhea", "vomit"];

/// Heuristic free-text classifier for poor digestion.
///
/// Only Digestion events qualify. A match is a case-insensitive substring of
/// `digestion_quality` ("poor", "bad") or of `notes` ("diarrhea", "vomit").
pub fn is_poor_digestion(event: &HealthEvent) -> bool {
    if event.category != EventCategory::Digestion {
        return false;
    }

    let quality_match = event.digestion_quality.as_deref().is_some_and(|quality| {
        let quality = quality.to_lowercase();
        POOR_DIGESTION_QUALITY_WORDS
            .iter()
            .any(|word| quality.contains(word))
    });
    if quality_match {
        return true;
    }

    let notes = event.notes.to_lowercase();
    POOR_DIGESTION_NOTE_WORDS
        .iter()
        .any(|word| notes.contains(word))
}

/// Computes [`WindowAggregate`]s. Stateless apart from the calendar offset.
#[derive(Debug, Clone)]
pub struct Aggregator {
    offset: FixedOffset,
}

impl Aggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            offset: config.local_offset(),
        }
    }

    /// Calendar day of a timestamp in the owner's local time.
    pub fn local_day(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// Aggregate events for `pet_id` with timestamps in `[range.start, range.end)`.
    ///
    /// Events for other pets or outside the range are ignored, so callers may
    /// pass a wider snapshot.
    pub fn aggregate(
        &self,
        pet_id: &str,
        range: DateRange,
        events: &[HealthEvent],
    ) -> WindowAggregate {
        let mut in_range: Vec<&HealthEvent> = events
            .iter()
            .filter(|e| e.pet_id == pet_id && range.contains(e.timestamp))
            .collect();
        // Stable output regardless of the store's ordering.
        in_range.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        let mut aggregate = WindowAggregate::empty(pet_id, range);
        let mut mood_sum = 0u32;
        let mut mood_count = 0u32;
        let mut days = BTreeSet::new();

        for event in in_range {
            aggregate.total_events += 1;
            days.insert(self.local_day(event.timestamp));

            match event.category {
                EventCategory::Meal => {
                    aggregate.meals_count += 1;
                    aggregate.meal_events.push(event.clone());
                }
                category if category.is_activity() => {
                    let minutes = event.parsed_duration_minutes();
                    if minutes == 0 && event.duration_minutes.is_some() {
                        tracing::warn!(
                            event_id = %event.id,
                            raw = ?event.duration_minutes,
                            "unparseable activity duration counted as 0"
                        );
                    }
                    aggregate.activity_minutes = aggregate.activity_minutes.saturating_add(minutes);
                }
                EventCategory::Water => aggregate.water_logs += 1,
                EventCategory::Symptom => aggregate.symptom_events.push(event.clone()),
                EventCategory::Mood => {
                    if let Some(level) = event.mood_level {
                        if !(1..=5).contains(&level) {
                            tracing::warn!(event_id = %event.id, level, "mood level clamped to 1-5");
                        }
                        mood_sum += u32::from(level.clamp(1, 5));
                        mood_count += 1;
                    }
                }
                EventCategory::Digestion => {
                    if is_poor_digestion(event) {
                        aggregate.poor_digestion_events.push(event.clone());
                    }
                }
                _ => {}
            }
        }

        if mood_count > 0 {
            aggregate.average_mood = Some(f64::from(mood_sum) / f64::from(mood_count));
        }
        aggregate.logged_days = days.len() as u32;

        tracing::debug!(
            pet_id,
            total_events = aggregate.total_events,
            meals = aggregate.meals_count,
            activity_minutes = aggregate.activity_minutes,
            symptoms = aggregate.symptom_events.len(),
            "window aggregated"
        );
        aggregate
    }

    /// Consecutive local days with at least one event, counting back from
    /// `now`. A streak still counts if today has no log yet but yesterday does.
    pub fn logging_streak(&self, pet_id: &str, events: &[HealthEvent], now: DateTime<Utc>) -> u32 {
        let days: BTreeSet<NaiveDate> = events
            .iter()
            .filter(|e| e.pet_id == pet_id && e.timestamp <= now)
            .map(|e| self.local_day(e.timestamp))
            .collect();

        let today = self.local_day(now);
        let mut cursor = if days.contains(&today) {
            Some(today)
        } else {
            today.pred_opt()
        };

        let mut streak = 0;
        while let Some(day) = cursor.filter(|d| days.contains(d)) {
            streak += 1;
            cursor = day.pred_opt();
        }
        streak
    }
}
