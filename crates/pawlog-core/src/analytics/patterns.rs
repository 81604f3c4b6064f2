//! Week-over-week pattern detection.
//!
//! Rules run in a fixed order and are independent of each other, except
//! that at most one activity pattern (decrease or increase) is produced.

use std::collections::{BTreeMap, HashSet};

use chrono::FixedOffset;

use crate::config::EngineConfig;
use crate::models::{MealType, Pattern, PatternKind, WindowAggregate};

/// Symptom type used when an event has none.
pub const UNKNOWN_SYMPTOM: &str = "Unknown";

/// Turns a current and previous window into a list of [`Pattern`]s.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    offset: FixedOffset,
    activity_change_threshold_pct: u32,
    meals_per_day_target: u32,
    low_mood_threshold: f64,
    recurring_symptom_min: usize,
    digestive_issue_min: usize,
    max_correlated_meal_types: usize,
}

impl PatternDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            offset: config.local_offset(),
            activity_change_threshold_pct: config.activity_change_threshold_pct,
            meals_per_day_target: config.meals_per_day_target,
            low_mood_threshold: config.low_mood_threshold,
            recurring_symptom_min: config.recurring_symptom_min.max(1),
            digestive_issue_min: config.digestive_issue_min.max(1),
            max_correlated_meal_types: config.max_correlated_meal_types,
        }
    }

    /// Detect patterns in `current` relative to `previous`.
    ///
    /// `pet_name` is used in the recommendation text. An empty current window
    /// yields no patterns.
    pub fn detect(
        &self,
        pet_name: &str,
        current: &WindowAggregate,
        previous: &WindowAggregate,
    ) -> Vec<Pattern> {
        if current.is_empty() {
            return Vec::new();
        }

        let mut patterns = Vec::new();
        patterns.extend(self.activity_change(pet_name, current, previous));
        patterns.extend(self.recurring_symptoms(pet_name, current));
        patterns.extend(self.digestive_issues(pet_name, current));
        patterns.extend(self.low_mood(pet_name, current));
        patterns.extend(self.meal_logging_gap(pet_name, current));
        patterns.extend(self.food_correlation(pet_name, current));

        tracing::debug!(
            pet_id = %current.pet_id,
            count = patterns.len(),
            "patterns detected"
        );
        patterns
    }

    fn activity_change(
        &self,
        pet_name: &str,
        current: &WindowAggregate,
        previous: &WindowAggregate,
    ) -> Option<Pattern> {
        let now = u64::from(current.activity_minutes);
        let before = u64::from(previous.activity_minutes);
        let threshold = u64::from(self.activity_change_threshold_pct);

        if now < before && before > 0 {
            // Integer comparison keeps the boundary exact: (before - now) / before >= t%.
            if (before - now) * 100 >= threshold * before {
                let pct = (before - now) as f64 / before as f64 * 100.0;
                return Some(Pattern {
                    kind: PatternKind::Warning,
                    title: "Activity Decreased".into(),
                    description: format!(
                        "Activity dropped {:.0}% compared to last week ({} min vs {} min).",
                        pct, now, before
                    ),
                    recommendation: format!(
                        "Try adding a short walk or play session to {}'s day. If low energy persists, check in with your vet.",
                        pet_name
                    ),
                });
            }
        } else if now > before && now > 0 {
            let increased = before == 0 || (now - before) * 100 >= threshold * before;
            if increased {
                let pct = if before == 0 {
                    100.0
                } else {
                    (now - before) as f64 / before as f64 * 100.0
                };
                return Some(Pattern {
                    kind: PatternKind::Positive,
                    title: "Activity Increased".into(),
                    description: format!(
                        "Activity rose {:.0}% compared to last week ({} min vs {} min).",
                        pct, now, before
                    ),
                    recommendation: format!(
                        "Great work keeping {} active. Keep the routine going.",
                        pet_name
                    ),
                });
            }
        }
        None
    }

    fn recurring_symptoms(&self, pet_name: &str, current: &WindowAggregate) -> Vec<Pattern> {
        // BTreeMap so patterns come out in a stable, alphabetical order.
        let mut groups: BTreeMap<String, usize> = BTreeMap::new();
        for event in &current.symptom_events {
            let symptom = event
                .symptom_type
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_SYMPTOM);
            *groups.entry(symptom.to_string()).or_default() += 1;
        }

        groups
            .into_iter()
            .filter(|(_, count)| *count >= self.recurring_symptom_min)
            .map(|(symptom, count)| Pattern {
                kind: PatternKind::Alert,
                title: "Recurring Symptom".into(),
                description: format!("{} was logged {} times this week.", symptom, count),
                recommendation: format!(
                    "Keep an eye on {}'s {}. If it continues, consider contacting your vet.",
                    pet_name,
                    symptom.to_lowercase()
                ),
            })
            .collect()
    }

    fn digestive_issues(&self, pet_name: &str, current: &WindowAggregate) -> Option<Pattern> {
        let count = current.poor_digestion_events.len();
        (count >= self.digestive_issue_min).then(|| Pattern {
            kind: PatternKind::Alert,
            title: "Digestive Issues".into(),
            description: format!("{} digestive problems were logged this week.", count),
            recommendation: format!(
                "Review {}'s recent diet changes and make sure fresh water is available. Contact your vet if issues continue.",
                pet_name
            ),
        })
    }

    fn low_mood(&self, pet_name: &str, current: &WindowAggregate) -> Option<Pattern> {
        let mood = current.average_mood?;
        (mood < self.low_mood_threshold).then(|| Pattern {
            kind: PatternKind::Warning,
            title: "Low Mood Trend".into(),
            description: format!("Average mood this week was {:.1} out of 5.", mood),
            recommendation: format!(
                "Extra attention, enrichment, or play may help lift {}'s spirits.",
                pet_name
            ),
        })
    }

    fn meal_logging_gap(&self, pet_name: &str, current: &WindowAggregate) -> Option<Pattern> {
        let expected = self
            .meals_per_day_target
            .saturating_mul(current.range.days());
        (current.meals_count < expected).then(|| Pattern {
            kind: PatternKind::Info,
            title: "Meal Logging".into(),
            description: format!(
                "{} meals were logged this week; about {} would give a complete picture.",
                current.meals_count, expected
            ),
            recommendation: format!(
                "Logging each of {}'s meals makes diet trends easier to spot.",
                pet_name
            ),
        })
    }

    fn food_correlation(&self, pet_name: &str, current: &WindowAggregate) -> Option<Pattern> {
        let problem_days: HashSet<_> = current
            .symptom_events
            .iter()
            .chain(&current.poor_digestion_events)
            .map(|e| e.timestamp.with_timezone(&self.offset).date_naive())
            .collect();
        if problem_days.is_empty() {
            return None;
        }

        let mut meal_types: Vec<MealType> = Vec::new();
        for meal in &current.meal_events {
            let day = meal.timestamp.with_timezone(&self.offset).date_naive();
            if !problem_days.contains(&day) {
                continue;
            }
            if let Some(meal_type) = meal.meal_type {
                if !meal_types.contains(&meal_type) {
                    meal_types.push(meal_type);
                }
            }
        }
        meal_types.truncate(self.max_correlated_meal_types);
        if meal_types.is_empty() {
            return None;
        }

        let listed = meal_types
            .iter()
            .map(MealType::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Some(Pattern {
            kind: PatternKind::Info,
            title: "Possible Food Correlation".into(),
            description: format!("Problems were logged on days with these meals: {}.", listed),
            recommendation: format!(
                "Consider noting ingredients in {}'s {} to help identify possible food sensitivities.",
                pet_name,
                listed.to_lowercase()
            ),
        })
    }
}
