//! Composite health score.
//!
//! Four dimensions, each 0-100, combined by a weighted mean:
//!
//! - **activity**: walk + play minutes against `daily_activity_goal_minutes`
//!   per day, saturating at 100.
//! - **nutrition**: up to 80 points for meals per day, full marks between the
//!   target and target + 1, tapering above; up to 20 points for water logs
//!   (one per day earns the full 20).
//! - **wellness**: starts at 100, minus 10 per symptom, 8 per poor-digestion
//!   event, and 20 per point of average mood below the low-mood threshold.
//! - **consistency**: share of days in the window with at least one log.
//!
//! Only the label banding (80 / 60) is fixed; the formulas are tunable
//! through [`EngineConfig`].

use crate::config::{EngineConfig, ScoreWeights};
use crate::models::{HealthScore, ScoreLabel, WindowAggregate};

const MEAL_POINTS: f64 = 80.0;
const WATER_POINTS: f64 = 20.0;
const OVERFEEDING_PENALTY_PER_MEAL: f64 = 20.0;
const MIN_OVERFED_MEAL_POINTS: f64 = 40.0;
const SYMPTOM_PENALTY: f64 = 10.0;
const POOR_DIGESTION_PENALTY: f64 = 8.0;
const LOW_MOOD_PENALTY_PER_POINT: f64 = 20.0;

/// Computes [`HealthScore`]s from a window aggregate.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoreWeights,
    daily_activity_goal_minutes: u32,
    meals_per_day_target: u32,
    low_mood_threshold: f64,
}

impl ScoreCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.score_weights.clone(),
            daily_activity_goal_minutes: config.daily_activity_goal_minutes,
            meals_per_day_target: config.meals_per_day_target,
            low_mood_threshold: config.low_mood_threshold,
        }
    }

    /// Score using the window's own count of logged days as consistency.
    pub fn score(&self, window: &WindowAggregate) -> HealthScore {
        self.score_with_consistency(window, window.logged_days)
    }

    /// Score with an explicit consistency measure: days with at least one
    /// log, or a rolling streak, capped at the window length.
    pub fn score_with_consistency(&self, window: &WindowAggregate, logged_days: u32) -> HealthScore {
        if window.is_empty() {
            return HealthScore::empty();
        }

        let days = f64::from(window.range.days());
        let activity = self.activity_score(window, days);
        let nutrition = self.nutrition_score(window, days);
        let wellness = self.wellness_score(window);
        let consistency = f64::from(logged_days).min(days) / days * 100.0;

        let w = &self.weights;
        let total_weight = w.total();
        let overall = if total_weight > 0.0 {
            (activity * w.activity
                + nutrition * w.nutrition
                + wellness * w.wellness
                + consistency * w.consistency)
                / total_weight
        } else {
            (activity + nutrition + wellness + consistency) / 4.0
        };

        let overall = to_score(overall);
        let score = HealthScore {
            overall,
            activity: to_score(activity),
            nutrition: to_score(nutrition),
            wellness: to_score(wellness),
            consistency: to_score(consistency),
            label: ScoreLabel::for_score(overall),
        };
        tracing::debug!(
            pet_id = %window.pet_id,
            overall = score.overall,
            activity = score.activity,
            nutrition = score.nutrition,
            wellness = score.wellness,
            consistency = score.consistency,
            "health score computed"
        );
        score
    }

    fn activity_score(&self, window: &WindowAggregate, days: f64) -> f64 {
        let goal = f64::from(self.daily_activity_goal_minutes) * days;
        if goal <= 0.0 {
            return if window.activity_minutes > 0 { 100.0 } else { 0.0 };
        }
        (f64::from(window.activity_minutes) / goal * 100.0).min(100.0)
    }

    fn nutrition_score(&self, window: &WindowAggregate, days: f64) -> f64 {
        let target = f64::from(self.meals_per_day_target.max(1));
        let meals_per_day = f64::from(window.meals_count) / days;

        let meal_points = if meals_per_day < target {
            MEAL_POINTS * meals_per_day / target
        } else if meals_per_day <= target + 1.0 {
            MEAL_POINTS
        } else {
            let excess = meals_per_day - (target + 1.0);
            (MEAL_POINTS - excess * OVERFEEDING_PENALTY_PER_MEAL).max(MIN_OVERFED_MEAL_POINTS)
        };

        let water_points = (f64::from(window.water_logs) / days).min(1.0) * WATER_POINTS;
        meal_points + water_points
    }

    fn wellness_score(&self, window: &WindowAggregate) -> f64 {
        let mut score = 100.0;
        score -= window.symptom_events.len() as f64 * SYMPTOM_PENALTY;
        score -= window.poor_digestion_events.len() as f64 * POOR_DIGESTION_PENALTY;
        if let Some(mood) = window.average_mood {
            if mood < self.low_mood_threshold {
                score -= (self.low_mood_threshold - mood) * LOW_MOOD_PENALTY_PER_POINT;
            }
        }
        score.clamp(0.0, 100.0)
    }
}

/// Round and clamp to 0-100; NaN becomes 0.
fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
