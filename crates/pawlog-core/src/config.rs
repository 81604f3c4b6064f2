//! Engine configuration.
//!
//! Every threshold the analytics and reminder layers use lives here so the
//! host app can tune them without a rebuild. Missing keys fall back to the
//! defaults below.

use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest analytics window or adherence lookback, in days.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Relative weight of each health score dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub activity: f64,
    pub nutrition: f64,
    pub wellness: f64,
    pub consistency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            activity: 0.30,
            nutrition: 0.25,
            wellness: 0.30,
            consistency: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.activity + self.nutrition + self.wellness + self.consistency
    }
}

/// Tunable parameters for analytics and reminders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Digest and score window length in days
    pub window_days: u32,
    /// Offset of the owner's local time from UTC, for calendar-day bucketing
    pub utc_offset_minutes: i32,
    /// Minimum week-over-week activity change that produces a pattern
    pub activity_change_threshold_pct: u32,
    /// Meals per day below which the logging gap pattern fires
    pub meals_per_day_target: u32,
    /// Average mood below this is a low mood trend
    pub low_mood_threshold: f64,
    /// Occurrences of one symptom type that make it recurring
    pub recurring_symptom_min: usize,
    /// Poor digestion events that make a digestive issue
    pub digestive_issue_min: usize,
    /// Cap on meal types listed in a food correlation
    pub max_correlated_meal_types: usize,
    /// Daily walk + play goal used by the activity score
    pub daily_activity_goal_minutes: u32,
    pub score_weights: ScoreWeights,
    /// Default adherence window
    pub adherence_lookback_days: u32,
    /// Reminder slots cancelled per medication when no larger count is known
    pub reminder_slots: usize,
    /// Hour of day for one-time refill reminders
    pub refill_reminder_hour: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            utc_offset_minutes: 0,
            activity_change_threshold_pct: 20,
            meals_per_day_target: 2,
            low_mood_threshold: 3.0,
            recurring_symptom_min: 2,
            digestive_issue_min: 2,
            max_correlated_meal_types: 3,
            daily_activity_goal_minutes: 30,
            score_weights: ScoreWeights::default(),
            adherence_lookback_days: 7,
            reminder_slots: 10,
            refill_reminder_hour: 9,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.window_days) {
            return Err(invalid("window_days", "must be 1-3650"));
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.adherence_lookback_days) {
            return Err(invalid("adherence_lookback_days", "must be 1-3650"));
        }
        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err(invalid("utc_offset_minutes", "must be within +/-14 hours"));
        }
        if self.reminder_slots == 0 {
            return Err(invalid("reminder_slots", "must be at least 1"));
        }
        if self.refill_reminder_hour > 23 {
            return Err(invalid("refill_reminder_hour", "must be 0-23"));
        }
        if !self.low_mood_threshold.is_finite() {
            return Err(invalid("low_mood_threshold", "must be a finite number"));
        }
        let w = &self.score_weights;
        let weights = [w.activity, w.nutrition, w.wellness, w.consistency];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) || w.total() <= 0.0 {
            return Err(invalid(
                "score_weights",
                "weights must be non-negative with a positive sum",
            ));
        }
        Ok(())
    }

    /// Owner's local offset; out-of-range values fall back to UTC.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_days, 7);
        assert_eq!(config.reminder_slots, 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"window_days": 14, "utc_offset_minutes": -300}"#)
            .unwrap();
        assert_eq!(config.window_days, 14);
        assert_eq!(config.activity_change_threshold_pct, 20);
        assert_eq!(config.local_offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_partial_weights_use_defaults() {
        let config = EngineConfig::from_json(r#"{"score_weights": {"activity": 1.0}}"#).unwrap();
        assert_eq!(config.score_weights.activity, 1.0);
        assert_eq!(config.score_weights.nutrition, 0.25);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"window_days": 0}"#),
            Err(ConfigError::Invalid { field: "window_days", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"window_days": 4000000000}"#),
            Err(ConfigError::Invalid { field: "window_days", .. })
        ));
        assert!(EngineConfig::from_json(r#"{"window_days": 3650}"#).is_ok());
        assert!(matches!(
            EngineConfig::from_json(r#"{"adherence_lookback_days": 3651}"#),
            Err(ConfigError::Invalid { field: "adherence_lookback_days", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"adherence_lookback_days": 0}"#),
            Err(ConfigError::Invalid { field: "adherence_lookback_days", .. })
        ));
        assert!(EngineConfig::from_json(r#"{"refill_reminder_hour": 24}"#).is_err());
        assert!(EngineConfig::from_json(
            r#"{"score_weights": {"activity": 0, "nutrition": 0, "wellness": 0, "consistency": 0}}"#
        )
        .is_err());
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(matches!(
            EngineConfig::from_path("/nonexistent/pawlog.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
