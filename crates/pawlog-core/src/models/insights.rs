//! Derived, non-persisted analytics types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::HealthEvent;

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days` days ending at `end`, clamped to the earliest representable
    /// instant.
    pub fn trailing_days(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: days_before(end, days),
            end,
        }
    }

    /// The window of equal length immediately before this one.
    pub fn preceding(&self) -> Self {
        let length = self.end - self.start;
        Self {
            start: self
                .start
                .checked_sub_signed(length)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: self.start,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    /// Length in whole days, rounded up, never less than one.
    pub fn days(&self) -> u32 {
        let seconds = (self.end - self.start).num_seconds().max(0);
        let days = (seconds + 86_399) / 86_400;
        u32::try_from(days.max(1)).unwrap_or(u32::MAX)
    }
}

/// `ts` minus `days` whole days, saturating at `DateTime::MIN_UTC`.
pub(crate) fn days_before(ts: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    ts.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Per-category summary of one pet's events over a range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowAggregate {
    pub pet_id: String,
    pub range: DateRange,
    pub total_events: u32,
    pub meals_count: u32,
    /// Walk + Playtime minutes
    pub activity_minutes: u32,
    /// Kept whole so detectors can group by symptom type
    pub symptom_events: Vec<HealthEvent>,
    pub average_mood: Option<f64>,
    pub poor_digestion_events: Vec<HealthEvent>,
    /// Meal events, oldest first
    pub meal_events: Vec<HealthEvent>,
    pub water_logs: u32,
    /// Distinct calendar days with at least one event
    pub logged_days: u32,
}

impl WindowAggregate {
    /// Aggregate of a range with no events.
    pub fn empty(pet_id: &str, range: DateRange) -> Self {
        Self {
            pet_id: pet_id.to_string(),
            range,
            total_events: 0,
            meals_count: 0,
            activity_minutes: 0,
            symptom_events: Vec::new(),
            average_mood: None,
            poor_digestion_events: Vec::new(),
            meal_events: Vec::new(),
            water_logs: 0,
            logged_days: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_events == 0
    }
}

/// Severity tier of a detected pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Positive,
    Warning,
    Alert,
    Info,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Positive => "positive",
            PatternKind::Warning => "warning",
            PatternKind::Alert => "alert",
            PatternKind::Info => "info",
        }
    }
}

/// A detected trend or anomaly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

/// Band of the composite score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScoreLabel {
    /// 80 and above
    Excellent,
    /// 60 up to 80
    Good,
    /// Below 60
    NeedsAttention,
}

impl ScoreLabel {
    pub fn for_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreLabel::Excellent,
            60..=79 => ScoreLabel::Good,
            _ => ScoreLabel::NeedsAttention,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Good => "Good",
            ScoreLabel::NeedsAttention => "Needs Attention",
        }
    }
}

/// Composite 0-100 wellness indicator with its four dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthScore {
    pub overall: u8,
    pub activity: u8,
    pub nutrition: u8,
    pub wellness: u8,
    pub consistency: u8,
    pub label: ScoreLabel,
}

impl HealthScore {
    /// Score for a window with nothing logged.
    pub fn empty() -> Self {
        Self {
            overall: 0,
            activity: 0,
            nutrition: 0,
            wellness: 0,
            consistency: 0,
            label: ScoreLabel::NeedsAttention,
        }
    }
}

/// Fraction of expected doses actually given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdherenceRate {
    pub medication_id: String,
    /// In [0, 1]
    pub rate: f64,
    pub expected_doses: u32,
    pub actual_doses: u32,
    pub skipped_doses: u32,
    pub lookback_days: u32,
}

impl AdherenceRate {
    /// Rate as a whole percentage.
    pub fn percent(&self) -> u8 {
        (self.rate * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_trailing_and_preceding_ranges() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let current = DateRange::trailing_days(now, 7);
        let previous = current.preceding();

        assert_eq!(current.days(), 7);
        assert_eq!(previous.end, current.start);
        assert_eq!(previous.days(), 7);
        assert!(current.contains(current.start));
        assert!(!current.contains(current.end));
        assert!(!previous.contains(current.start));
    }

    #[test]
    fn test_ranges_saturate_at_earliest_instant() {
        let earliest = DateTime::<Utc>::MIN_UTC;
        let current = DateRange::trailing_days(earliest, 7);
        assert_eq!(current.start, earliest);
        assert_eq!(current.end, earliest);

        let near = earliest + Duration::days(3);
        let current = DateRange::trailing_days(near, 7);
        assert_eq!(current.start, earliest);
        let previous = current.preceding();
        assert_eq!(previous.start, earliest);
        assert_eq!(previous.end, earliest);
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let range = DateRange::new(start, start + Duration::hours(30));
        assert_eq!(range.days(), 2);

        let degenerate = DateRange::new(start, start);
        assert_eq!(degenerate.days(), 1);
    }

    #[test]
    fn test_score_label_banding() {
        assert_eq!(ScoreLabel::for_score(100), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::for_score(80), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::for_score(79), ScoreLabel::Good);
        assert_eq!(ScoreLabel::for_score(60), ScoreLabel::Good);
        assert_eq!(ScoreLabel::for_score(59), ScoreLabel::NeedsAttention);
        assert_eq!(ScoreLabel::for_score(0), ScoreLabel::NeedsAttention);
    }
}
