//! Domain models for the pet health journal.

mod event;
pub(crate) mod insights;
mod medication;
mod pet;

pub use event::*;
pub use insights::*;
pub use medication::*;
pub use pet::*;

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;

/// Validation errors for domain records.
#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Value out of range for {field}: {value}")]
    OutOfRange { field: &'static str, value: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Instants with a year outside 0000-9999 have no fixed-width RFC 3339 form.
pub fn check_timestamp(field: &'static str, ts: &DateTime<Utc>) -> ModelResult<()> {
    if (0..=9999).contains(&ts.year()) {
        Ok(())
    } else {
        Err(ModelError::OutOfRange {
            field,
            value: ts.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_check_timestamp_year_bounds() {
        let first = Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        assert!(check_timestamp("timestamp", &first).is_ok());
        assert!(check_timestamp("timestamp", &last).is_ok());

        let too_late = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let too_early = Utc.with_ymd_and_hms(-1, 12, 31, 0, 0, 0).unwrap();
        assert!(matches!(
            check_timestamp("timestamp", &too_late),
            Err(ModelError::OutOfRange { field: "timestamp", .. })
        ));
        assert!(check_timestamp("timestamp", &too_early).is_err());
    }
}
