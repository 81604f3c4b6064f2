//! Deterministic notification identifiers.
//!
//! Identifiers are derived only from the medication ID and the slot index,
//! so cancel-then-reschedule always addresses the same reminders.

/// Identifier for the `index`-th scheduled time of a medication.
pub fn dose_identifier(medication_id: &str, index: usize) -> String {
    format!("medication-{}-{}", medication_id, index)
}

/// Identifier for a medication's one-time refill reminder.
pub fn refill_identifier(medication_id: &str) -> String {
    format!("medication-refill-{}", medication_id)
}

/// Every identifier to cancel for a medication: dose slots `0..slots`
/// followed by the refill identifier.
pub fn cancellation_identifiers(medication_id: &str, slots: usize) -> Vec<String> {
    let mut ids: Vec<String> = (0..slots)
        .map(|index| dose_identifier(medication_id, index))
        .collect();
    ids.push(refill_identifier(medication_id));
    ids
}

/// Whether an identifier belongs to the given medication.
pub fn belongs_to(identifier: &str, medication_id: &str) -> bool {
    if identifier == refill_identifier(medication_id) {
        return true;
    }
    identifier
        .strip_prefix("medication-")
        .and_then(|rest| rest.strip_prefix(medication_id))
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_format() {
        assert_eq!(dose_identifier("abc", 0), "medication-abc-0");
        assert_eq!(dose_identifier("abc", 9), "medication-abc-9");
        assert_eq!(refill_identifier("abc"), "medication-refill-abc");
    }

    #[test]
    fn test_cancellation_identifiers() {
        let ids = cancellation_identifiers("abc", 10);
        assert_eq!(ids.len(), 11);
        assert_eq!(ids[0], "medication-abc-0");
        assert_eq!(ids[9], "medication-abc-9");
        assert_eq!(ids[10], "medication-refill-abc");
    }

    #[test]
    fn test_belongs_to() {
        assert!(belongs_to("medication-abc-3", "abc"));
        assert!(belongs_to("medication-refill-abc", "abc"));
        assert!(!belongs_to("medication-abcd-3", "abc"));
        assert!(!belongs_to("medication-abc-", "abc"));
        assert!(!belongs_to("medication-abc-x", "abc"));
        assert!(!belongs_to("medication-refill-abcd", "abc"));
    }
}
