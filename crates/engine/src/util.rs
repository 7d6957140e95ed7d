//! Internal helpers for request validation.
//!
//! These utilities are **not** part of the public API. They run before the
//! store is touched, so a rejected request never has side effects.

use chrono::{DateTime, Utc};

use crate::{EngineError, ResultEngine};

/// Longest accepted wallet or category name, in characters.
pub(crate) const MAX_NAME_LEN: usize = 20;

/// Seconds from the Unix epoch to `0001-01-01T00:00:00Z`.
const ZERO_INSTANT_SECS: i64 = -62_135_596_800;

/// Trim a wallet/category name and check it is usable as a key.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(EngineError::Validation(format!(
            "{label} name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Resolve the occurrence time of a new transaction.
///
/// Clients that serialize an unset date send the zero instant
/// `0001-01-01T00:00:00Z`; it is treated the same as no date at all.
pub(crate) fn resolve_occurred_at(
    occurred_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match occurred_at {
        Some(at) if at.timestamp() != ZERO_INSTANT_SECS => at,
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(
            normalize_required_name("  Checking ", "wallet").unwrap(),
            "Checking"
        );
    }

    #[test]
    fn empty_and_long_names_are_rejected() {
        assert_eq!(
            normalize_required_name("   ", "wallet"),
            Err(EngineError::Validation(
                "wallet name must not be empty".to_string()
            ))
        );
        assert!(normalize_required_name(&"x".repeat(MAX_NAME_LEN), "category").is_ok());
        assert!(normalize_required_name(&"x".repeat(MAX_NAME_LEN + 1), "category").is_err());
    }

    #[test]
    fn missing_or_zero_date_means_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let zero = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        let given = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();

        assert_eq!(resolve_occurred_at(None, now), now);
        assert_eq!(resolve_occurred_at(Some(zero), now), now);
        assert_eq!(resolve_occurred_at(Some(given), now), given);
    }
}
