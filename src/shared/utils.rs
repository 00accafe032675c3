//! Utility functions and helpers

use crate::shared::errors::AmmError;
use crate::shared::types::TimestampMs;

/// Joins the two rune ids of a pool or farm id
pub const ID_SEPARATOR: char = '-';

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Reject requests whose deadline has already passed
pub fn ensure_deadline(deadline: TimestampMs, now: TimestampMs) -> Result<(), AmmError> {
    if now > deadline {
        return Err(AmmError::DeadlineExpired { deadline, now });
    }
    Ok(())
}

/// Rune ids are joined into pool and farm ids, so they cannot carry the separator
pub fn validate_rune_id(rune_id: &str) -> Result<(), AmmError> {
    if rune_id.is_empty() || rune_id.contains(ID_SEPARATOR) {
        return Err(AmmError::InvalidRuneId(rune_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_is_inclusive() {
        assert!(ensure_deadline(1_000, 999).is_ok());
        assert!(ensure_deadline(1_000, 1_000).is_ok());
        assert_eq!(
            ensure_deadline(1_000, 1_001),
            Err(AmmError::DeadlineExpired { deadline: 1_000, now: 1_001 })
        );
    }

    #[test]
    fn test_rune_id_cannot_hold_separator() {
        assert!(validate_rune_id("840000:1").is_ok());
        assert_eq!(validate_rune_id("a-b"), Err(AmmError::InvalidRuneId("a-b".to_string())));
        assert_eq!(validate_rune_id(""), Err(AmmError::InvalidRuneId(String::new())));
    }

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
