//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted player identifier.
pub const MAX_PLAYER_ID_LEN: usize = 128;

/// Validates that a player id is non-blank and reasonably short.
///
/// # Examples
///
/// ```ignore
/// validate_player_id("guest_male_1") // Ok
/// validate_player_id("   ")          // Err - blank
/// ```
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("player_id_blank");
        err.message = Some("Player ID must not be blank".into());
        return Err(err);
    }

    if id.len() > MAX_PLAYER_ID_LEN {
        let mut err = ValidationError::new("player_id_length");
        err.message = Some(
            format!(
                "Player ID must be at most {MAX_PLAYER_ID_LEN} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a court number is positive; courts are numbered from 1.
pub fn validate_court_no(court_no: u32) -> Result<(), ValidationError> {
    if court_no == 0 {
        let mut err = ValidationError::new("court_no_range");
        err.message = Some("Court numbers start at 1".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_id() {
        assert!(validate_player_id("p-17").is_ok());
        assert!(validate_player_id("guest_female_3").is_ok());
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id("  ").is_err());
        assert!(validate_player_id(&"x".repeat(MAX_PLAYER_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_court_no() {
        assert!(validate_court_no(1).is_ok());
        assert!(validate_court_no(0).is_err());
    }
}
