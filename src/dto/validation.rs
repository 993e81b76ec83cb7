//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest text accepted from a player in a single action.
pub const MAX_PLAYER_TEXT_LENGTH: usize = 512;

/// Validates that player text fits in [`MAX_PLAYER_TEXT_LENGTH`] characters.
///
/// # Examples
///
/// ```ignore
/// validate_player_text("Neptune")            // Ok
/// validate_player_text(&"x".repeat(1024))    // Err - too long
/// ```
pub fn validate_player_text(text: &str) -> Result<(), ValidationError> {
    let length = text.chars().count();
    if length > MAX_PLAYER_TEXT_LENGTH {
        let mut err = ValidationError::new("text_length");
        err.message = Some(
            format!("Text must be at most {MAX_PLAYER_TEXT_LENGTH} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}
