//! Input validation for request fields.

use database::Gender;
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Empty value where one is required.
    #[error("{0} required")]
    Empty(String),
    /// Value too long.
    #[error("{field} is too long ({actual} chars, max {max})")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },
    /// Number outside the accepted range.
    #[error("{field} must be between {min} and {max} (got {actual})")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },
    /// Negative value where a non-negative one is required.
    #[error("{field} cannot be negative (got {actual})")]
    Negative { field: String, actual: i64 },
    /// Not one of `male`, `female`, `any`.
    #[error("invalid {field}: {value:?} (expected male, female or any)")]
    InvalidGender { field: String, value: String },
}

/// Maximum allowed length for user and session identifiers.
pub const MAX_ID_LENGTH: usize = 128;

/// Maximum allowed length for a chat message.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Lowest accepted rating.
pub const MIN_RATING: i64 = 1;

/// Highest accepted rating.
pub const MAX_RATING: i64 = 5;

/// Validate an identifier field (user, session, sender, rater).
///
/// The value is checked but not trimmed; ids are opaque.
pub fn validate_id(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let len = value.chars().count();
    if len > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate chat message text.
pub fn validate_message_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty("message".to_string()));
    }

    let len = text.chars().count();
    if len > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "message".to_string(),
            max: MAX_MESSAGE_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate a rating value.
pub fn validate_rating(rating: i64) -> Result<(), ValidationError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: MIN_RATING,
            max: MAX_RATING,
            actual: rating,
        });
    }

    Ok(())
}

/// Validate a polling cursor.
pub fn validate_since_id(since_id: i64) -> Result<(), ValidationError> {
    if since_id < 0 {
        return Err(ValidationError::Negative {
            field: "since_id".to_string(),
            actual: since_id,
        });
    }

    Ok(())
}

/// Parse a gender field. An empty value means `any`.
pub fn parse_gender(field: &str, value: &str) -> Result<Gender, ValidationError> {
    if value.trim().is_empty() {
        return Ok(Gender::Any);
    }

    Gender::parse(value).ok_or_else(|| ValidationError::InvalidGender {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("user_id", "anon-1").is_ok());

        assert!(matches!(
            validate_id("user_id", ""),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_id("user_id", "   "),
            Err(ValidationError::Empty(_))
        ));

        let long_id = "a".repeat(MAX_ID_LENGTH + 1);
        assert!(matches!(
            validate_id("user_id", &long_id),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_message_text() {
        assert!(validate_message_text("hi").is_ok());
        assert!(matches!(
            validate_message_text(" \n"),
            Err(ValidationError::Empty(_))
        ));

        // Length counts characters, not bytes.
        let max_multibyte = "я".repeat(MAX_MESSAGE_LENGTH);
        assert!(validate_message_text(&max_multibyte).is_ok());
        let too_long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(matches!(
            validate_message_text(&too_long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_rating() {
        for rating in 1..=5 {
            assert!(validate_rating(rating).is_ok());
        }
        assert!(matches!(
            validate_rating(0),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_rating(6),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_since_id() {
        assert!(validate_since_id(0).is_ok());
        assert!(matches!(
            validate_since_id(-1),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_parse_gender() {
        assert_eq!(parse_gender("user_gender", "male"), Ok(Gender::Male));
        assert_eq!(parse_gender("user_gender", "Female"), Ok(Gender::Female));
        assert_eq!(parse_gender("user_gender", "ANY"), Ok(Gender::Any));
        assert_eq!(parse_gender("user_gender", ""), Ok(Gender::Any));
        assert!(matches!(
            parse_gender("user_gender", "robot"),
            Err(ValidationError::InvalidGender { .. })
        ));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::Empty("user_id".to_string());
        assert_eq!(err.to_string(), "user_id required");

        let err = ValidationError::TooLong {
            field: "message".to_string(),
            max: 4000,
            actual: 4001,
        };
        assert_eq!(err.to_string(), "message is too long (4001 chars, max 4000)");
    }
}
