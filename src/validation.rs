//! Input validation for conversation steps.
//!
//! Every error here is recoverable: the flow stays where it is and the error's `Display`
//! text is sent back as the re-prompt.

use std::num::IntErrorKind;

/// Youngest accepted age (inclusive).
pub const MIN_AGE: u8 = 1;
/// Oldest accepted age (inclusive).
pub const MAX_AGE: u8 = 120;

/// Rejected user input with the message used to re-prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name cannot be empty. Send your name.")]
    EmptyName,

    #[error("Age must be a number. Send it again.")]
    AgeNotNumber,

    #[error("Age seems invalid. Send a realistic age.")]
    AgeOutOfRange,

    #[error("Feedback cannot be empty. Send your text.")]
    EmptyFeedback,

    #[error("Broadcast text cannot be empty.")]
    EmptyBroadcast,
}

/// Validate a display name; returns the trimmed name.
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Parse an age in `MIN_AGE..=MAX_AGE`.
///
/// Integers too large for the parser are reported as out of range rather than as
/// non-numeric, since they are numbers.
pub fn parse_age(raw: &str) -> Result<u8, ValidationError> {
    let value: i64 = match raw.trim().parse() {
        Ok(v) => v,
        Err(e) => {
            return Err(match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ValidationError::AgeOutOfRange
                }
                _ => ValidationError::AgeNotNumber,
            })
        }
    };
    if value < i64::from(MIN_AGE) || value > i64::from(MAX_AGE) {
        return Err(ValidationError::AgeOutOfRange);
    }
    // range checked above
    Ok(value as u8)
}

/// Trim free text destined for staging; `empty` is returned when nothing remains.
pub fn non_empty_text(raw: &str, empty: ValidationError) -> Result<String, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        Err(empty)
    } else {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_name("  Alice \n").unwrap(), "Alice");
        assert_eq!(validate_name(" \t "), Err(ValidationError::EmptyName));
    }

    #[test]
    fn every_age_in_range_is_accepted() {
        for age in MIN_AGE..=MAX_AGE {
            assert_eq!(parse_age(&age.to_string()), Ok(age), "age {} rejected", age);
        }
        assert_eq!(parse_age(" 35 "), Ok(35));
        assert_eq!(parse_age("+7"), Ok(7));
    }

    #[test]
    fn out_of_range_ages_are_rejected() {
        for raw in ["0", "-1", "121", "999", "99999999999999999999999"] {
            assert_eq!(parse_age(raw), Err(ValidationError::AgeOutOfRange), "input {raw}");
        }
    }

    #[test]
    fn non_numeric_ages_are_rejected() {
        for raw in ["", "abc", "3.5", "thirty", "12a"] {
            assert_eq!(parse_age(raw), Err(ValidationError::AgeNotNumber), "input {raw:?}");
        }
    }

    #[test]
    fn reprompt_text_comes_from_display() {
        assert_eq!(
            ValidationError::AgeOutOfRange.to_string(),
            "Age seems invalid. Send a realistic age."
        );
        assert_eq!(
            non_empty_text("   ", ValidationError::EmptyFeedback)
                .unwrap_err()
                .to_string(),
            "Feedback cannot be empty. Send your text."
        );
    }
}
