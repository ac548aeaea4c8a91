//! Validation error types

use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check that `value` is non-blank and at most `max` characters.
pub(crate) fn check_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "content",
            max: 4096,
        };
        assert_eq!(
            err.to_string(),
            "content exceeds maximum length of 4096 characters"
        );
    }

    #[test]
    fn blank_is_empty() {
        assert_eq!(
            check_text("text", "   ", 10),
            Err(ValidationError::Empty { field: "text" })
        );
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        // 4 chars, 8 bytes
        assert!(check_text("text", "éééé", 4).is_ok());
        assert!(check_text("text", "ééééé", 4).is_err());
    }
}
