//! Title validation shared by create and edit-save paths.
//!
//! # Invariants
//! - Length is measured in Unicode scalar values after trimming.
//! - Validation never runs on toggle or delete.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum title length, counted after trimming.
pub const MAX_TITLE_CHARS: usize = 500;

/// Title contract violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// Trimmed title exceeds `max` characters.
    TitleTooLong { length: usize, max: usize },
}

impl Display for TitleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { length, max } => {
                write!(f, "title is too long ({length} characters, max {max})")
            }
        }
    }
}

impl Error for TitleValidationError {}

/// Checks the title contract without allocating.
pub fn validate_title(title: &str) -> Result<(), TitleValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TitleValidationError::EmptyTitle);
    }

    let length = trimmed.chars().count();
    if length > MAX_TITLE_CHARS {
        return Err(TitleValidationError::TitleTooLong {
            length,
            max: MAX_TITLE_CHARS,
        });
    }

    Ok(())
}

/// Validates and returns the trimmed title.
pub fn normalize_title(title: &str) -> Result<String, TitleValidationError> {
    validate_title(title)?;
    Ok(title.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, validate_title, TitleValidationError, MAX_TITLE_CHARS};

    #[test]
    fn length_counts_characters_not_bytes() {
        let title = "é".repeat(MAX_TITLE_CHARS);
        assert!(title.len() > MAX_TITLE_CHARS);
        validate_title(&title).expect("500 two-byte chars should pass");
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        let title = format!("  {}\t", "a".repeat(MAX_TITLE_CHARS));
        assert_eq!(
            normalize_title(&title).expect("trimmed length is 500"),
            "a".repeat(MAX_TITLE_CHARS)
        );
    }

    #[test]
    fn newline_only_title_is_empty() {
        assert_eq!(
            validate_title("\n\r\n").unwrap_err(),
            TitleValidationError::EmptyTitle
        );
    }
}
