//! Validated text newtypes for quiz content
//!
//! These newtypes ensure that content text is valid by construction:
//! - Non-empty after trimming
//! - Within the length limit of the field
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const MAX_QUIZ_TITLE_LENGTH: usize = 200;
const MAX_QUESTION_TEXT_LENGTH: usize = 500;
const MAX_ANSWER_TEXT_LENGTH: usize = 200;
const MAX_CATEGORY_NAME_LENGTH: usize = 100;

fn validate_text(label: &str, value: String, max: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", label)));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} characters",
            label, max
        )));
    }
    Ok(trimmed.to_string())
}

macro_rules! define_text {
    ($(#[$meta:meta])* $name:ident, $label:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                validate_text($label, value.into(), $max).map(Self)
            }

            /// Returns the text as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }
    };
}

define_text!(
    /// A validated quiz title (non-empty, <=200 chars, trimmed)
    QuizTitle,
    "Quiz title",
    MAX_QUIZ_TITLE_LENGTH
);

define_text!(
    /// A validated question text (non-empty, <=500 chars, trimmed)
    QuestionText,
    "Question text",
    MAX_QUESTION_TEXT_LENGTH
);

define_text!(
    /// A validated answer text (non-empty, <=200 chars, trimmed)
    AnswerText,
    "Answer text",
    MAX_ANSWER_TEXT_LENGTH
);

define_text!(
    /// A validated category name (non-empty, <=100 chars, trimmed)
    CategoryName,
    "Category name",
    MAX_CATEGORY_NAME_LENGTH
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        let title = QuizTitle::new("  Capitals of Europe  ").unwrap();
        assert_eq!(title.as_str(), "Capitals of Europe");
    }

    #[test]
    fn test_rejects_empty() {
        let err = QuestionText::new("   ").unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Question text cannot be empty");
    }

    #[test]
    fn test_length_limits() {
        assert!(QuizTitle::new("a".repeat(200)).is_ok());
        assert!(QuizTitle::new("a".repeat(201)).is_err());
        assert!(QuestionText::new("q".repeat(500)).is_ok());
        assert!(QuestionText::new("q".repeat(501)).is_err());
        assert!(AnswerText::new("x".repeat(201)).is_err());
        assert!(CategoryName::new("c".repeat(101)).is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 100 two-byte characters
        assert!(CategoryName::new("ё".repeat(100)).is_ok());
    }

    #[test]
    fn test_serde_validates() {
        assert!(serde_json::from_str::<AnswerText>("\"Paris\"").is_ok());
        assert!(serde_json::from_str::<AnswerText>("\"  \"").is_err());
    }
}
