//! Quiz classification tags
//!
//! A tag reads `{category}:{value}`, e.g. `language:go` or
//! `difficulty:easy`. Both halves are lowercase ASCII letters, digits and
//! hyphens.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const MAX_TAG_LENGTH: usize = 100;

/// Categories a tag may belong to
pub const TAG_CATEGORIES: [&str; 5] = ["language", "difficulty", "topic", "domain", "format"];

/// A validated `{category}:{value}` tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::validation("Tag cannot be empty"));
        }
        if value.len() > MAX_TAG_LENGTH {
            return Err(DomainError::validation(format!(
                "Tag cannot exceed {} characters",
                MAX_TAG_LENGTH
            )));
        }
        if value.contains(char::is_whitespace) {
            return Err(DomainError::validation("Tag cannot contain spaces, use hyphens"));
        }
        if value.chars().any(|c| c.is_uppercase()) {
            return Err(DomainError::validation("Tag must be lowercase"));
        }

        let (category, rest) = value
            .split_once(':')
            .ok_or_else(|| DomainError::validation("Tag must look like category:value"))?;
        let part_ok = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        };
        if !part_ok(category) || !part_ok(rest) {
            return Err(DomainError::validation(
                "Tag parts may only use lowercase letters, digits and hyphens",
            ));
        }
        if !TAG_CATEGORIES.contains(&category) {
            return Err(DomainError::validation(format!(
                "Unknown tag category '{}', expected one of {}",
                category,
                TAG_CATEGORIES.join(", ")
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the colon, e.g. `language`.
    pub fn category(&self) -> &str {
        self.0.split_once(':').map_or("", |(category, _)| category)
    }

    /// The part after the colon, e.g. `go`.
    pub fn value(&self) -> &str {
        self.0.split_once(':').map_or("", |(_, value)| value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Tag {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> String {
        tag.0
    }
}

impl std::str::FromStr for Tag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_category_and_value() {
        let tag = Tag::new("topic:web-development").unwrap();
        assert_eq!(tag.category(), "topic");
        assert_eq!(tag.value(), "web-development");
    }

    #[test]
    fn rejects_malformed_tags() {
        for bad in [
            "",
            "language go",
            "Language:go",
            "languagego",
            "language:",
            ":go",
            "language:go:extra",
            "language:c++",
            "flavour:vanilla",
        ] {
            assert!(Tag::new(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(Tag::new(format!("topic:{}", "a".repeat(95))).is_err());
    }

    #[test]
    fn every_category_is_accepted() {
        for category in TAG_CATEGORIES {
            assert!(Tag::new(format!("{category}:x1")).is_ok());
        }
    }

    #[test]
    fn serde_validates() {
        assert_eq!(
            serde_json::from_str::<Tag>("\"difficulty:easy\"").unwrap().value(),
            "easy"
        );
        assert!(serde_json::from_str::<Tag>("\"difficulty easy\"").is_err());
    }
}
