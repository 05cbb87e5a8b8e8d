//! Party room settings and the human-friendly room code

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::content::Difficulty;
use crate::error::DomainError;
use crate::ids::CategoryId;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 8;
pub const MIN_QUESTIONS: usize = 10;
pub const MAX_QUESTIONS: usize = 30;
pub const MIN_SECONDS_PER_QUESTION: u32 = 10;
pub const MAX_SECONDS_PER_QUESTION: u32 = 30;

// ============================================================================
// RoomSettings
// ============================================================================

/// Lobby configuration chosen by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    max_players: usize,
    questions_count: usize,
    seconds_per_question: u32,
    categories: Vec<CategoryId>,
    /// `None` mixes all difficulties
    difficulty: Option<Difficulty>,
    show_correct_answer: bool,
    show_player_answers: bool,
    show_current_score: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_players: 6,
            questions_count: 15,
            seconds_per_question: 15,
            categories: Vec::new(),
            difficulty: None,
            show_correct_answer: true,
            show_player_answers: true,
            show_current_score: true,
        }
    }
}

impl RoomSettings {
    pub fn new(
        max_players: usize,
        questions_count: usize,
        seconds_per_question: u32,
    ) -> Result<Self, DomainError> {
        let settings = Self {
            max_players,
            questions_count,
            seconds_per_question,
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_categories(mut self, categories: Vec<CategoryId>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_visibility(mut self, correct_answer: bool, player_answers: bool, current_score: bool) -> Self {
        self.show_correct_answer = correct_answer;
        self.show_player_answers = player_answers;
        self.show_current_score = current_score;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(DomainError::validation(format!(
                "Max players must be between {} and {}, got {}",
                MIN_PLAYERS, MAX_PLAYERS, self.max_players
            )));
        }
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&self.questions_count) {
            return Err(DomainError::validation(format!(
                "Questions count must be between {} and {}, got {}",
                MIN_QUESTIONS, MAX_QUESTIONS, self.questions_count
            )));
        }
        if !(MIN_SECONDS_PER_QUESTION..=MAX_SECONDS_PER_QUESTION).contains(&self.seconds_per_question) {
            return Err(DomainError::validation(format!(
                "Time per question must be between {} and {} seconds, got {}",
                MIN_SECONDS_PER_QUESTION, MAX_SECONDS_PER_QUESTION, self.seconds_per_question
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn max_players(&self) -> usize {
        self.max_players
    }

    #[inline]
    pub fn questions_count(&self) -> usize {
        self.questions_count
    }

    #[inline]
    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }

    #[inline]
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    #[inline]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    #[inline]
    pub fn show_correct_answer(&self) -> bool {
        self.show_correct_answer
    }

    #[inline]
    pub fn show_player_answers(&self) -> bool {
        self.show_player_answers
    }

    #[inline]
    pub fn show_current_score(&self) -> bool {
        self.show_current_score
    }
}

// ============================================================================
// RoomCode
// ============================================================================

/// Room code of the form `ABC-123`: three uppercase letters, three digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Draw a code from an inclusive-range random source.
    pub fn generate(rng: &mut impl FnMut(i32, i32) -> i32) -> Self {
        let letters: String = (0..3)
            .map(|_| char::from(b'A' + rng(0, 25).clamp(0, 25) as u8))
            .collect();
        let digits = rng(0, 999).clamp(0, 999);
        Self(format!("{letters}-{digits:03}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = DomainError;

    /// Accepts any case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let bytes = normalized.as_bytes();
        let valid = bytes.len() == 7
            && bytes[..3].iter().all(u8::is_ascii_uppercase)
            && bytes[3] == b'-'
            && bytes[4..].iter().all(u8::is_ascii_digit);
        if !valid {
            return Err(DomainError::validation(format!(
                "Room code must look like ABC-123, got '{}'",
                s
            )));
        }
        Ok(Self(normalized))
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> String {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = RoomSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_players(), 6);
        assert_eq!(settings.questions_count(), 15);
        assert_eq!(settings.seconds_per_question(), 15);
    }

    #[test]
    fn settings_bounds() {
        assert!(RoomSettings::new(2, 10, 10).is_ok());
        assert!(RoomSettings::new(8, 30, 30).is_ok());
        assert!(RoomSettings::new(1, 15, 15).is_err());
        assert!(RoomSettings::new(9, 15, 15).is_err());
        assert!(RoomSettings::new(4, 9, 15).is_err());
        assert!(RoomSettings::new(4, 31, 15).is_err());
        assert!(RoomSettings::new(4, 15, 9).is_err());
        assert!(RoomSettings::new(4, 15, 31).is_err());
    }

    #[test]
    fn generated_code_has_expected_shape() {
        let mut values = [0, 1, 25, 7].into_iter();
        let mut rng = |_min: i32, _max: i32| values.next().unwrap_or(0);
        let code = RoomCode::generate(&mut rng);
        assert_eq!(code.as_str(), "ABZ-007");
        assert!(code.as_str().parse::<RoomCode>().is_ok());
    }

    #[test]
    fn parse_normalizes_and_validates() {
        assert_eq!("  abc-123 ".parse::<RoomCode>().unwrap().as_str(), "ABC-123");
        assert!("AB-1234".parse::<RoomCode>().is_err());
        assert!("ABC123".parse::<RoomCode>().is_err());
        assert!("A1C-123".parse::<RoomCode>().is_err());
    }
}
