//! Question and answer content entities
//!
//! Questions are immutable once built: the only constructor validates the answer
//! set, and there are no mutators beyond builder methods used when loading.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{AnswerId, CategoryId, QuestionId};
use crate::value_objects::{AnswerText, Points, QuestionText};

/// Minimum number of answers a question offers
pub const MIN_ANSWERS: usize = 2;

/// Maximum number of answers a question offers
pub const MAX_ANSWERS: usize = 4;

/// Difficulty tag attached to a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(DomainError::parse(format!("Unknown difficulty: {}", other))),
        }
    }
}

// ============================================================================
// Answer
// ============================================================================

/// One selectable answer of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    id: AnswerId,
    text: AnswerText,
    is_correct: bool,
    position: u8,
}

impl Answer {
    pub fn new(text: AnswerText, is_correct: bool) -> Self {
        Self {
            id: AnswerId::new(),
            text,
            is_correct,
            position: 0,
        }
    }

    /// Use a known ID (loading from storage or fixtures).
    pub fn with_id(mut self, id: AnswerId) -> Self {
        self.id = id;
        self
    }

    #[inline]
    pub fn id(&self) -> AnswerId {
        self.id
    }

    #[inline]
    pub fn text(&self) -> &AnswerText {
        &self.text
    }

    #[inline]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[inline]
    pub fn position(&self) -> u8 {
        self.position
    }
}

// ============================================================================
// Question
// ============================================================================

/// A question with 2..=4 ordered answers, at least one of them correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    text: QuestionText,
    answers: Vec<Answer>,
    points: Points,
    position: u32,
    category_id: Option<CategoryId>,
    difficulty: Option<Difficulty>,
    created_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Build a question, validating the answer set.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when there are fewer than 2 or more than
    /// 4 answers, or when no answer is flagged correct.
    pub fn new(text: QuestionText, answers: Vec<Answer>, points: Points) -> Result<Self, DomainError> {
        if answers.len() < MIN_ANSWERS {
            return Err(DomainError::validation(format!(
                "Question needs at least {} answers, got {}",
                MIN_ANSWERS,
                answers.len()
            )));
        }
        if answers.len() > MAX_ANSWERS {
            return Err(DomainError::validation(format!(
                "Question cannot have more than {} answers, got {}",
                MAX_ANSWERS,
                answers.len()
            )));
        }
        if !answers.iter().any(Answer::is_correct) {
            return Err(DomainError::validation(
                "Question must have at least one correct answer",
            ));
        }

        let answers = answers
            .into_iter()
            .enumerate()
            .map(|(i, mut answer)| {
                answer.position = i as u8;
                answer
            })
            .collect();

        Ok(Self {
            id: QuestionId::new(),
            text,
            answers,
            points,
            position: 0,
            category_id: None,
            difficulty: None,
            created_at: None,
        })
    }

    // =========================================================================
    // Builder methods (used when loading from storage)
    // =========================================================================

    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[inline]
    pub fn text(&self) -> &QuestionText {
        &self.text
    }

    #[inline]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[inline]
    pub fn points(&self) -> Points {
        self.points
    }

    #[inline]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[inline]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    #[inline]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    #[inline]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Look up an answer of this question.
    pub fn answer(&self, answer_id: AnswerId) -> Result<&Answer, DomainError> {
        self.answers
            .iter()
            .find(|a| a.id == answer_id)
            .ok_or(DomainError::AnswerNotFound(answer_id))
    }

    /// Whether `answer_id` is one of the correct answers.
    pub fn is_correct_answer(&self, answer_id: AnswerId) -> Result<bool, DomainError> {
        self.answer(answer_id).map(Answer::is_correct)
    }

    /// First correct answer, used to reveal the solution to clients.
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }
}
