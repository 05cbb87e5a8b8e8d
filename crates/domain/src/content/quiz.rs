//! Quiz aggregate - an ordered question set plus its scoring settings
//!
//! From the game modes' point of view a quiz is read-only: sessions hold a
//! reference for scoring and never mutate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CategoryId, QuestionId, QuizId};
use crate::value_objects::{PassingScore, Points, QuizTitle, Tag, TimeLimit};

use super::question::Question;

/// Maximum number of questions in a single quiz
pub const MAX_QUESTIONS_PER_QUIZ: usize = 50;

pub const MAX_TAGS_PER_QUIZ: usize = 10;

/// A quiz: ordered questions and the settings used to score them
///
/// # Invariants
///
/// - At most [`MAX_QUESTIONS_PER_QUIZ`] questions, no duplicate question IDs
/// - At most [`MAX_TAGS_PER_QUIZ`] distinct tags
/// - Every question has at least one correct answer (guaranteed by `Question::new`)
/// - The time limit is always positive (guaranteed by `TimeLimit`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    id: QuizId,
    title: QuizTitle,
    description: String,
    category_id: Option<CategoryId>,
    #[serde(default)]
    tags: Vec<Tag>,
    questions: Vec<Question>,
    time_limit: TimeLimit,
    passing_score: PassingScore,
    base_points: Points,
    max_time_bonus: u32,
    streak_threshold: u32,
    streak_bonus: u32,
    created_at: DateTime<Utc>,
}

impl Quiz {
    // =========================================================================
    // Constructor
    // =========================================================================

    pub fn new(
        title: QuizTitle,
        time_limit: TimeLimit,
        passing_score: PassingScore,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: QuizId::new(),
            title,
            description: String::new(),
            category_id: None,
            tags: Vec::new(),
            questions: Vec::new(),
            time_limit,
            passing_score,
            base_points: Points::zero(),
            max_time_bonus: 0,
            streak_threshold: 0,
            streak_bonus: 0,
            created_at,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    pub fn with_id(mut self, id: QuizId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Default points for questions that carry zero points of their own.
    pub fn with_base_points(mut self, base_points: Points) -> Self {
        self.base_points = base_points;
        self
    }

    pub fn with_max_time_bonus(mut self, max_time_bonus: u32) -> Self {
        self.max_time_bonus = max_time_bonus;
        self
    }

    pub fn with_streak_bonus(mut self, threshold: u32, bonus: u32) -> Self {
        self.streak_threshold = threshold;
        self.streak_bonus = bonus;
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Result<Self, DomainError> {
        for tag in tags {
            self.add_tag(tag)?;
        }
        Ok(self)
    }

    /// Build a quiz from an already ordered list of questions.
    pub fn with_questions(mut self, questions: Vec<Question>) -> Result<Self, DomainError> {
        for question in questions {
            self.add_question(question)?;
        }
        Ok(self)
    }

    // =========================================================================
    // Mutations (authoring side only)
    // =========================================================================

    /// Append a question, assigning its position.
    pub fn add_question(&mut self, question: Question) -> Result<(), DomainError> {
        if self.questions.len() >= MAX_QUESTIONS_PER_QUIZ {
            return Err(DomainError::validation(format!(
                "Quiz cannot have more than {} questions",
                MAX_QUESTIONS_PER_QUIZ
            )));
        }
        if self.questions.iter().any(|q| q.id() == question.id()) {
            return Err(DomainError::validation(format!(
                "Question {} is already part of this quiz",
                question.id()
            )));
        }
        if question.correct_answer().is_none() {
            return Err(DomainError::validation(
                "Question must have at least one correct answer",
            ));
        }

        let position = self.questions.len() as u32;
        self.questions.push(question.with_position(position));
        Ok(())
    }

    /// Attach a tag. Adding a tag the quiz already has is a no-op.
    pub fn add_tag(&mut self, tag: Tag) -> Result<(), DomainError> {
        if self.tags.contains(&tag) {
            return Ok(());
        }
        if self.tags.len() >= MAX_TAGS_PER_QUIZ {
            return Err(DomainError::validation(format!(
                "Quiz cannot have more than {} tags",
                MAX_TAGS_PER_QUIZ
            )));
        }
        self.tags.push(tag);
        Ok(())
    }

    pub fn remove_tag(&mut self, tag: &Tag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[inline]
    pub fn title(&self) -> &QuizTitle {
        &self.title
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    #[inline]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[inline]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[inline]
    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }

    #[inline]
    pub fn passing_score(&self) -> PassingScore {
        self.passing_score
    }

    #[inline]
    pub fn base_points(&self) -> Points {
        self.base_points
    }

    #[inline]
    pub fn max_time_bonus(&self) -> u32 {
        self.max_time_bonus
    }

    #[inline]
    pub fn streak_threshold(&self) -> u32 {
        self.streak_threshold
    }

    #[inline]
    pub fn streak_bonus(&self) -> u32 {
        self.streak_bonus
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// A quiz can be played when it has questions and a positive time limit.
    pub fn can_start(&self) -> Result<(), DomainError> {
        if self.questions.is_empty() {
            return Err(DomainError::cannot_start("quiz has no questions"));
        }
        if self.time_limit.seconds() == 0 {
            return Err(DomainError::cannot_start("time limit must be positive"));
        }
        Ok(())
    }

    pub fn question(&self, question_id: QuestionId) -> Result<&Question, DomainError> {
        self.questions
            .iter()
            .find(|q| q.id() == question_id)
            .ok_or(DomainError::QuestionNotFound(question_id))
    }

    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn contains_question(&self, question_id: QuestionId) -> bool {
        self.questions.iter().any(|q| q.id() == question_id)
    }

    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(Question::id).collect()
    }

    /// Points a correct answer to `question` is worth: its own points, or the
    /// quiz default when the question carries zero.
    pub fn points_for(&self, question: &Question) -> u32 {
        if question.points().is_zero() {
            self.base_points.value()
        } else {
            question.points().value()
        }
    }

    /// Sum of the questions' own points.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points().value()).sum()
    }

    /// Whether `score` reaches the passing percentage of the total points.
    pub fn has_passed(&self, score: u32) -> bool {
        let total = self.total_points();
        let percent = if total == 0 {
            0
        } else {
            u64::from(score) * 100 / u64::from(total)
        };
        percent >= u64::from(self.passing_score.percent())
    }
}
