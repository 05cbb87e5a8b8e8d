//! Gameplay session - the shared answering kernel
//!
//! Pure gameplay: records answers against a quiz and accumulates base score. No
//! streaks, multipliers or mode rules live here; Classic and Daily wrap a session
//! and layer their own scoring on top.

use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::content::{Question, Quiz};
use crate::error::DomainError;
use crate::ids::{AnswerId, QuestionId, SessionId};

/// A recorded answer for one question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
    pub is_correct: bool,
    pub time_taken_ms: u32,
    pub answered_at: DateTime<Utc>,
}

/// What the kernel reports back for one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    /// Points earned without any mode bonus (0 when incorrect)
    pub base_points: u32,
    pub time_taken_ms: u32,
}

/// A single player's run through a quiz
///
/// # Invariants
///
/// - Each question is answered at most once
/// - `current_index() == answers().len()`
/// - Every recorded question belongs to the quiz
/// - `base_score` is the sum of points of correctly answered questions
/// - Once `finished_at` is set the session never changes again
#[derive(Debug, Clone, PartialEq)]
pub struct GameplaySession {
    id: SessionId,
    quiz: Quiz,
    answers: Vec<AnswerRecord>,
    base_score: u32,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl GameplaySession {
    /// Start a session over `quiz`.
    ///
    /// # Errors
    ///
    /// - `InvalidId` when `id` is nil
    /// - `CannotStartQuiz` when the quiz cannot be played
    pub fn new(id: SessionId, quiz: Quiz, started_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if id.is_nil() {
            return Err(DomainError::invalid_id("session id must not be nil"));
        }
        quiz.can_start()?;

        Ok(Self {
            id,
            quiz,
            answers: Vec::new(),
            base_score: 0,
            started_at,
            finished_at: None,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Answers in the order they were given.
    #[inline]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.answers.len()
    }

    #[inline]
    pub fn base_score(&self) -> u32 {
        self.base_score
    }

    #[inline]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[inline]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Record an answer.
    ///
    /// Checks run in order: session finished, question already answered,
    /// question in quiz, answer in question.
    pub fn answer_question(
        &mut self,
        question_id: QuestionId,
        answer_id: AnswerId,
        time_taken_ms: u32,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, DomainError> {
        if self.finished_at.is_some() || self.is_finished() {
            return Err(DomainError::SessionFinished);
        }
        if self.answer_for(question_id).is_some() {
            return Err(DomainError::AlreadyAnswered(question_id));
        }

        let question = self.quiz.question(question_id)?;
        let is_correct = question.is_correct_answer(answer_id)?;
        let base_points = if is_correct {
            self.quiz.points_for(question)
        } else {
            0
        };

        self.base_score += base_points;
        self.answers.push(AnswerRecord {
            question_id,
            answer_id,
            is_correct,
            time_taken_ms,
            answered_at,
        });

        Ok(AnswerOutcome {
            is_correct,
            base_points,
            time_taken_ms,
        })
    }

    /// Freeze the session.
    pub fn finish(&mut self, finished_at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.finished_at.is_some() {
            return Err(DomainError::SessionFinished);
        }
        self.finished_at = Some(finished_at);
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All questions have been answered.
    pub fn is_finished(&self) -> bool {
        self.answers.len() >= self.quiz.question_count()
    }

    /// Finish has been stamped.
    pub fn is_frozen(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Next question to answer, if any.
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.quiz.question_at(self.current_index())
    }

    pub fn answer_for(&self, question_id: QuestionId) -> Option<&AnswerRecord> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Cumulative base score after each question, in quiz order.
    ///
    /// The result always has `question_count` entries; unanswered questions
    /// repeat the running total.
    pub fn score_by_question(&self) -> Vec<u32> {
        let mut cumulative = 0;
        self.quiz
            .questions()
            .iter()
            .map(|question| {
                if self
                    .answer_for(question.id())
                    .is_some_and(|a| a.is_correct)
                {
                    cumulative += self.quiz.points_for(question);
                }
                cumulative
            })
            .collect()
    }

    pub fn count_correct(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    /// Percentage of correct answers among those given (0 when none).
    pub fn accuracy(&self) -> u32 {
        if self.answers.is_empty() {
            return 0;
        }
        (self.count_correct() * 100 / self.answers.len()) as u32
    }

    /// Sum of recorded answer times.
    pub fn total_time_ms(&self) -> u64 {
        self.answers.iter().map(|a| u64::from(a.time_taken_ms)).sum()
    }

    /// Longest run of consecutive correct answers.
    pub fn longest_correct_run(&self) -> usize {
        self.answers
            .iter()
            .scan(0usize, |run, a| {
                *run = if a.is_correct { *run + 1 } else { 0 };
                Some(*run)
            })
            .max()
            .unwrap_or(0)
    }
}

// =============================================================================
// Serde: validate the answer log on load
// =============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameplaySessionWireFormat {
    id: SessionId,
    quiz: Quiz,
    answers: Vec<AnswerRecord>,
    current_index: usize,
    base_score: u32,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Serialize for GameplaySession {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire = GameplaySessionWireFormat {
            id: self.id,
            quiz: self.quiz.clone(),
            answers: self.answers.clone(),
            current_index: self.current_index(),
            base_score: self.base_score,
            started_at: self.started_at,
            finished_at: self.finished_at,
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameplaySession {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = GameplaySessionWireFormat::deserialize(deserializer)?;

        if wire.current_index != wire.answers.len() {
            return Err(DeError::custom(format!(
                "currentIndex {} does not match {} recorded answers",
                wire.current_index,
                wire.answers.len()
            )));
        }

        let mut expected_score = 0;
        for (i, record) in wire.answers.iter().enumerate() {
            let question = wire.quiz.question(record.question_id).map_err(DeError::custom)?;
            if wire.answers[..i]
                .iter()
                .any(|a| a.question_id == record.question_id)
            {
                return Err(DeError::custom(format!(
                    "question {} answered twice",
                    record.question_id
                )));
            }
            if record.is_correct {
                expected_score += wire.quiz.points_for(question);
            }
        }
        if expected_score != wire.base_score {
            return Err(DeError::custom(format!(
                "baseScore {} does not match recorded answers ({})",
                wire.base_score, expected_score
            )));
        }

        Ok(GameplaySession {
            id: wire.id,
            quiz: wire.quiz,
            answers: wire.answers,
            base_score: wire.base_score,
            started_at: wire.started_at,
            finished_at: wire.finished_at,
        })
    }
}
