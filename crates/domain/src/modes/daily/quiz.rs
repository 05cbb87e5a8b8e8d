//! Daily quiz - the ten questions everyone plays on a given day

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{DailyEvent, DomainEvent, EventSource};
use crate::ids::{DailyQuizId, QuestionId};
use crate::value_objects::GameDate;

/// Number of questions in every daily quiz
pub const QUESTIONS_PER_DAY: usize = 10;

/// The daily question set for one date. Unique by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuiz {
    id: DailyQuizId,
    date: GameDate,
    question_ids: Vec<QuestionId>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl DailyQuiz {
    /// Create the quiz for `date`; it expires at the next midnight UTC.
    pub fn new(
        date: GameDate,
        question_ids: Vec<QuestionId>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if question_ids.len() != QUESTIONS_PER_DAY {
            return Err(DomainError::validation(format!(
                "Daily quiz needs exactly {} questions, got {}",
                QUESTIONS_PER_DAY,
                question_ids.len()
            )));
        }
        for (i, id) in question_ids.iter().enumerate() {
            if question_ids[..i].contains(id) {
                return Err(DomainError::validation(format!(
                    "Daily quiz question {} appears twice",
                    id
                )));
            }
        }

        let mut quiz = Self {
            id: DailyQuizId::new(),
            date,
            expires_at: date.start_of_next_day(),
            question_ids,
            created_at,
            events: Vec::new(),
        };

        quiz.events.push(
            DailyEvent::QuizCreated {
                daily_quiz_id: quiz.id,
                date,
                question_ids: quiz.question_ids.clone(),
                expires_at: quiz.expires_at,
                occurred_at: created_at,
            }
            .into(),
        );
        Ok(quiz)
    }

    #[inline]
    pub fn id(&self) -> DailyQuizId {
        self.id
    }

    #[inline]
    pub fn date(&self) -> GameDate {
        self.date
    }

    #[inline]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    #[inline]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl EventSource for DailyQuiz {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}
