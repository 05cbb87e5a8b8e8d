//! Results screen for a finished run.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use quizsprint_domain::kernel::GameplaySession;
use quizsprint_domain::{QuizId, SessionId};

use super::ContentError;
use crate::infrastructure::ports::SessionRepo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResults {
    pub session_id: SessionId,
    pub quiz_id: QuizId,
    pub quiz_title: String,
    pub base_score: u32,
    /// Share of the quiz's total points, 0 to 100
    pub score_percent: u32,
    pub passed: bool,
    pub total_questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub accuracy: u32,
    pub longest_correct_run: usize,
    /// Wall time between start and finish
    pub time_spent_ms: i64,
    pub average_answer_ms: u64,
}

impl SessionResults {
    fn of(session: &GameplaySession, finished_at: DateTime<Utc>) -> Self {
        let quiz = session.quiz();
        let total_points = quiz.total_points();
        let score_percent = if total_points == 0 {
            0
        } else {
            (u64::from(session.base_score()) * 100 / u64::from(total_points)).min(100) as u32
        };
        let answered = session.answers().len();

        Self {
            session_id: session.id(),
            quiz_id: quiz.id(),
            quiz_title: quiz.title().as_str().to_string(),
            base_score: session.base_score(),
            score_percent,
            passed: quiz.has_passed(session.base_score()),
            total_questions: quiz.question_count(),
            answered,
            correct: session.count_correct(),
            accuracy: session.accuracy(),
            longest_correct_run: session.longest_correct_run(),
            time_spent_ms: (finished_at - session.started_at()).num_milliseconds().max(0),
            average_answer_ms: if answered == 0 {
                0
            } else {
                session.total_time_ms() / answered as u64
            },
        }
    }
}

pub struct GetSessionResults {
    sessions: Arc<dyn SessionRepo>,
}

impl GetSessionResults {
    pub fn new(sessions: Arc<dyn SessionRepo>) -> Self {
        Self { sessions }
    }

    pub async fn execute(&self, session_id: SessionId) -> Result<SessionResults, ContentError> {
        let session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or(ContentError::SessionNotFound(session_id))?;
        let finished_at = session
            .finished_at()
            .ok_or(ContentError::SessionNotFinished(session_id))?;
        Ok(SessionResults::of(&session, finished_at))
    }
}
