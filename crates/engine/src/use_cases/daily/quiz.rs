//! The daily question set and the playable quiz built from it.

use std::sync::Arc;

use quizsprint_domain::content::{Question, Quiz};
use quizsprint_domain::modes::daily::{DailyQuiz, QUESTIONS_PER_DAY};
use quizsprint_domain::{EventSource, GameDate, PassingScore, Points, QuizTitle, TimeLimit};

use super::DailyError;
use crate::infrastructure::ports::{ClockPort, DailyQuizRepo, EventBus, QuestionRepo, RepoError};
use crate::use_cases::content::{ContentError, QuestionSelector};
use crate::use_cases::publish;

const SECONDS_PER_QUESTION: u32 = 15;
const BASE_POINTS: u32 = 100;
const MAX_TIME_BONUS: u32 = 75;

/// Return the quiz for `date`, creating it on first request.
pub struct GetOrCreateDailyQuiz {
    daily_quizzes: Arc<dyn DailyQuizRepo>,
    selector: Arc<QuestionSelector>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl GetOrCreateDailyQuiz {
    pub fn new(
        daily_quizzes: Arc<dyn DailyQuizRepo>,
        selector: Arc<QuestionSelector>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            daily_quizzes,
            selector,
            events,
            clock,
        }
    }

    pub async fn execute(&self, date: GameDate) -> Result<DailyQuiz, DailyError> {
        if let Some(existing) = self.daily_quizzes.find_by_date(date).await? {
            return Ok(existing);
        }

        let questions = self.selector.daily_questions(date).await?;
        let mut quiz = DailyQuiz::new(date, questions.iter().map(Question::id).collect(), self.clock.now())?;

        match self.daily_quizzes.save(&quiz).await {
            Ok(()) => {}
            // Lost the race to another writer; theirs is the quiz for today.
            Err(RepoError::ConstraintViolation(_)) => {
                tracing::debug!(%date, "Daily quiz created concurrently, reloading");
                return self
                    .daily_quizzes
                    .find_by_date(date)
                    .await?
                    .ok_or_else(|| RepoError::not_found("DailyQuiz", date).into());
            }
            Err(e) => return Err(e.into()),
        }

        publish(self.events.as_ref(), quiz.take_events()).await;
        tracing::info!(%date, daily_quiz_id = %quiz.id(), "Daily quiz created");
        Ok(quiz)
    }
}

/// Playable quiz for a daily question set: 15 seconds per question, 100 base
/// points, up to 75 time bonus, no passing threshold.
pub(super) async fn runtime_quiz(
    daily: &DailyQuiz,
    questions: &dyn QuestionRepo,
) -> Result<Quiz, DailyError> {
    let loaded = questions.get_many(daily.question_ids()).await?;
    if loaded.len() != QUESTIONS_PER_DAY {
        return Err(ContentError::NotEnoughQuestions {
            needed: QUESTIONS_PER_DAY,
            found: loaded.len(),
        }
        .into());
    }

    let quiz = Quiz::new(
        QuizTitle::new(format!("Daily challenge {}", daily.date()))?,
        TimeLimit::new(SECONDS_PER_QUESTION)?,
        PassingScore::new(0)?,
        daily.created_at(),
    )
    .with_base_points(Points::new(BASE_POINTS)?)
    .with_max_time_bonus(MAX_TIME_BONUS)
    .with_questions(loaded)?;
    Ok(quiz)
}
