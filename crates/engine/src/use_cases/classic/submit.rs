//! Answer a classic question; the last answer finishes the run.

use std::sync::Arc;

use quizsprint_domain::content::{LeaderboardEntry, Question};
use quizsprint_domain::events::{ClassicAnswerOutcome, ClassicFinishOutcome};
use quizsprint_domain::modes::classic::{ClassicGame, PersonalBest};
use quizsprint_domain::{AnswerId, ClassicGameId, DomainEvent, EventSource, QuestionId, UserId};

use super::ClassicError;
use crate::infrastructure::ports::{
    ClassicGameRepo, ClockPort, EventBus, LeaderboardRepo, PersonalBestRepo, SessionRepo,
};
use crate::use_cases::publish;

#[derive(Debug, Clone)]
pub struct ClassicAnswerInput {
    pub game_id: ClassicGameId,
    pub player_id: UserId,
    /// Shown on the quiz leaderboard when the run finishes
    pub username: String,
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
    pub time_taken_ms: u32,
}

#[derive(Debug, Clone)]
pub struct ClassicAnswerResult {
    pub outcome: ClassicAnswerOutcome,
    pub total_score: u32,
    pub next_question: Option<Question>,
    /// Present once the last question has been answered
    pub finish: Option<ClassicFinishOutcome>,
}

pub struct SubmitClassicAnswer {
    games: Arc<dyn ClassicGameRepo>,
    personal_bests: Arc<dyn PersonalBestRepo>,
    leaderboard: Arc<dyn LeaderboardRepo>,
    sessions: Arc<dyn SessionRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl SubmitClassicAnswer {
    pub fn new(
        games: Arc<dyn ClassicGameRepo>,
        personal_bests: Arc<dyn PersonalBestRepo>,
        leaderboard: Arc<dyn LeaderboardRepo>,
        sessions: Arc<dyn SessionRepo>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            games,
            personal_bests,
            leaderboard,
            sessions,
            events,
            clock,
        }
    }

    pub async fn execute(&self, input: ClassicAnswerInput) -> Result<ClassicAnswerResult, ClassicError> {
        let mut game = self
            .games
            .get(input.game_id)
            .await?
            .filter(|g| g.player_id() == input.player_id)
            .ok_or(ClassicError::GameNotFound(input.game_id))?;

        let now = self.clock.now();
        let outcome = game.submit_answer(input.question_id, input.answer_id, input.time_taken_ms, now)?;
        tracing::debug!(
            game_id = %game.id(),
            question_id = %input.question_id,
            correct = outcome.is_correct,
            points = outcome.total_points,
            streak = outcome.current_streak,
            "Classic answer recorded"
        );

        let mut events: Vec<DomainEvent> = Vec::new();
        let finish = if outcome.is_game_finished {
            let finish = game.finish(now)?;
            events.extend(self.record_finished_run(&game, &finish, &input.username).await?);
            Some(finish)
        } else {
            None
        };

        self.games.save(&game).await?;
        let mut published = game.take_events();
        published.extend(events);
        publish(self.events.as_ref(), published).await;

        Ok(ClassicAnswerResult {
            outcome,
            total_score: game.total_score(),
            next_question: game.session().current_question().cloned(),
            finish,
        })
    }

    /// Session history, quiz leaderboard and personal best for a finished run.
    async fn record_finished_run(
        &self,
        game: &ClassicGame,
        finish: &ClassicFinishOutcome,
        username: &str,
    ) -> Result<Vec<DomainEvent>, ClassicError> {
        let finished_at = game.session().finished_at().unwrap_or_else(|| self.clock.now());
        self.sessions.save(game.player_id(), game.session()).await?;
        self.leaderboard
            .record(&LeaderboardEntry {
                session_id: game.session().id(),
                quiz_id: game.quiz_id(),
                user_id: game.player_id(),
                username: username.to_string(),
                score: finish.final_score,
                rank: 0,
                completed_at: finished_at,
            })
            .await?;

        tracing::info!(
            game_id = %game.id(),
            player_id = %game.player_id(),
            final_score = finish.final_score,
            max_streak = finish.max_streak,
            new_personal_best = finish.is_new_personal_best,
            "Classic game finished"
        );

        if !finish.is_new_personal_best {
            return Ok(Vec::new());
        }

        let mut best = match self.personal_bests.get(game.player_id(), game.quiz_id()).await? {
            Some(mut existing) => {
                if !existing.update_if_better(game, finished_at)? {
                    return Ok(Vec::new());
                }
                existing
            }
            None => PersonalBest::from_game(game, finished_at)?,
        };
        self.personal_bests.save(&best).await?;
        Ok(best.take_events())
    }
}
