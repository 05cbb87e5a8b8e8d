//! Personal best record for (player, quiz)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{ClassicEvent, DomainEvent, EventSource};
use crate::ids::{QuizId, UserId};

use super::game::ClassicGame;

/// Best finished Classic run of a player on a quiz
///
/// Keeps the per-question cumulative score of that run so later games can
/// compare against it question by question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBest {
    player_id: UserId,
    quiz_id: QuizId,
    best_score: u32,
    max_streak: u32,
    achieved_at: DateTime<Utc>,
    score_by_question: Vec<u32>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl PersonalBest {
    /// Record the first personal best from a finished game.
    pub fn from_game(game: &ClassicGame, achieved_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if !game.is_finished() {
            return Err(DomainError::GameNotActive);
        }

        let mut pb = Self {
            player_id: game.player_id(),
            quiz_id: game.quiz_id(),
            best_score: game.total_score(),
            max_streak: game.max_streak(),
            achieved_at,
            score_by_question: game.score_by_question(),
            events: Vec::new(),
        };
        pb.record_achievement(None);
        Ok(pb)
    }

    /// Rebuild from stored fields.
    pub fn reconstruct(
        player_id: UserId,
        quiz_id: QuizId,
        best_score: u32,
        max_streak: u32,
        achieved_at: DateTime<Utc>,
        score_by_question: Vec<u32>,
    ) -> Self {
        Self {
            player_id,
            quiz_id,
            best_score,
            max_streak,
            achieved_at,
            score_by_question,
            events: Vec::new(),
        }
    }

    /// Replace the record when `game` beat it. Returns whether it did.
    pub fn update_if_better(
        &mut self,
        game: &ClassicGame,
        achieved_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        if !game.is_finished() {
            return Err(DomainError::GameNotActive);
        }
        if game.quiz_id() != self.quiz_id {
            return Err(DomainError::not_found("Quiz", game.quiz_id().to_string()));
        }
        if game.total_score() <= self.best_score {
            return Ok(false);
        }

        let previous = self.best_score;
        self.best_score = game.total_score();
        self.max_streak = game.max_streak();
        self.achieved_at = achieved_at;
        self.score_by_question = game.score_by_question();
        self.record_achievement(Some(previous));
        Ok(true)
    }

    fn record_achievement(&mut self, previous_best_score: Option<u32>) {
        self.events.push(
            ClassicEvent::PersonalBestAchieved {
                player_id: self.player_id,
                quiz_id: self.quiz_id,
                new_best_score: self.best_score,
                previous_best_score,
                max_streak: self.max_streak,
                occurred_at: self.achieved_at,
            }
            .into(),
        );
    }

    #[inline]
    pub fn player_id(&self) -> UserId {
        self.player_id
    }

    #[inline]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[inline]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    #[inline]
    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    #[inline]
    pub fn achieved_at(&self) -> DateTime<Utc> {
        self.achieved_at
    }

    #[inline]
    pub fn score_by_question(&self) -> &[u32] {
        &self.score_by_question
    }

    /// Cumulative score at `index`, 0 outside the trace.
    pub fn score_at(&self, index: usize) -> u32 {
        self.score_by_question.get(index).copied().unwrap_or(0)
    }
}

impl EventSource for PersonalBest {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}
