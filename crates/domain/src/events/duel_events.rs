//! Quick duel events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AnswerId, DuelGameId, QuestionId, UserId};
use crate::modes::duel::DuelPlayer;
use crate::rating::EloRating;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DuelEvent {
    GameCreated {
        game_id: DuelGameId,
        player1_id: UserId,
        player2_id: UserId,
        question_ids: Vec<QuestionId>,
        occurred_at: DateTime<Utc>,
    },
    GameStarted {
        game_id: DuelGameId,
        player1_id: UserId,
        player2_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    RoundStarted {
        game_id: DuelGameId,
        round: usize,
        question_id: QuestionId,
        occurred_at: DateTime<Utc>,
    },
    PlayerAnswered {
        game_id: DuelGameId,
        player_id: UserId,
        question_id: QuestionId,
        answer_id: AnswerId,
        time_taken_ms: u32,
        is_correct: bool,
        points_earned: u32,
        occurred_at: DateTime<Utc>,
    },
    RoundCompleted {
        game_id: DuelGameId,
        round: usize,
        player1_score: u32,
        player2_score: u32,
        occurred_at: DateTime<Utc>,
    },
    /// Final scores plus the post-game ratings of both players
    GameFinished {
        game_id: DuelGameId,
        winner_id: Option<UserId>,
        player1: DuelPlayer,
        player2: DuelPlayer,
        player1_rating: EloRating,
        player2_rating: EloRating,
        occurred_at: DateTime<Utc>,
    },
    PlayerDisconnected {
        game_id: DuelGameId,
        player_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    PlayerReconnected {
        game_id: DuelGameId,
        player_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    GameAbandoned {
        game_id: DuelGameId,
        occurred_at: DateTime<Utc>,
    },
}

impl DuelEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GameCreated { .. } => "duel.game_created",
            Self::GameStarted { .. } => "duel.game_started",
            Self::RoundStarted { .. } => "duel.round_started",
            Self::PlayerAnswered { .. } => "duel.player_answered",
            Self::RoundCompleted { .. } => "duel.round_completed",
            Self::GameFinished { .. } => "duel.game_finished",
            Self::PlayerDisconnected { .. } => "duel.player_disconnected",
            Self::PlayerReconnected { .. } => "duel.player_reconnected",
            Self::GameAbandoned { .. } => "duel.game_abandoned",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::GameCreated { occurred_at, .. }
            | Self::GameStarted { occurred_at, .. }
            | Self::RoundStarted { occurred_at, .. }
            | Self::PlayerAnswered { occurred_at, .. }
            | Self::RoundCompleted { occurred_at, .. }
            | Self::GameFinished { occurred_at, .. }
            | Self::PlayerDisconnected { occurred_at, .. }
            | Self::PlayerReconnected { occurred_at, .. }
            | Self::GameAbandoned { occurred_at, .. } => *occurred_at,
        }
    }
}

/// Result of a duel answer submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelAnswerOutcome {
    pub is_correct: bool,
    pub points_earned: u32,
    pub player_score: u32,
    pub opponent_score: u32,
    /// 1-based round the answer was given in
    pub round_number: usize,
    pub both_answered: bool,
    pub is_game_finished: bool,
    pub winner_id: Option<UserId>,
}
