//! Daily challenge events and outcome types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AnswerId, DailyGameId, DailyQuizId, QuestionId, UserId};
use crate::modes::daily::{ChestReward, StreakBonus};
use crate::value_objects::GameDate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DailyEvent {
    QuizCreated {
        daily_quiz_id: DailyQuizId,
        date: GameDate,
        question_ids: Vec<QuestionId>,
        expires_at: DateTime<Utc>,
        occurred_at: DateTime<Utc>,
    },
    GameStarted {
        game_id: DailyGameId,
        player_id: UserId,
        daily_quiz_id: DailyQuizId,
        date: GameDate,
        current_streak: u32,
        attempt: u32,
        occurred_at: DateTime<Utc>,
    },
    /// Correctness is withheld until the game completes
    QuestionAnswered {
        game_id: DailyGameId,
        player_id: UserId,
        question_id: QuestionId,
        answer_id: AnswerId,
        time_taken_ms: u32,
        occurred_at: DateTime<Utc>,
    },
    StreakMilestoneReached {
        game_id: DailyGameId,
        player_id: UserId,
        streak_days: u32,
        bonus_percent: u32,
        occurred_at: DateTime<Utc>,
    },
    GameCompleted {
        game_id: DailyGameId,
        player_id: UserId,
        daily_quiz_id: DailyQuizId,
        date: GameDate,
        final_score: u32,
        correct_answers: u32,
        total_questions: u32,
        new_streak: u32,
        streak_bonus: StreakBonus,
        rank: Option<u32>,
        occurred_at: DateTime<Utc>,
    },
    ChestEarned {
        game_id: DailyGameId,
        player_id: UserId,
        date: GameDate,
        reward: ChestReward,
        streak_bonus: StreakBonus,
        occurred_at: DateTime<Utc>,
    },
}

impl DailyEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::QuizCreated { .. } => "daily.quiz_created",
            Self::GameStarted { .. } => "daily.game_started",
            Self::QuestionAnswered { .. } => "daily.question_answered",
            Self::StreakMilestoneReached { .. } => "daily.streak_milestone_reached",
            Self::GameCompleted { .. } => "daily.game_completed",
            Self::ChestEarned { .. } => "daily.chest_earned",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::QuizCreated { occurred_at, .. }
            | Self::GameStarted { occurred_at, .. }
            | Self::QuestionAnswered { occurred_at, .. }
            | Self::StreakMilestoneReached { occurred_at, .. }
            | Self::GameCompleted { occurred_at, .. }
            | Self::ChestEarned { occurred_at, .. } => *occurred_at,
        }
    }
}

/// Result of a daily answer. No correctness feedback is given mid-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAnswerOutcome {
    pub question_index: usize,
    pub time_taken_ms: u32,
    pub remaining_questions: usize,
    pub is_game_completed: bool,
}
