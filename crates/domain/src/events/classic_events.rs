//! Classic mode events and outcome types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ClassicGameId, QuestionId, QuizId, UserId};
use crate::modes::classic::{Multiplier, VisualState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassicEvent {
    GameStarted {
        game_id: ClassicGameId,
        player_id: UserId,
        quiz_id: QuizId,
        has_personal_best: bool,
        personal_best_score: Option<u32>,
        occurred_at: DateTime<Utc>,
    },
    /// Streak crossed 3, 6 or 10
    StreakMilestoneReached {
        game_id: ClassicGameId,
        player_id: UserId,
        streak: u32,
        visual_state: VisualState,
        multiplier: Multiplier,
        occurred_at: DateTime<Utc>,
    },
    /// A wrong answer reset a streak of 3 or more
    StreakBroken {
        game_id: ClassicGameId,
        player_id: UserId,
        previous_streak: u32,
        question_id: QuestionId,
        occurred_at: DateTime<Utc>,
    },
    GameFinished {
        game_id: ClassicGameId,
        player_id: UserId,
        quiz_id: QuizId,
        final_score: u32,
        max_streak: u32,
        is_new_personal_best: bool,
        occurred_at: DateTime<Utc>,
    },
    PersonalBestAchieved {
        player_id: UserId,
        quiz_id: QuizId,
        new_best_score: u32,
        previous_best_score: Option<u32>,
        max_streak: u32,
        occurred_at: DateTime<Utc>,
    },
}

impl ClassicEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => "classic.game_started",
            Self::StreakMilestoneReached { .. } => "classic.streak_milestone_reached",
            Self::StreakBroken { .. } => "classic.streak_broken",
            Self::GameFinished { .. } => "classic.game_finished",
            Self::PersonalBestAchieved { .. } => "classic.personal_best_achieved",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::GameStarted { occurred_at, .. }
            | Self::StreakMilestoneReached { occurred_at, .. }
            | Self::StreakBroken { occurred_at, .. }
            | Self::GameFinished { occurred_at, .. }
            | Self::PersonalBestAchieved { occurred_at, .. } => *occurred_at,
        }
    }
}

/// Result of a classic answer submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicAnswerOutcome {
    pub is_correct: bool,
    pub base_points: u32,
    pub time_bonus: u32,
    /// Multiplier in effect after this answer
    pub multiplier: Multiplier,
    /// Points added to the running total
    pub total_points: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    pub visual_state: VisualState,
    /// Running score minus the personal-best trace at the same point
    pub ghost_diff: i64,
    pub is_game_finished: bool,
}

/// Result of finishing a classic game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicFinishOutcome {
    pub final_score: u32,
    pub max_streak: u32,
    /// Percentage of correct answers, 0-100
    pub accuracy: u32,
    pub passed: bool,
    pub is_new_personal_best: bool,
}
