//! Daily challenge use cases.
//!
//! Everyone plays the same ten questions on a given UTC date. Correctness stays
//! hidden until the last answer; completing the run advances the player's
//! streak and rolls a chest.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use quizsprint_domain::modes::daily::{ChestReward, ChestRewardCalculator, DailyGame};
use quizsprint_domain::{DailyGameId, DomainError, GameDate};

use crate::infrastructure::clock::rng_fn;
use crate::infrastructure::ports::{RandomPort, RepoError};
use crate::use_cases::content::ContentError;

mod play;
mod queries;
mod quiz;

pub use play::{
    DailyAnswerInput, DailyAnswerResult, DailyCompletion, DailyStarted, RetryDaily, RetryPayment,
    StartDaily, SubmitDailyAnswer, RETRY_COST_COINS,
};
pub use queries::{
    DailyLeaderboard, DailyLeaderboardRow, DailyStatusView, GetDailyLeaderboard, GetDailyStatus,
    GetPlayerStreak, OpenChest, StreakView,
};
pub use quiz::GetOrCreateDailyQuiz;

/// Container for daily challenge use cases.
pub struct DailyUseCases {
    pub quiz: Arc<GetOrCreateDailyQuiz>,
    pub start: Arc<StartDaily>,
    pub submit_answer: Arc<SubmitDailyAnswer>,
    pub retry: Arc<RetryDaily>,
    pub status: Arc<GetDailyStatus>,
    pub leaderboard: Arc<GetDailyLeaderboard>,
    pub streak: Arc<GetPlayerStreak>,
    pub open_chest: Arc<OpenChest>,
}

impl DailyUseCases {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        quiz: Arc<GetOrCreateDailyQuiz>,
        start: Arc<StartDaily>,
        submit_answer: Arc<SubmitDailyAnswer>,
        retry: Arc<RetryDaily>,
        status: Arc<GetDailyStatus>,
        leaderboard: Arc<GetDailyLeaderboard>,
        streak: Arc<GetPlayerStreak>,
        open_chest: Arc<OpenChest>,
    ) -> Self {
        Self {
            quiz,
            start,
            submit_answer,
            retry,
            status,
            leaderboard,
            streak,
            open_chest,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DailyError {
    /// Also returned when the game belongs to another player
    #[error("Daily game not found: {0}")]
    GameNotFound(DailyGameId),
    #[error("No daily game played on {0}")]
    NoGameOnDate(GameDate),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Roll the chest for a completed game and attach it. A game that already
/// holds a chest keeps it.
pub(crate) fn roll_chest(
    game: &mut DailyGame,
    random: &dyn RandomPort,
    now: DateTime<Utc>,
) -> Result<ChestReward, DomainError> {
    if let Some(existing) = game.chest_reward() {
        return Ok(existing.clone());
    }
    let reward = ChestRewardCalculator::new(rng_fn(random)).calculate(game.chest_type(), game.streak_bonus());
    Ok(game.attach_chest(reward, now)?.clone())
}
