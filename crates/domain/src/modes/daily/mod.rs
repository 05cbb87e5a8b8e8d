//! Daily challenge: one shared quiz per UTC day, streaks and chest rewards

mod chest;
mod game;
mod quiz;
mod streak;

pub use chest::{BonusKind, ChestReward, ChestRewardCalculator, ChestType};
pub use game::{DailyGame, DailyStatus, MAX_ATTEMPTS_PER_DAY};
pub use quiz::{DailyQuiz, QUESTIONS_PER_DAY};
pub use streak::{is_streak_milestone, DailyStreak, StreakBonus, STREAK_MILESTONES};
