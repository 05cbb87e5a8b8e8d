//! Classic mode: solo run with streak multipliers and a personal-best ghost

mod game;
mod personal_best;
mod streak;

pub use game::{time_bonus, ClassicGame, ClassicStatus};
pub use personal_best::PersonalBest;
pub use streak::{is_streak_milestone, Multiplier, VisualState, GODLIKE_STREAK, ON_FIRE_STREAK};
