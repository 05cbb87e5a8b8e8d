//! Ranked play: MMR, the league ladder, ELO updates and matchmaking rules

mod elo;
mod league;
mod matchmaking;
mod player_rating;
mod win_streak;

pub use elo::{
    expected_score, k_factor, rating_delta, EloRating, MatchOutcome, K_FACTOR_NEW,
    K_FACTOR_REGULAR, MIN_RATING_CHANGE, NEW_PLAYER_GAMES,
};
pub use league::{Division, League, Mmr, Rank, DIVISION_SPAN, INITIAL_MMR, MAX_MMR};
pub use matchmaking::{find_best_match, search_window, QueueEntry};
pub use player_rating::{
    GameResult, PlayerRating, RatingChange, DEMOTION_PROTECTION_GAMES, SEASON_RESET_FLOOR,
};
pub use win_streak::{WinStreak, WIN_STREAK_MILESTONES};
