//! ELO rating update shared by duels and the persistent player rating

use serde::{Deserialize, Serialize};

use super::league::Mmr;

pub const K_FACTOR_NEW: u32 = 32;
pub const K_FACTOR_REGULAR: u32 = 16;

/// Players with fewer rated games than this use the higher K-factor
pub const NEW_PLAYER_GAMES: u32 = 30;

/// Smallest magnitude of a non-zero rating change
pub const MIN_RATING_CHANGE: i32 = 10;

/// Result of a game from one player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchOutcome {
    Win,
    Draw,
    Loss,
}

impl MatchOutcome {
    pub fn from_scores(mine: u32, theirs: u32) -> Self {
        match mine.cmp(&theirs) {
            std::cmp::Ordering::Greater => Self::Win,
            std::cmp::Ordering::Equal => Self::Draw,
            std::cmp::Ordering::Less => Self::Loss,
        }
    }

    /// The opponent's outcome.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Win => Self::Loss,
            Self::Draw => Self::Draw,
            Self::Loss => Self::Win,
        }
    }

    pub fn actual_score(&self) -> f64 {
        match self {
            Self::Win => 1.0,
            Self::Draw => 0.5,
            Self::Loss => 0.0,
        }
    }
}

pub fn k_factor(games_played: u32) -> u32 {
    if games_played < NEW_PLAYER_GAMES {
        K_FACTOR_NEW
    } else {
        K_FACTOR_REGULAR
    }
}

/// Probability of beating `opponent`.
pub fn expected_score(mine: Mmr, opponent: Mmr) -> f64 {
    let exponent = opponent.diff(mine) as f64 / 400.0;
    1.0 / (1.0 + 10f64.powf(exponent))
}

/// Signed MMR change for one game.
///
/// `K * (actual - expected)`, pushed out to at least [`MIN_RATING_CHANGE`] in
/// magnitude and rounded half away from zero. An exact zero stays zero.
pub fn rating_delta(mine: Mmr, opponent: Mmr, outcome: MatchOutcome, games_played: u32) -> i32 {
    let k = f64::from(k_factor(games_played));
    let mut delta = k * (outcome.actual_score() - expected_score(mine, opponent));
    let min = f64::from(MIN_RATING_CHANGE);
    if delta > 0.0 && delta < min {
        delta = min;
    } else if delta < 0.0 && delta > -min {
        delta = -min;
    }
    delta.round() as i32
}

/// Rating snapshot carried by a duel participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EloRating {
    rating: Mmr,
    games_played: u32,
}

impl Default for EloRating {
    fn default() -> Self {
        Self::new(Mmr::INITIAL, 0)
    }
}

impl EloRating {
    pub fn new(rating: Mmr, games_played: u32) -> Self {
        Self {
            rating,
            games_played,
        }
    }

    #[inline]
    pub fn rating(&self) -> Mmr {
        self.rating
    }

    #[inline]
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn k_factor(&self) -> u32 {
        k_factor(self.games_played)
    }

    pub fn is_new_player(&self) -> bool {
        self.games_played < NEW_PLAYER_GAMES
    }

    /// Snapshot after one more game against `opponent`.
    #[must_use]
    pub fn after_game(&self, outcome: MatchOutcome, opponent: Mmr) -> Self {
        let delta = rating_delta(self.rating, opponent, outcome, self.games_played);
        Self {
            rating: self.rating.offset(delta),
            games_played: self.games_played + 1,
        }
    }
}
