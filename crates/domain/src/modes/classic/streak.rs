//! Answer streak projections: score multiplier and visual state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Streak at which the multiplier first rises
pub const ON_FIRE_STREAK: u32 = 3;

/// Streak at which the multiplier reaches its maximum
pub const GODLIKE_STREAK: u32 = 6;

/// Score multiplier derived from the current streak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Multiplier {
    /// x1.0, streak 0-2
    #[default]
    Normal,
    /// x1.5, streak 3-5
    OnFire,
    /// x2.0, streak 6+
    Godlike,
}

impl Multiplier {
    pub fn from_streak(streak: u32) -> Self {
        if streak >= GODLIKE_STREAK {
            Self::Godlike
        } else if streak >= ON_FIRE_STREAK {
            Self::OnFire
        } else {
            Self::Normal
        }
    }

    pub fn value(&self) -> f64 {
        f64::from(self.halves()) / 2.0
    }

    /// `floor(points * multiplier)` in integer arithmetic.
    pub fn apply(&self, points: u32) -> u32 {
        points * self.halves() / 2
    }

    fn halves(&self) -> u32 {
        match self {
            Self::Normal => 2,
            Self::OnFire => 3,
            Self::Godlike => 4,
        }
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{:.1}", self.value())
    }
}

/// Client-facing intensity of the current streak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualState {
    #[default]
    Normal,
    Heat,
    Fire,
}

impl VisualState {
    pub fn from_streak(streak: u32) -> Self {
        if streak >= GODLIKE_STREAK {
            Self::Fire
        } else if streak >= ON_FIRE_STREAK {
            Self::Heat
        } else {
            Self::Normal
        }
    }
}

/// Streak values that unlock a higher multiplier.
pub fn is_streak_milestone(streak: u32) -> bool {
    streak == ON_FIRE_STREAK || streak == GODLIKE_STREAK
}
