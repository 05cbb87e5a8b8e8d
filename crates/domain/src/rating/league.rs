//! MMR and the league/division ladder derived from it

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Starting MMR for every new player
pub const INITIAL_MMR: u32 = 1000;

/// Upper bound of the MMR scale
pub const MAX_MMR: u32 = 9999;

/// Width of one division inside a non-Legend league
pub const DIVISION_SPAN: u32 = 125;

// ============================================================================
// Mmr
// ============================================================================

/// Matchmaking rating (0..=9999)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Mmr(u32);

impl Mmr {
    pub const INITIAL: Mmr = Mmr(INITIAL_MMR);

    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value > MAX_MMR {
            return Err(DomainError::validation(format!(
                "MMR cannot exceed {}, got {}",
                MAX_MMR, value
            )));
        }
        Ok(Self(value))
    }

    /// Clamp an arbitrary signed value onto the scale.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(MAX_MMR)) as u32)
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Apply a signed change, clamped to the scale.
    #[must_use]
    pub fn offset(&self, delta: i32) -> Self {
        Self::clamped(i64::from(self.0) + i64::from(delta))
    }

    /// Signed distance from `other` to `self`.
    pub fn diff(&self, other: Mmr) -> i64 {
        i64::from(self.0) - i64::from(other.0)
    }
}

impl Default for Mmr {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Mmr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Mmr {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mmr> for u32 {
    fn from(mmr: Mmr) -> u32 {
        mmr.0
    }
}

// ============================================================================
// League
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum League {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Legend,
}

impl League {
    pub const ALL: [League; 6] = [
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Platinum,
        Self::Diamond,
        Self::Legend,
    ];

    pub fn min_mmr(&self) -> u32 {
        match self {
            Self::Bronze => 0,
            Self::Silver => 1000,
            Self::Gold => 1500,
            Self::Platinum => 2000,
            Self::Diamond => 2500,
            Self::Legend => 3000,
        }
    }

    pub fn from_mmr(mmr: Mmr) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|league| mmr.value() >= league.min_mmr())
            .unwrap_or(Self::Bronze)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
            Self::Diamond => "diamond",
            Self::Legend => "legend",
        }
    }

    fn has_divisions(&self) -> bool {
        !matches!(self, Self::Legend)
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for League {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|league| league.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::parse(format!("Unknown league: {}", s)))
    }
}

// ============================================================================
// Division
// ============================================================================

/// Division inside a league; IV is the entry division and I the top one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    I,
    II,
    III,
    IV,
}

impl Division {
    /// 1 for I through 4 for IV
    pub fn number(&self) -> u32 {
        match self {
            Self::I => 1,
            Self::II => 2,
            Self::III => 3,
            Self::IV => 4,
        }
    }

    fn from_offset(offset: u32) -> Self {
        match offset / DIVISION_SPAN {
            0 => Self::IV,
            1 => Self::III,
            2 => Self::II,
            _ => Self::I,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Rank
// ============================================================================

/// League plus division, totally ordered from Bronze IV up to Legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rank {
    pub league: League,
    pub division: Division,
}

impl Rank {
    pub fn from_mmr(mmr: Mmr) -> Self {
        let league = League::from_mmr(mmr);
        let division = if league.has_divisions() {
            Division::from_offset(mmr.value() - league.min_mmr())
        } else {
            Division::I
        };
        Self { league, division }
    }

    /// Lowest MMR that still holds this rank.
    pub fn floor(&self) -> Mmr {
        let offset = if self.league.has_divisions() {
            (4 - self.division.number()) * DIVISION_SPAN
        } else {
            0
        };
        Mmr::clamped(i64::from(self.league.min_mmr() + offset))
    }

    fn ordinal(&self) -> u32 {
        self.league as u32 * 4 + (4 - self.division.number())
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.league.has_divisions() {
            write!(f, "{} {}", self.league, self.division)
        } else {
            write!(f, "{}", self.league)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mmr(v: u32) -> Mmr {
        Mmr::new(v).unwrap()
    }

    #[test]
    fn league_boundaries() {
        assert_eq!(League::from_mmr(mmr(0)), League::Bronze);
        assert_eq!(League::from_mmr(mmr(999)), League::Bronze);
        assert_eq!(League::from_mmr(mmr(1000)), League::Silver);
        assert_eq!(League::from_mmr(mmr(1499)), League::Silver);
        assert_eq!(League::from_mmr(mmr(1500)), League::Gold);
        assert_eq!(League::from_mmr(mmr(2000)), League::Platinum);
        assert_eq!(League::from_mmr(mmr(2500)), League::Diamond);
        assert_eq!(League::from_mmr(mmr(3000)), League::Legend);
        assert_eq!(League::from_mmr(mmr(9999)), League::Legend);
    }

    #[test]
    fn division_boundaries() {
        assert_eq!(Rank::from_mmr(mmr(374)).division, Division::II);
        assert_eq!(Rank::from_mmr(mmr(375)).division, Division::I);
        assert_eq!(Rank::from_mmr(mmr(1000)).division, Division::IV);
        assert_eq!(Rank::from_mmr(mmr(1124)).division, Division::IV);
        assert_eq!(Rank::from_mmr(mmr(1125)).division, Division::III);
        assert_eq!(Rank::from_mmr(mmr(3500)).division, Division::I);
    }

    #[test]
    fn floors() {
        assert_eq!(Rank::from_mmr(mmr(1000)).floor(), mmr(1000));
        assert_eq!(Rank::from_mmr(mmr(1300)).floor(), mmr(1250));
        assert_eq!(Rank::from_mmr(mmr(400)).floor(), mmr(375));
        assert_eq!(Rank::from_mmr(mmr(4200)).floor(), mmr(3000));
    }

    #[test]
    fn rank_ordering() {
        let bronze_one = Rank::from_mmr(mmr(999));
        let silver_four = Rank::from_mmr(mmr(1000));
        let silver_three = Rank::from_mmr(mmr(1125));
        assert!(bronze_one < silver_four);
        assert!(silver_four < silver_three);
        assert!(Rank::from_mmr(mmr(2999)) < Rank::from_mmr(mmr(3000)));
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(Rank::from_mmr(mmr(1300)).to_string(), "silver II");
        assert_eq!(Rank::from_mmr(mmr(3100)).to_string(), "legend");
        assert_eq!("Gold".parse::<League>().unwrap(), League::Gold);
        assert!("wood".parse::<League>().is_err());
    }

    #[test]
    fn mmr_bounds() {
        assert!(Mmr::new(10_000).is_err());
        assert_eq!(Mmr::clamped(-5), mmr(0));
        assert_eq!(Mmr::clamped(20_000), mmr(MAX_MMR));
        assert_eq!(mmr(9990).offset(30), mmr(9999));
    }

    proptest! {
        #[test]
        fn floor_is_within_rank_and_rank_is_monotonic(v in 0u32..=9998) {
            let rank = Rank::from_mmr(mmr(v));
            let floor = rank.floor();
            prop_assert!(floor.value() <= v);
            prop_assert_eq!(Rank::from_mmr(floor), rank);
            prop_assert!(Rank::from_mmr(mmr(v + 1)) >= rank);
        }
    }
}
