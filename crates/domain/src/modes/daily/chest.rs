//! Chest rewards earned by completing the daily challenge
//!
//! The calculator is pure: randomness comes from an injected closure returning
//! a uniform integer in an inclusive range, so rewards are reproducible in tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::streak::StreakBonus;

/// Chest tier, chosen by the number of correct answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChestType {
    Wooden,
    Silver,
    Golden,
}

impl ChestType {
    /// 8+ correct earns Golden, 5+ Silver, anything else Wooden.
    pub fn from_correct_answers(correct: usize) -> Self {
        match correct {
            8.. => Self::Golden,
            5.. => Self::Silver,
            _ => Self::Wooden,
        }
    }
}

impl fmt::Display for ChestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Wooden => "wooden",
            Self::Silver => "silver",
            Self::Golden => "golden",
        };
        f.write_str(s)
    }
}

/// Power-up usable in marathon runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BonusKind {
    Shield,
    FiftyFifty,
    Skip,
    Freeze,
}

impl BonusKind {
    pub const ALL: [BonusKind; 4] = [Self::Shield, Self::FiftyFifty, Self::Skip, Self::Freeze];
}

/// Contents of an opened chest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChestReward {
    pub chest_type: ChestType,
    pub coins: u32,
    pub tickets: u32,
    pub bonuses: Vec<BonusKind>,
}

/// Rolls chest contents.
///
/// | Chest  | Coins    | Tickets | Bonuses                                    |
/// |--------|----------|---------|--------------------------------------------|
/// | Wooden | 50..=100 | 1       | 50% one                                    |
/// | Silver | 150..=250| 2..=3   | one, +30% a second distinct                |
/// | Golden | 300..=500| 4..=5   | two distinct, +40% a third distinct        |
///
/// Only coins are scaled by the streak bonus.
pub struct ChestRewardCalculator<R>
where
    R: FnMut(i32, i32) -> i32,
{
    rng: R,
}

impl<R> ChestRewardCalculator<R>
where
    R: FnMut(i32, i32) -> i32,
{
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn calculate(&mut self, chest_type: ChestType, streak_bonus: StreakBonus) -> ChestReward {
        let (base_coins, tickets, bonuses) = match chest_type {
            ChestType::Wooden => {
                let coins = self.range(50, 100);
                let bonuses = if self.chance(50) {
                    self.distinct_bonuses(1)
                } else {
                    Vec::new()
                };
                (coins, 1, bonuses)
            }
            ChestType::Silver => {
                let coins = self.range(150, 250);
                let tickets = self.range(2, 3);
                let count = if self.chance(30) { 2 } else { 1 };
                (coins, tickets, self.distinct_bonuses(count))
            }
            ChestType::Golden => {
                let coins = self.range(300, 500);
                let tickets = self.range(4, 5);
                let count = if self.chance(40) { 3 } else { 2 };
                (coins, tickets, self.distinct_bonuses(count))
            }
        };

        ChestReward {
            chest_type,
            coins: streak_bonus.apply(base_coins),
            tickets,
            bonuses,
        }
    }

    fn range(&mut self, min: u32, max: u32) -> u32 {
        let value = (self.rng)(min as i32, max as i32);
        (value.max(min as i32) as u32).min(max)
    }

    /// True with probability `percent`/100.
    fn chance(&mut self, percent: u32) -> bool {
        self.range(1, 100) <= percent
    }

    /// `count` distinct kinds, each uniform among those not yet picked.
    fn distinct_bonuses(&mut self, count: usize) -> Vec<BonusKind> {
        let mut remaining = BonusKind::ALL.to_vec();
        let mut picked = Vec::with_capacity(count);
        while picked.len() < count && !remaining.is_empty() {
            let index = self.range(0, remaining.len() as u32 - 1) as usize;
            picked.push(remaining.remove(index));
        }
        picked
    }
}
