//! Consecutive duel wins

use serde::{Deserialize, Serialize};

/// Win-streak lengths worth announcing
pub const WIN_STREAK_MILESTONES: [u32; 3] = [3, 5, 10];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinStreak {
    current: u32,
    best: u32,
}

impl WinStreak {
    pub fn new(current: u32, best: u32) -> Self {
        Self {
            current,
            best: best.max(current),
        }
    }

    #[must_use]
    pub fn after_win(&self) -> Self {
        let current = self.current + 1;
        Self {
            current,
            best: self.best.max(current),
        }
    }

    #[must_use]
    pub fn after_loss(&self) -> Self {
        Self {
            current: 0,
            best: self.best,
        }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn best(&self) -> u32 {
        self.best
    }

    /// Reward multiplier in percent: 110 from 3 wins, 125 from 5, 150 from 10.
    pub fn bonus_percent(&self) -> u32 {
        match self.current {
            10.. => 150,
            5.. => 125,
            3.. => 110,
            _ => 100,
        }
    }

    pub fn is_milestone(&self) -> bool {
        WIN_STREAK_MILESTONES.contains(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wins_accumulate_and_loss_resets_current_only() {
        let streak = (0..5).fold(WinStreak::default(), |s, _| s.after_win());
        assert_eq!((streak.current(), streak.best()), (5, 5));
        assert!(streak.is_milestone());
        assert_eq!(streak.bonus_percent(), 125);

        let reset = streak.after_loss();
        assert_eq!((reset.current(), reset.best()), (0, 5));
        assert_eq!(reset.bonus_percent(), 100);
    }

    #[test]
    fn bonus_brackets() {
        assert_eq!(WinStreak::new(2, 2).bonus_percent(), 100);
        assert_eq!(WinStreak::new(3, 3).bonus_percent(), 110);
        assert_eq!(WinStreak::new(9, 9).bonus_percent(), 125);
        assert_eq!(WinStreak::new(10, 10).bonus_percent(), 150);
        assert!(!WinStreak::new(4, 4).is_milestone());
    }
}
