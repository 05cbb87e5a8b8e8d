//! Daily streak: consecutive days with a completed daily challenge

use serde::{Deserialize, Serialize};

use crate::value_objects::GameDate;

/// Streak lengths that trigger a milestone event
pub const STREAK_MILESTONES: [u32; 5] = [3, 7, 14, 30, 100];

/// Score bonus earned by a streak, in percent (100 = no bonus)
///
/// Kept as an integer so that `floor(score * bonus)` is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreakBonus(u32);

impl StreakBonus {
    pub const NONE: StreakBonus = StreakBonus(100);

    pub fn for_streak(streak: u32) -> Self {
        let percent = match streak {
            0..=2 => 100,
            3..=6 => 110,
            7..=13 => 125,
            14..=29 => 140,
            _ => 150,
        };
        Self(percent)
    }

    #[inline]
    pub fn percent(&self) -> u32 {
        self.0
    }

    /// Bonus over the base, e.g. 10 for x1.10.
    #[inline]
    pub fn extra_percent(&self) -> u32 {
        self.0 - 100
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// `floor(value * bonus)`
    pub fn apply(&self, value: u32) -> u32 {
        (u64::from(value) * u64::from(self.0) / 100) as u32
    }
}

/// Immutable streak state `(current, best, last played)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStreak {
    current: u32,
    best: u32,
    last_played: Option<GameDate>,
}

impl DailyStreak {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconstruct(current: u32, best: u32, last_played: Option<GameDate>) -> Self {
        Self {
            current,
            best: best.max(current),
            last_played,
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

    #[inline]
    pub fn last_played(&self) -> Option<GameDate> {
        self.last_played
    }

    /// Streak after completing the challenge of `played`.
    ///
    /// Same day is a no-op, the next day extends, any gap restarts at 1.
    #[must_use]
    pub fn update_for_date(&self, played: GameDate) -> Self {
        let Some(last) = self.last_played else {
            return Self {
                current: 1,
                best: self.best.max(1),
                last_played: Some(played),
            };
        };

        if last == played {
            return *self;
        }

        if last.next() == played {
            let current = self.current + 1;
            return Self {
                current,
                best: self.best.max(current),
                last_played: Some(played),
            };
        }

        Self {
            current: 1,
            best: self.best.max(1),
            last_played: Some(played),
        }
    }

    pub fn bonus(&self) -> StreakBonus {
        StreakBonus::for_streak(self.current)
    }

    /// Played today or yesterday, so the streak can still grow.
    pub fn is_active(&self, today: GameDate) -> bool {
        self.last_played
            .is_some_and(|last| last == today || last == today.previous())
    }

    /// Streak as seen on `today`: zero once a day was missed.
    pub fn effective_current(&self, today: GameDate) -> u32 {
        if self.is_active(today) {
            self.current
        } else {
            0
        }
    }

    /// Exactly one day was missed; a restore would keep the streak alive.
    pub fn can_restore(&self, today: GameDate) -> bool {
        self.current > 0 && self.last_played.is_some_and(|last| last.days_until(today) == 2)
    }

    /// Next milestone strictly above the current streak.
    pub fn next_milestone(&self) -> Option<u32> {
        STREAK_MILESTONES.iter().copied().find(|m| *m > self.current)
    }

    pub fn days_to_next_milestone(&self) -> Option<u32> {
        self.next_milestone().map(|m| m - self.current)
    }
}

pub fn is_streak_milestone(streak: u32) -> bool {
    STREAK_MILESTONES.contains(&streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> GameDate {
        s.parse().unwrap()
    }

    mod update_rule {
        use super::*;

        #[test]
        fn first_play_starts_at_one() {
            let s = DailyStreak::new().update_for_date(date("2026-01-25"));
            assert_eq!((s.current(), s.best()), (1, 1));
            assert_eq!(s.last_played(), Some(date("2026-01-25")));
        }

        #[test]
        fn consecutive_day_extends() {
            let s = DailyStreak::reconstruct(2, 2, Some(date("2026-01-24")))
                .update_for_date(date("2026-01-25"));
            assert_eq!((s.current(), s.best()), (3, 3));
        }

        #[test]
        fn same_day_is_idempotent() {
            let s = DailyStreak::reconstruct(4, 9, Some(date("2026-01-25")));
            assert_eq!(s.update_for_date(date("2026-01-25")), s);
        }

        #[test]
        fn gap_restarts_but_keeps_best() {
            let s = DailyStreak::reconstruct(5, 5, Some(date("2026-01-20")))
                .update_for_date(date("2026-01-25"));
            assert_eq!((s.current(), s.best()), (1, 5));
        }
    }

    mod bonus {
        use super::*;

        #[test]
        fn bonus_table() {
            let table = [(0, 100), (2, 100), (3, 110), (6, 110), (7, 125), (13, 125), (14, 140), (29, 140), (30, 150), (365, 150)];
            for (streak, percent) in table {
                assert_eq!(StreakBonus::for_streak(streak).percent(), percent, "streak {streak}");
            }
        }

        #[test]
        fn apply_floors_exactly() {
            assert_eq!(StreakBonus::for_streak(3).apply(500), 550);
            assert_eq!(StreakBonus::for_streak(14).apply(400), 560);
            assert_eq!(StreakBonus::for_streak(7).apply(333), 416);
        }
    }

    mod status {
        use super::*;

        #[test]
        fn activity_and_restore_window() {
            let s = DailyStreak::reconstruct(6, 6, Some(date("2026-01-23")));
            assert!(!s.is_active(date("2026-01-25")));
            assert!(s.can_restore(date("2026-01-25")));
            assert_eq!(s.effective_current(date("2026-01-25")), 0);
            assert!(s.is_active(date("2026-01-24")));
            assert!(!s.can_restore(date("2026-01-26")));
        }

        #[test]
        fn next_milestone() {
            let s = DailyStreak::reconstruct(5, 5, None);
            assert_eq!(s.next_milestone(), Some(7));
            assert_eq!(s.days_to_next_milestone(), Some(2));
            assert_eq!(DailyStreak::reconstruct(100, 100, None).next_milestone(), None);
        }
    }

    proptest! {
        #[test]
        fn streak_invariants(current in 0u32..50, extra in 0u32..50, last_offset in 0i64..400, gap in 0u32..5) {
            let base = date("2025-01-01");
            let mut last = base;
            for _ in 0..last_offset {
                last = last.next();
            }
            let prior = DailyStreak::reconstruct(current, current + extra, Some(last));
            let mut played = last;
            for _ in 0..gap {
                played = played.next();
            }
            let next = prior.update_for_date(played);

            prop_assert!(next.best() >= prior.best());
            prop_assert_eq!(next.update_for_date(played), next);
            match gap {
                0 => prop_assert_eq!(next, prior),
                1 => prop_assert_eq!(next.current(), current + 1),
                _ => prop_assert_eq!(next.current(), 1),
            }
        }
    }
}
