//! Matchmaking search rules: the MMR window widens the longer a player waits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

use super::league::Mmr;

/// Half-width of the acceptable MMR range after waiting `waited_ms`.
/// `None` means anyone is acceptable.
///
/// ±100 below 5 s, ±200 below 10 s, ±500 below 15 s.
pub fn search_window(waited_ms: u64) -> Option<u32> {
    match waited_ms {
        0..=4_999 => Some(100),
        5_000..=9_999 => Some(200),
        10_000..=14_999 => Some(500),
        _ => None,
    }
}

/// A player waiting for an opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub player_id: UserId,
    pub mmr: Mmr,
    pub joined_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn waited_ms(&self, now: DateTime<Utc>) -> u64 {
        (now - self.joined_at).num_milliseconds().max(0) as u64
    }
}

/// Closest opponent inside the window for `player_id`.
///
/// `entries` must be in queue order; equal distances go to the earlier entry.
pub fn find_best_match<'a>(
    entries: &'a [QueueEntry],
    player_id: UserId,
    mmr: Mmr,
    waited_ms: u64,
) -> Option<&'a QueueEntry> {
    let window = search_window(waited_ms);
    entries
        .iter()
        .filter(|e| e.player_id != player_id)
        .filter(|e| window.map_or(true, |w| e.mmr.diff(mmr).unsigned_abs() <= u64::from(w)))
        .min_by_key(|e| e.mmr.diff(mmr).unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(mmr: u32) -> QueueEntry {
        QueueEntry {
            player_id: UserId::new(),
            mmr: Mmr::new(mmr).unwrap(),
            joined_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn window_changes_exactly_at_boundaries() {
        assert_eq!(search_window(0), Some(100));
        assert_eq!(search_window(4_999), Some(100));
        assert_eq!(search_window(5_000), Some(200));
        assert_eq!(search_window(9_999), Some(200));
        assert_eq!(search_window(10_000), Some(500));
        assert_eq!(search_window(14_999), Some(500));
        assert_eq!(search_window(15_000), None);
    }

    #[test]
    fn picks_closest_and_excludes_self() {
        let me = entry(1000);
        let queue = vec![me, entry(1090), entry(950), entry(1300)];
        let found = find_best_match(&queue, me.player_id, me.mmr, 0).unwrap();
        assert_eq!(found.mmr.value(), 950);
    }

    #[test]
    fn ties_go_to_queue_order() {
        let queue = vec![entry(1050), entry(950)];
        let found = find_best_match(&queue, UserId::new(), Mmr::new(1000).unwrap(), 0).unwrap();
        assert_eq!(found.player_id, queue[0].player_id);
    }

    #[test]
    fn window_widens_with_wait() {
        let queue = vec![entry(1600)];
        let me = UserId::new();
        let mmr = Mmr::new(1000).unwrap();
        assert!(find_best_match(&queue, me, mmr, 9_999).is_none());
        assert!(find_best_match(&queue, me, mmr, 14_999).is_none());
        assert!(find_best_match(&queue, me, mmr, 15_000).is_some());
    }

    #[test]
    fn opponent_enters_window_right_at_each_step() {
        let me = UserId::new();
        let mmr = Mmr::new(1000).unwrap();

        let at_200 = vec![entry(1200)];
        assert!(find_best_match(&at_200, me, mmr, 4_999).is_none());
        assert!(find_best_match(&at_200, me, mmr, 5_000).is_some());

        let at_400 = vec![entry(1400)];
        assert!(find_best_match(&at_400, me, mmr, 9_999).is_none());
        assert!(find_best_match(&at_400, me, mmr, 10_000).is_some());
        assert!(find_best_match(&at_400, me, mmr, 14_999).is_some());
    }

    #[test]
    fn waited_is_never_negative() {
        let e = entry(1000);
        assert_eq!(e.waited_ms(e.joined_at - Duration::seconds(3)), 0);
        assert_eq!(e.waited_ms(e.joined_at + Duration::milliseconds(5_000)), 5_000);
    }
}
