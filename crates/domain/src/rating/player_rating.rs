//! Player rating aggregate - persistent MMR, rank, peak and season record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{DomainEvent, EventSource, RatingEvent};
use crate::ids::UserId;

use super::elo::{rating_delta, MatchOutcome};
use super::league::{Mmr, Rank};
use super::win_streak::WinStreak;

/// Games a player must play at a fresh rank before they can be demoted
pub const DEMOTION_PROTECTION_GAMES: u32 = 3;

/// Seasonal soft reset never drops a player below this
pub const SEASON_RESET_FLOOR: u32 = 500;

/// Input for one rated game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub outcome: MatchOutcome,
    pub opponent_mmr: Mmr,
    pub played_at: DateTime<Utc>,
}

/// What a rated game did to a player's standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub old_mmr: Mmr,
    pub new_mmr: Mmr,
    pub old_rank: Rank,
    pub new_rank: Rank,
    /// True when demotion protection held the player at the rank floor
    pub protected: bool,
}

impl RatingChange {
    pub fn delta(&self) -> i64 {
        self.new_mmr.diff(self.old_mmr)
    }

    pub fn is_promotion(&self) -> bool {
        self.new_rank > self.old_rank
    }

    pub fn is_demotion(&self) -> bool {
        self.new_rank < self.old_rank
    }
}

/// Competitive standing of one player
///
/// # Invariants
///
/// - `rank == Rank::from_mmr(mmr)`; protection clamps MMR to the held rank's
///   floor rather than letting the two drift apart
/// - `peak_mmr >= mmr`
/// - `games_played` spans all seasons and drives the K-factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRating {
    player_id: UserId,
    mmr: Mmr,
    rank: Rank,
    peak_mmr: Mmr,
    peak_rank: Rank,
    games_at_rank: u32,
    games_played: u32,
    win_streak: WinStreak,
    season_id: String,
    season_wins: u32,
    season_losses: u32,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl PlayerRating {
    pub fn new(player_id: UserId, season_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let rank = Rank::from_mmr(Mmr::INITIAL);
        Self {
            player_id,
            mmr: Mmr::INITIAL,
            rank,
            peak_mmr: Mmr::INITIAL,
            peak_rank: rank,
            games_at_rank: 0,
            games_played: 0,
            win_streak: WinStreak::default(),
            season_id: season_id.into(),
            season_wins: 0,
            season_losses: 0,
            updated_at: created_at,
            events: Vec::new(),
        }
    }

    /// Rebuild a rating at a known standing, e.g. when migrating ladders.
    pub fn reconstruct(
        player_id: UserId,
        season_id: impl Into<String>,
        mmr: Mmr,
        games_at_rank: u32,
        games_played: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if player_id.is_nil() {
            return Err(DomainError::invalid_id("player id must not be nil"));
        }
        let rank = Rank::from_mmr(mmr);
        Ok(Self {
            player_id,
            mmr,
            rank,
            peak_mmr: mmr,
            peak_rank: rank,
            games_at_rank,
            games_played,
            win_streak: WinStreak::default(),
            season_id: season_id.into(),
            season_wins: 0,
            season_losses: 0,
            updated_at,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn player_id(&self) -> UserId {
        self.player_id
    }

    #[inline]
    pub fn mmr(&self) -> Mmr {
        self.mmr
    }

    #[inline]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    #[inline]
    pub fn peak_mmr(&self) -> Mmr {
        self.peak_mmr
    }

    #[inline]
    pub fn peak_rank(&self) -> Rank {
        self.peak_rank
    }

    #[inline]
    pub fn games_at_rank(&self) -> u32 {
        self.games_at_rank
    }

    #[inline]
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    #[inline]
    pub fn win_streak(&self) -> WinStreak {
        self.win_streak
    }

    #[inline]
    pub fn season_id(&self) -> &str {
        &self.season_id
    }

    #[inline]
    pub fn season_wins(&self) -> u32 {
        self.season_wins
    }

    #[inline]
    pub fn season_losses(&self) -> u32 {
        self.season_losses
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn can_be_demoted(&self) -> bool {
        self.games_at_rank >= DEMOTION_PROTECTION_GAMES
    }

    /// Season win rate in percent
    pub fn win_rate(&self) -> f64 {
        let total = self.season_wins + self.season_losses;
        if total == 0 {
            return 0.0;
        }
        f64::from(self.season_wins) * 100.0 / f64::from(total)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Apply one rated game.
    ///
    /// A result that would drop the player below their current rank while
    /// `games_at_rank < 3` is clamped to the rank floor; such a game leaves
    /// `games_at_rank` unchanged. A rank change resets it to zero.
    pub fn apply_game_result(&mut self, result: GameResult) -> RatingChange {
        let old_mmr = self.mmr;
        let old_rank = self.rank;

        let delta = rating_delta(self.mmr, result.opponent_mmr, result.outcome, self.games_played);
        let mut new_mmr = self.mmr.offset(delta);
        let mut new_rank = Rank::from_mmr(new_mmr);

        let protected = new_rank < old_rank && !self.can_be_demoted();
        if protected {
            new_mmr = old_rank.floor();
            new_rank = old_rank;
        }

        if new_rank != old_rank {
            self.games_at_rank = 0;
            let event = if new_rank > old_rank {
                RatingEvent::PlayerPromoted {
                    player_id: self.player_id,
                    from: old_rank,
                    to: new_rank,
                    mmr: new_mmr,
                    occurred_at: result.played_at,
                }
            } else {
                RatingEvent::PlayerDemoted {
                    player_id: self.player_id,
                    from: old_rank,
                    to: new_rank,
                    mmr: new_mmr,
                    occurred_at: result.played_at,
                }
            };
            self.events.push(event.into());
        } else if !protected {
            self.games_at_rank += 1;
        }

        match result.outcome {
            MatchOutcome::Win => {
                self.season_wins += 1;
                self.win_streak = self.win_streak.after_win();
            }
            MatchOutcome::Loss => {
                self.season_losses += 1;
                self.win_streak = self.win_streak.after_loss();
            }
            MatchOutcome::Draw => {}
        }

        self.mmr = new_mmr;
        self.rank = new_rank;
        self.games_played += 1;
        self.updated_at = result.played_at;

        if self.mmr > self.peak_mmr {
            self.peak_mmr = self.mmr;
            self.peak_rank = self.rank;
        }

        RatingChange {
            old_mmr,
            new_mmr,
            old_rank,
            new_rank,
            protected,
        }
    }

    /// Soft reset for a new season:
    /// `max(500, 1000 + floor((mmr - 1000) / 2))`.
    pub fn season_reset(&mut self, new_season_id: impl Into<String>, reset_at: DateTime<Utc>) {
        let centered = i64::from(self.mmr.value()) - 1000;
        let reset = (1000 + centered.div_euclid(2)).max(i64::from(SEASON_RESET_FLOOR));
        let old_season_id = std::mem::replace(&mut self.season_id, new_season_id.into());

        self.mmr = Mmr::clamped(reset);
        self.rank = Rank::from_mmr(self.mmr);
        self.season_wins = 0;
        self.season_losses = 0;
        self.games_at_rank = 0;
        self.updated_at = reset_at;
        if self.mmr > self.peak_mmr {
            self.peak_mmr = self.mmr;
            self.peak_rank = self.rank;
        }

        self.events.push(
            RatingEvent::SeasonReset {
                player_id: self.player_id,
                old_season_id,
                new_season_id: self.season_id.clone(),
                mmr: self.mmr,
                rank: self.rank,
                occurred_at: reset_at,
            }
            .into(),
        );
    }
}

impl EventSource for PlayerRating {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{Division, League};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)
    }

    fn mmr(v: u32) -> Mmr {
        Mmr::new(v).unwrap()
    }

    fn rating(v: u32, games_at_rank: u32, games_played: u32) -> PlayerRating {
        PlayerRating::reconstruct(UserId::new(), "s1", mmr(v), games_at_rank, games_played, now()).unwrap()
    }

    fn result(outcome: MatchOutcome, opponent: u32) -> GameResult {
        GameResult {
            outcome,
            opponent_mmr: mmr(opponent),
            played_at: now(),
        }
    }

    mod demotion {
        use super::*;

        #[test]
        fn protected_loss_clamps_to_floor() {
            // K=32 against an equal opponent: nominal -16 -> 984 (Bronze I)
            let mut r = rating(1000, 1, 0);
            let change = r.apply_game_result(result(MatchOutcome::Loss, 1000));
            assert!(change.protected);
            assert_eq!(r.mmr(), mmr(1000));
            assert_eq!(r.rank().league, League::Silver);
            assert_eq!(r.rank().division, Division::IV);
            assert_eq!(r.games_at_rank(), 1);
            assert!(r.take_events().is_empty());
            assert_eq!(r.season_losses(), 1);
        }

        #[test]
        fn unprotected_loss_demotes() {
            let mut r = rating(1000, 3, 0);
            let change = r.apply_game_result(result(MatchOutcome::Loss, 1000));
            assert!(change.is_demotion());
            assert_eq!(r.mmr(), mmr(984));
            assert_eq!(r.rank().league, League::Bronze);
            assert_eq!(r.games_at_rank(), 0);
            let types: Vec<_> = r.take_events().iter().map(DomainEvent::event_type).collect();
            assert_eq!(types, vec!["rating.player_demoted"]);
        }

        #[test]
        fn loss_within_rank_increments_counter() {
            let mut r = rating(1300, 0, 0);
            r.apply_game_result(result(MatchOutcome::Loss, 1300));
            assert_eq!(r.mmr(), mmr(1284));
            assert_eq!(r.games_at_rank(), 1);
        }
    }

    #[test]
    fn promotion_resets_counter_and_tracks_peak() {
        let mut r = rating(1120, 2, 0);
        let change = r.apply_game_result(result(MatchOutcome::Win, 1120));
        assert!(change.is_promotion());
        assert_eq!(r.mmr(), mmr(1136));
        assert_eq!(r.rank().division, Division::III);
        assert_eq!(r.games_at_rank(), 0);
        assert_eq!(r.peak_mmr(), mmr(1136));
        assert_eq!(r.win_streak().current(), 1);
        assert_eq!(
            r.take_events().iter().map(DomainEvent::event_type).collect::<Vec<_>>(),
            vec!["rating.player_promoted"]
        );
    }

    #[test]
    fn veteran_underdog_win() {
        let mut p1 = rating(1000, 5, 30);
        let mut p2 = rating(1200, 5, 30);
        let p1_before = p1.mmr();
        let p2_before = p2.mmr();
        p1.apply_game_result(result(MatchOutcome::Win, p2_before.value()));
        p2.apply_game_result(result(MatchOutcome::Loss, p1_before.value()));
        assert_eq!(p1.mmr(), mmr(1012));
        assert_eq!(p2.mmr(), mmr(1188));
    }

    #[test]
    fn season_reset_halves_distance_to_1000() {
        let mut r = rating(1800, 2, 40);
        r.apply_game_result(result(MatchOutcome::Win, 1800));
        r.season_reset("s2", now());
        // +10 (minimum change) then halved: 1000 + 810 / 2
        assert_eq!(r.mmr(), mmr(1405));
        assert_eq!(r.season_id(), "s2");
        assert_eq!((r.season_wins(), r.season_losses(), r.games_at_rank()), (0, 0, 0));
        assert_eq!(r.games_played(), 41);

        let mut low = rating(501, 0, 0);
        low.season_reset("s2", now());
        assert_eq!(low.mmr(), mmr(750));

        let mut floor = rating(0, 0, 0);
        floor.season_reset("s2", now());
        assert_eq!(floor.mmr(), mmr(500));
    }

    #[test]
    fn draw_counts_as_game_but_not_as_win_or_loss() {
        let mut r = rating(1000, 0, 0);
        r.apply_game_result(result(MatchOutcome::Draw, 1000));
        assert_eq!(r.mmr(), mmr(1000));
        assert_eq!(r.games_played(), 1);
        assert_eq!(r.win_rate(), 0.0);
    }

    #[test]
    fn stored_rating_round_trips() {
        let mut r = rating(1120, 2, 12);
        r.apply_game_result(result(MatchOutcome::Win, 1120));
        r.apply_game_result(result(MatchOutcome::Loss, 1300));
        r.take_events();

        let back: PlayerRating = serde_json::from_str(&serde_json::to_string(&r).unwrap()).unwrap();
        assert_eq!(back, r);
        assert_eq!(back.peak_mmr(), mmr(1136));
        assert_eq!(back.season_losses(), 1);
    }
}
