//! Ratings, seasons and the rating leaderboard.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use quizsprint_domain::rating::{League, PlayerRating};
use quizsprint_domain::{EventSource, UserId};

use super::DuelError;
use crate::infrastructure::ports::{ClockPort, EventBus, PlayerRatingRepo, RatingStanding, RepoError, SeasonRepo};
use crate::use_cases::{clamp_limit, publish};

/// Ratings resolved against the running season.
///
/// A player seen for the first time gets a fresh rating. A rating left over
/// from an earlier season is soft-reset the first time it is touched.
pub struct SeasonalRatings {
    ratings: Arc<dyn PlayerRatingRepo>,
    seasons: Arc<dyn SeasonRepo>,
    events: Arc<dyn EventBus>,
    fallback_season: String,
}

impl SeasonalRatings {
    pub fn new(
        ratings: Arc<dyn PlayerRatingRepo>,
        seasons: Arc<dyn SeasonRepo>,
        events: Arc<dyn EventBus>,
        fallback_season: impl Into<String>,
    ) -> Self {
        Self {
            ratings,
            seasons,
            events,
            fallback_season: fallback_season.into(),
        }
    }

    /// Id of the active season, or the configured one when none is stored.
    pub async fn current_season(&self, now: DateTime<Utc>) -> Result<String, RepoError> {
        Ok(self
            .seasons
            .find_current(now)
            .await?
            .map(|s| s.id)
            .unwrap_or_else(|| self.fallback_season.clone()))
    }

    pub async fn load_current(&self, player_id: UserId, now: DateTime<Utc>) -> Result<PlayerRating, RepoError> {
        let season = self.current_season(now).await?;
        let mut rating = match self.ratings.get(player_id).await? {
            Some(rating) if rating.season_id() == season => return Ok(rating),
            Some(mut stale) => {
                tracing::info!(
                    %player_id,
                    from = stale.season_id(),
                    to = %season,
                    "Carrying rating into new season"
                );
                stale.season_reset(season, now);
                stale
            }
            None => {
                tracing::debug!(%player_id, %season, "Creating rating");
                PlayerRating::new(player_id, season, now)
            }
        };

        self.ratings.save(&rating).await?;
        publish(self.events.as_ref(), rating.take_events()).await;
        Ok(rating)
    }
}

// =============================================================================
// Queries
// =============================================================================

pub struct GetRatingLeaderboard {
    ratings: Arc<dyn PlayerRatingRepo>,
}

impl GetRatingLeaderboard {
    pub fn new(ratings: Arc<dyn PlayerRatingRepo>) -> Self {
        Self { ratings }
    }

    /// Highest MMR first. With a league filter, positions count within it.
    pub async fn execute(&self, league: Option<League>, limit: Option<usize>) -> Result<Vec<RatingStanding>, DuelError> {
        let limit = clamp_limit(limit);
        let rows = match league {
            Some(league) => self.ratings.top_by_league(league, limit).await?,
            None => self.ratings.top(limit).await?,
        };

        Ok(rows
            .iter()
            .zip(1u32..)
            .map(|(rating, position)| RatingStanding {
                position,
                player_id: rating.player_id(),
                mmr: rating.mmr(),
                rank: rating.rank(),
                league: rating.rank().league,
            })
            .collect())
    }
}

/// A player's rating and their position on the overall ladder.
#[derive(Debug, Clone)]
pub struct PlayerRatingView {
    pub rating: PlayerRating,
    pub position: Option<u32>,
}

pub struct GetPlayerRating {
    ratings: Arc<dyn PlayerRatingRepo>,
}

impl GetPlayerRating {
    pub fn new(ratings: Arc<dyn PlayerRatingRepo>) -> Self {
        Self { ratings }
    }

    pub async fn execute(&self, player_id: UserId) -> Result<PlayerRatingView, DuelError> {
        let rating = self
            .ratings
            .get(player_id)
            .await?
            .ok_or(DuelError::RatingNotFound(player_id))?;
        let position = self.ratings.rank_of_player(player_id).await?;
        Ok(PlayerRatingView { rating, position })
    }
}

// =============================================================================
// Season reset
// =============================================================================

pub struct ResetPlayerSeason {
    ratings: Arc<dyn PlayerRatingRepo>,
    seasonal: Arc<SeasonalRatings>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl ResetPlayerSeason {
    pub fn new(
        ratings: Arc<dyn PlayerRatingRepo>,
        seasonal: Arc<SeasonalRatings>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            ratings,
            seasonal,
            events,
            clock,
        }
    }

    /// Move a player into `season_id` (the current season when `None`).
    /// A rating already in that season is returned unchanged.
    pub async fn execute(&self, player_id: UserId, season_id: Option<String>) -> Result<PlayerRating, DuelError> {
        let now = self.clock.now();
        let season_id = match season_id {
            Some(id) => id,
            None => self.seasonal.current_season(now).await?,
        };
        let mut rating = self
            .ratings
            .get(player_id)
            .await?
            .ok_or(DuelError::RatingNotFound(player_id))?;
        if rating.season_id() == season_id {
            return Ok(rating);
        }

        let old_mmr = rating.mmr();
        rating.season_reset(season_id, now);
        self.ratings.save(&rating).await?;
        publish(self.events.as_ref(), rating.take_events()).await;

        tracing::info!(
            %player_id,
            season = rating.season_id(),
            old_mmr = old_mmr.value(),
            new_mmr = rating.mmr().value(),
            "Season reset"
        );
        Ok(rating)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mockall::predicate::eq;

    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory::{InMemoryEventBus, InMemoryRatings, InMemorySeasons};
    use crate::infrastructure::ports::{MockPlayerRatingRepo, Season};
    use crate::test_fixtures::now;
    use quizsprint_domain::rating::Mmr;

    fn rating_at(player_id: UserId, season: &str, mmr: u32) -> PlayerRating {
        PlayerRating::reconstruct(player_id, season, Mmr::new(mmr).unwrap(), 0, 40, now()).unwrap()
    }

    fn seasonal(ratings: Arc<InMemoryRatings>, seasons: Arc<InMemorySeasons>, bus: Arc<InMemoryEventBus>) -> SeasonalRatings {
        SeasonalRatings::new(ratings, seasons, bus, "season-1")
    }

    mod seasons {
        use super::*;

        #[tokio::test]
        async fn first_touch_creates_initial_rating() {
            let ratings = Arc::new(InMemoryRatings::new());
            let book = seasonal(ratings.clone(), Arc::new(InMemorySeasons::new()), Arc::new(InMemoryEventBus::new()));
            let player = UserId::new();

            let rating = book.load_current(player, now()).await.unwrap();

            assert_eq!(rating.mmr(), Mmr::INITIAL);
            assert_eq!(rating.season_id(), "season-1");
            assert!(ratings.get(player).await.unwrap().is_some());
        }

        #[tokio::test]
        async fn stored_season_wins_over_fallback_and_resets_stale_rating() {
            let ratings = Arc::new(InMemoryRatings::new());
            let seasons = Arc::new(InMemorySeasons::new());
            let bus = Arc::new(InMemoryEventBus::new());
            seasons
                .save(&Season {
                    id: "season-2".into(),
                    name: "Winter".into(),
                    starts_at: now() - Duration::days(1),
                    ends_at: None,
                })
                .await
                .unwrap();
            let player = UserId::new();
            ratings.save(&rating_at(player, "season-1", 1800)).await.unwrap();

            let rating = seasonal(ratings, seasons, bus.clone())
                .load_current(player, now())
                .await
                .unwrap();

            assert_eq!(rating.season_id(), "season-2");
            assert_eq!(rating.mmr().value(), 1400);
            assert_eq!(bus.event_types().await, vec!["rating.season_reset"]);
        }
    }

    mod queries {
        use super::*;

        #[tokio::test]
        async fn leaderboard_positions_follow_mmr() {
            let ratings = Arc::new(InMemoryRatings::new());
            let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
            ratings.save(&rating_at(a, "s", 1200)).await.unwrap();
            ratings.save(&rating_at(b, "s", 1600)).await.unwrap();
            ratings.save(&rating_at(c, "s", 900)).await.unwrap();
            let board = GetRatingLeaderboard::new(ratings);

            let all = board.execute(None, None).await.unwrap();
            assert_eq!(
                all.iter().map(|r| (r.position, r.player_id)).collect::<Vec<_>>(),
                vec![(1, b), (2, a), (3, c)]
            );

            let silver = board.execute(Some(League::Silver), Some(5)).await.unwrap();
            assert_eq!(silver.len(), 1);
            assert_eq!((silver[0].position, silver[0].player_id), (1, a));
        }

        #[tokio::test]
        async fn leaderboard_limit_is_clamped() {
            let mut ratings = MockPlayerRatingRepo::new();
            ratings.expect_top().with(eq(100)).returning(|_| Ok(Vec::new()));

            let rows = GetRatingLeaderboard::new(Arc::new(ratings))
                .execute(None, Some(1000))
                .await
                .unwrap();
            assert!(rows.is_empty());
        }

        #[tokio::test]
        async fn unknown_player_has_no_rating() {
            let player = UserId::new();
            let mut ratings = MockPlayerRatingRepo::new();
            ratings.expect_get().with(eq(player)).returning(|_| Ok(None));

            let err = GetPlayerRating::new(Arc::new(ratings))
                .execute(player)
                .await
                .unwrap_err();
            assert!(matches!(err, DuelError::RatingNotFound(id) if id == player));
        }
    }

    mod reset {
        use super::*;

        fn reset(ratings: Arc<InMemoryRatings>, bus: Arc<InMemoryEventBus>) -> ResetPlayerSeason {
            let book = Arc::new(seasonal(ratings.clone(), Arc::new(InMemorySeasons::new()), bus.clone()));
            ResetPlayerSeason::new(ratings, book, bus, Arc::new(FixedClock(now())))
        }

        #[tokio::test]
        async fn halves_distance_to_1000() {
            let ratings = Arc::new(InMemoryRatings::new());
            let bus = Arc::new(InMemoryEventBus::new());
            let player = UserId::new();
            ratings.save(&rating_at(player, "season-0", 2200)).await.unwrap();

            let rating = reset(ratings.clone(), bus.clone())
                .execute(player, None)
                .await
                .unwrap();

            assert_eq!(rating.mmr().value(), 1600);
            assert_eq!(rating.season_id(), "season-1");
            assert_eq!(ratings.get(player).await.unwrap().unwrap().mmr().value(), 1600);
            assert_eq!(bus.event_types().await, vec!["rating.season_reset"]);
        }

        #[tokio::test]
        async fn same_season_is_a_no_op() {
            let ratings = Arc::new(InMemoryRatings::new());
            let bus = Arc::new(InMemoryEventBus::new());
            let player = UserId::new();
            ratings.save(&rating_at(player, "season-1", 2200)).await.unwrap();

            let rating = reset(ratings, bus.clone())
                .execute(player, Some("season-1".into()))
                .await
                .unwrap();

            assert_eq!(rating.mmr().value(), 2200);
            assert!(bus.event_types().await.is_empty());
        }
    }
}
