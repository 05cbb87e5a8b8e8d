//! In-memory storage for duels, ratings, challenges, referrals and seasons.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quizsprint_domain::modes::duel::{ChallengeKind, DuelChallenge, DuelGame, DuelStatus, Referral};
use quizsprint_domain::modes::Lifecycle;
use quizsprint_domain::rating::{League, PlayerRating};
use quizsprint_domain::{ChallengeId, DuelGameId, ReferralId, UserId};

use super::stored;
use crate::infrastructure::ports::{
    ChallengeRepo, DuelGameRepo, PlayerRatingRepo, ReferralRepo, RepoError, Season, SeasonRepo,
};

// =============================================================================
// Duel games
// =============================================================================

#[derive(Default)]
pub struct InMemoryDuelGames {
    games: RwLock<HashMap<DuelGameId, DuelGame>>,
}

impl InMemoryDuelGames {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DuelGameRepo for InMemoryDuelGames {
    async fn get(&self, id: DuelGameId) -> Result<Option<DuelGame>, RepoError> {
        Ok(self.games.read().await.get(&id).cloned())
    }

    async fn save(&self, game: &DuelGame) -> Result<(), RepoError> {
        self.games.write().await.insert(game.id(), stored(game));
        Ok(())
    }

    async fn delete(&self, id: DuelGameId) -> Result<(), RepoError> {
        self.games.write().await.remove(&id);
        Ok(())
    }

    async fn find_active_by_player(&self, player_id: UserId) -> Result<Option<DuelGame>, RepoError> {
        Ok(self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.has_player(player_id) && !g.status().is_terminal())
            .max_by_key(|g| g.created_at())
            .cloned())
    }

    async fn count_finished_by_player(&self, player_id: UserId) -> Result<u32, RepoError> {
        Ok(self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.has_player(player_id) && g.status() == DuelStatus::Finished)
            .count() as u32)
    }
}

// =============================================================================
// Ratings
// =============================================================================

#[derive(Default)]
pub struct InMemoryRatings {
    ratings: RwLock<HashMap<UserId, PlayerRating>>,
}

impl InMemoryRatings {
    pub fn new() -> Self {
        Self::default()
    }

    async fn ladder(&self) -> Vec<PlayerRating> {
        let mut rows: Vec<PlayerRating> = self.ratings.read().await.values().cloned().collect();
        rows.sort_by(|a, b| b.mmr().cmp(&a.mmr()).then(a.player_id().cmp(&b.player_id())));
        rows
    }
}

#[async_trait]
impl PlayerRatingRepo for InMemoryRatings {
    async fn get(&self, player_id: UserId) -> Result<Option<PlayerRating>, RepoError> {
        Ok(self.ratings.read().await.get(&player_id).cloned())
    }

    async fn save(&self, rating: &PlayerRating) -> Result<(), RepoError> {
        self.ratings
            .write()
            .await
            .insert(rating.player_id(), stored(rating));
        Ok(())
    }

    async fn delete(&self, player_id: UserId) -> Result<(), RepoError> {
        self.ratings.write().await.remove(&player_id);
        Ok(())
    }

    async fn top(&self, limit: usize) -> Result<Vec<PlayerRating>, RepoError> {
        let mut rows = self.ladder().await;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn top_by_league(&self, league: League, limit: usize) -> Result<Vec<PlayerRating>, RepoError> {
        Ok(self
            .ladder()
            .await
            .into_iter()
            .filter(|r| r.rank().league == league)
            .take(limit)
            .collect())
    }

    async fn rank_of_player(&self, player_id: UserId) -> Result<Option<u32>, RepoError> {
        Ok(self
            .ladder()
            .await
            .iter()
            .position(|r| r.player_id() == player_id)
            .map(|i| i as u32 + 1))
    }
}

// =============================================================================
// Challenges
// =============================================================================

#[derive(Default)]
pub struct InMemoryChallenges {
    challenges: RwLock<HashMap<ChallengeId, DuelChallenge>>,
}

impl InMemoryChallenges {
    pub fn new() -> Self {
        Self::default()
    }

    async fn pending_where(&self, pred: impl Fn(&DuelChallenge) -> bool + Send) -> Vec<DuelChallenge> {
        let mut rows: Vec<DuelChallenge> = self
            .challenges
            .read()
            .await
            .values()
            .filter(|c| c.is_pending() && pred(c))
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.created_at(), c.id()));
        rows
    }
}

#[async_trait]
impl ChallengeRepo for InMemoryChallenges {
    async fn get(&self, id: ChallengeId) -> Result<Option<DuelChallenge>, RepoError> {
        Ok(self.challenges.read().await.get(&id).cloned())
    }

    async fn save(&self, challenge: &DuelChallenge) -> Result<(), RepoError> {
        self.challenges
            .write()
            .await
            .insert(challenge.id(), stored(challenge));
        Ok(())
    }

    async fn delete(&self, id: ChallengeId) -> Result<(), RepoError> {
        self.challenges.write().await.remove(&id);
        Ok(())
    }

    async fn find_pending_for_player(&self, player_id: UserId) -> Result<Vec<DuelChallenge>, RepoError> {
        Ok(self
            .pending_where(|c| c.challenged_id() == Some(player_id))
            .await)
    }

    async fn find_pending_between(
        &self,
        challenger_id: UserId,
        challenged_id: UserId,
    ) -> Result<Option<DuelChallenge>, RepoError> {
        Ok(self
            .pending_where(|c| {
                c.kind() == ChallengeKind::Direct
                    && c.challenger_id() == challenger_id
                    && c.challenged_id() == Some(challenged_id)
            })
            .await
            .pop())
    }

    async fn find_pending_by_code(&self, code: &str) -> Result<Option<DuelChallenge>, RepoError> {
        Ok(self
            .pending_where(|c| c.matches_code(code))
            .await
            .into_iter()
            .next())
    }

    async fn find_expired_pending(&self, now: DateTime<Utc>) -> Result<Vec<DuelChallenge>, RepoError> {
        Ok(self.pending_where(|c| c.is_expired(now)).await)
    }
}

// =============================================================================
// Referrals
// =============================================================================

#[derive(Default)]
pub struct InMemoryReferrals {
    referrals: RwLock<HashMap<ReferralId, Referral>>,
}

impl InMemoryReferrals {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReferralRepo for InMemoryReferrals {
    async fn get(&self, id: ReferralId) -> Result<Option<Referral>, RepoError> {
        Ok(self.referrals.read().await.get(&id).cloned())
    }

    async fn save(&self, referral: &Referral) -> Result<(), RepoError> {
        let mut referrals = self.referrals.write().await;
        if referrals
            .values()
            .any(|r| r.invitee_id() == referral.invitee_id() && r.id() != referral.id())
        {
            return Err(RepoError::constraint(format!(
                "invitee {} already has a referrer",
                referral.invitee_id()
            )));
        }
        referrals.insert(referral.id(), stored(referral));
        Ok(())
    }

    async fn delete(&self, id: ReferralId) -> Result<(), RepoError> {
        self.referrals.write().await.remove(&id);
        Ok(())
    }

    async fn find_by_invitee(&self, invitee_id: UserId) -> Result<Option<Referral>, RepoError> {
        Ok(self
            .referrals
            .read()
            .await
            .values()
            .find(|r| r.invitee_id() == invitee_id)
            .cloned())
    }

    async fn list_by_inviter(&self, inviter_id: UserId) -> Result<Vec<Referral>, RepoError> {
        let mut rows: Vec<Referral> = self
            .referrals
            .read()
            .await
            .values()
            .filter(|r| r.inviter_id() == inviter_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at());
        Ok(rows)
    }
}

// =============================================================================
// Seasons
// =============================================================================

#[derive(Default)]
pub struct InMemorySeasons {
    seasons: RwLock<HashMap<String, Season>>,
}

impl InMemorySeasons {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeasonRepo for InMemorySeasons {
    async fn get(&self, id: &str) -> Result<Option<Season>, RepoError> {
        Ok(self.seasons.read().await.get(id).cloned())
    }

    async fn save(&self, season: &Season) -> Result<(), RepoError> {
        self.seasons
            .write()
            .await
            .insert(season.id.clone(), season.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        self.seasons.write().await.remove(id);
        Ok(())
    }

    async fn find_current(&self, now: DateTime<Utc>) -> Result<Option<Season>, RepoError> {
        Ok(self
            .seasons
            .read()
            .await
            .values()
            .filter(|s| s.is_active(now))
            .max_by_key(|s| s.starts_at)
            .cloned())
    }
}
