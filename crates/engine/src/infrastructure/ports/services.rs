//! Shared-state service ports: matchmaking queue, presence and event bus.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use quizsprint_domain::rating::Mmr;
use quizsprint_domain::{DomainEvent, DuelGameId, UserId};

use super::error::{EventBusError, RepoError};
use super::types::{Presence, QueuedPlayer};

/// Players waiting for a ranked duel, ordered by join time.
///
/// Implementations must make each operation atomic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchmakingQueue: Send + Sync {
    /// Add a player. Returns false when the player is already queued.
    async fn add(&self, player: QueuedPlayer) -> Result<bool, RepoError>;
    /// Remove a player. Returns false when the player was not queued.
    async fn remove(&self, player_id: UserId) -> Result<bool, RepoError>;
    /// Closest opponent inside the search window for the given wait.
    async fn find_match(
        &self,
        player_id: UserId,
        mmr: Mmr,
        waited_ms: u64,
    ) -> Result<Option<QueuedPlayer>, RepoError>;
    async fn get(&self, player_id: UserId) -> Result<Option<QueuedPlayer>, RepoError>;
    async fn contains(&self, player_id: UserId) -> Result<bool, RepoError>;
    async fn len(&self) -> Result<usize, RepoError>;
}

/// Who is online and who is busy in a duel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OnlineTracker: Send + Sync {
    /// Mark the user as seen at `at`.
    async fn touch(&self, user_id: UserId, username: &str, at: DateTime<Utc>);
    async fn set_offline(&self, user_id: UserId);
    async fn presence(&self, user_id: UserId) -> Option<Presence>;
    async fn is_online(&self, user_id: UserId, now: DateTime<Utc>) -> bool;
    /// Subset of `user_ids` currently online, in input order.
    async fn online_among(&self, user_ids: &[UserId], now: DateTime<Utc>) -> Vec<UserId>;
    async fn set_in_match(&self, user_id: UserId, game_id: Option<DuelGameId>);
    async fn in_match(&self, user_id: UserId) -> Option<DuelGameId>;
}

/// Receives drained aggregate events after a successful save.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), EventBusError>;
}
