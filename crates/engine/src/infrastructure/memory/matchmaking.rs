//! In-memory matchmaking queue.
//!
//! A single lock guards the queue, so add, remove and match are atomic.

use async_trait::async_trait;
use tokio::sync::RwLock;

use quizsprint_domain::rating::{find_best_match, Mmr, QueueEntry};
use quizsprint_domain::UserId;

use crate::infrastructure::ports::{MatchmakingQueue, QueuedPlayer, RepoError};

#[derive(Default)]
pub struct InMemoryMatchmakingQueue {
    /// Join order
    players: RwLock<Vec<QueuedPlayer>>,
}

impl InMemoryMatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchmakingQueue for InMemoryMatchmakingQueue {
    async fn add(&self, player: QueuedPlayer) -> Result<bool, RepoError> {
        let mut players = self.players.write().await;
        if players.iter().any(|p| p.player_id() == player.player_id()) {
            return Ok(false);
        }
        players.push(player);
        Ok(true)
    }

    async fn remove(&self, player_id: UserId) -> Result<bool, RepoError> {
        let mut players = self.players.write().await;
        let before = players.len();
        players.retain(|p| p.player_id() != player_id);
        Ok(players.len() != before)
    }

    async fn find_match(
        &self,
        player_id: UserId,
        mmr: Mmr,
        waited_ms: u64,
    ) -> Result<Option<QueuedPlayer>, RepoError> {
        let players = self.players.read().await;
        let entries: Vec<QueueEntry> = players.iter().map(|p| p.entry).collect();
        let Some(best) = find_best_match(&entries, player_id, mmr, waited_ms) else {
            return Ok(None);
        };
        Ok(players
            .iter()
            .find(|p| p.player_id() == best.player_id)
            .cloned())
    }

    async fn get(&self, player_id: UserId) -> Result<Option<QueuedPlayer>, RepoError> {
        Ok(self
            .players
            .read()
            .await
            .iter()
            .find(|p| p.player_id() == player_id)
            .cloned())
    }

    async fn contains(&self, player_id: UserId) -> Result<bool, RepoError> {
        Ok(self
            .players
            .read()
            .await
            .iter()
            .any(|p| p.player_id() == player_id))
    }

    async fn len(&self) -> Result<usize, RepoError> {
        Ok(self.players.read().await.len())
    }
}
