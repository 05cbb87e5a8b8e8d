//! In-memory presence tracker backed by a concurrent map.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use quizsprint_domain::{DuelGameId, UserId};

use crate::infrastructure::ports::{OnlineTracker, Presence};

pub struct InMemoryOnlineTracker {
    users: DashMap<UserId, Presence>,
    ttl: Duration,
}

impl InMemoryOnlineTracker {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            users: DashMap::new(),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(60)),
        }
    }

    fn seen_recently(&self, presence: &Presence, now: DateTime<Utc>) -> bool {
        now - presence.last_seen <= self.ttl
    }
}

#[async_trait]
impl OnlineTracker for InMemoryOnlineTracker {
    async fn touch(&self, user_id: UserId, username: &str, at: DateTime<Utc>) {
        self.users
            .entry(user_id)
            .and_modify(|p| {
                p.username = username.to_string();
                p.last_seen = p.last_seen.max(at);
            })
            .or_insert_with(|| Presence {
                user_id,
                username: username.to_string(),
                last_seen: at,
                in_match: None,
            });
    }

    async fn set_offline(&self, user_id: UserId) {
        self.users.remove(&user_id);
    }

    async fn presence(&self, user_id: UserId) -> Option<Presence> {
        self.users.get(&user_id).map(|p| p.clone())
    }

    async fn is_online(&self, user_id: UserId, now: DateTime<Utc>) -> bool {
        self.users
            .get(&user_id)
            .is_some_and(|p| self.seen_recently(&p, now))
    }

    async fn online_among(&self, user_ids: &[UserId], now: DateTime<Utc>) -> Vec<UserId> {
        user_ids
            .iter()
            .copied()
            .filter(|id| {
                self.users
                    .get(id)
                    .is_some_and(|p| self.seen_recently(&p, now))
            })
            .collect()
    }

    async fn set_in_match(&self, user_id: UserId, game_id: Option<DuelGameId>) {
        if let Some(mut presence) = self.users.get_mut(&user_id) {
            presence.in_match = game_id;
        }
    }

    async fn in_match(&self, user_id: UserId) -> Option<DuelGameId> {
        self.users.get(&user_id).and_then(|p| p.in_match)
    }
}
