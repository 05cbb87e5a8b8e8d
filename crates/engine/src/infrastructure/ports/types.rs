//! Helper types for port operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quizsprint_domain::rating::{League, Mmr, QueueEntry, Rank};
use quizsprint_domain::{DuelGameId, UserId};

// =============================================================================
// Ranked Play
// =============================================================================

/// A ranked season as stored by [`super::SeasonRepo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: String,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl Season {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && self.ends_at.map_or(true, |end| now < end)
    }
}

/// A matchmaking queue entry plus the display name used when the duel starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPlayer {
    pub entry: QueueEntry,
    pub username: String,
}

impl QueuedPlayer {
    pub fn new(player_id: UserId, username: impl Into<String>, mmr: Mmr, joined_at: DateTime<Utc>) -> Self {
        Self {
            entry: QueueEntry {
                player_id,
                mmr,
                joined_at,
            },
            username: username.into(),
        }
    }

    pub fn player_id(&self) -> UserId {
        self.entry.player_id
    }
}

/// One row of the rating leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingStanding {
    pub position: u32,
    pub player_id: UserId,
    pub mmr: Mmr,
    pub rank: Rank,
    pub league: League,
}

// =============================================================================
// Presence
// =============================================================================

/// What the online tracker knows about a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub user_id: UserId,
    pub username: String,
    pub last_seen: DateTime<Utc>,
    /// Duel the user is currently playing, if any
    pub in_match: Option<DuelGameId>,
}
