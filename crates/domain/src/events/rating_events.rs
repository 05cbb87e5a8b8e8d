//! Rating ladder events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::rating::{Mmr, Rank};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RatingEvent {
    PlayerPromoted {
        player_id: UserId,
        from: Rank,
        to: Rank,
        mmr: Mmr,
        occurred_at: DateTime<Utc>,
    },
    PlayerDemoted {
        player_id: UserId,
        from: Rank,
        to: Rank,
        mmr: Mmr,
        occurred_at: DateTime<Utc>,
    },
    SeasonReset {
        player_id: UserId,
        old_season_id: String,
        new_season_id: String,
        mmr: Mmr,
        rank: Rank,
        occurred_at: DateTime<Utc>,
    },
}

impl RatingEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PlayerPromoted { .. } => "rating.player_promoted",
            Self::PlayerDemoted { .. } => "rating.player_demoted",
            Self::SeasonReset { .. } => "rating.season_reset",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::PlayerPromoted { occurred_at, .. }
            | Self::PlayerDemoted { occurred_at, .. }
            | Self::SeasonReset { occurred_at, .. } => *occurred_at,
        }
    }
}
