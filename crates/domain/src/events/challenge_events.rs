//! Friend challenge events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChallengeId, UserId};
use crate::modes::duel::ChallengeKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChallengeEvent {
    Created {
        challenge_id: ChallengeId,
        challenger_id: UserId,
        /// None for link challenges
        challenged_id: Option<UserId>,
        kind: ChallengeKind,
        expires_at: DateTime<Utc>,
        occurred_at: DateTime<Utc>,
    },
    Accepted {
        challenge_id: ChallengeId,
        challenger_id: UserId,
        accepter_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    Declined {
        challenge_id: ChallengeId,
        challenger_id: UserId,
        decliner_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    Expired {
        challenge_id: ChallengeId,
        challenger_id: UserId,
        challenged_id: Option<UserId>,
        occurred_at: DateTime<Utc>,
    },
}

impl ChallengeEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => "challenge.created",
            Self::Accepted { .. } => "challenge.accepted",
            Self::Declined { .. } => "challenge.declined",
            Self::Expired { .. } => "challenge.expired",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Created { occurred_at, .. }
            | Self::Accepted { occurred_at, .. }
            | Self::Declined { occurred_at, .. }
            | Self::Expired { occurred_at, .. } => *occurred_at,
        }
    }
}
