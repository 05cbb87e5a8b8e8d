//! Referral program events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ReferralId, UserId};
use crate::modes::duel::ReferralMilestone;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReferralEvent {
    Created {
        referral_id: ReferralId,
        inviter_id: UserId,
        invitee_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    MilestoneReached {
        referral_id: ReferralId,
        inviter_id: UserId,
        invitee_id: UserId,
        milestone: ReferralMilestone,
        occurred_at: DateTime<Utc>,
    },
    RewardClaimed {
        referral_id: ReferralId,
        user_id: UserId,
        milestone: ReferralMilestone,
        occurred_at: DateTime<Utc>,
    },
}

impl ReferralEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => "referral.created",
            Self::MilestoneReached { .. } => "referral.milestone_reached",
            Self::RewardClaimed { .. } => "referral.reward_claimed",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Created { occurred_at, .. }
            | Self::MilestoneReached { occurred_at, .. }
            | Self::RewardClaimed { occurred_at, .. } => *occurred_at,
        }
    }
}
