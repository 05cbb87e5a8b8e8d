//! Referral aggregate - an inviter, an invitee and the milestones they unlock

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{DomainEvent, EventSource, ReferralEvent};
use crate::ids::{ReferralId, UserId};
use crate::rating::League;

/// Duels the invitee must play for [`ReferralMilestone::PlayedFiveDuels`]
pub const DUELS_FOR_MILESTONE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralMilestone {
    Registered,
    #[serde(rename = "played_5_duels")]
    PlayedFiveDuels,
    ReachedSilver,
    ReachedGold,
    ReachedPlatinum,
}

impl ReferralMilestone {
    pub const ALL: [ReferralMilestone; 5] = [
        Self::Registered,
        Self::PlayedFiveDuels,
        Self::ReachedSilver,
        Self::ReachedGold,
        Self::ReachedPlatinum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::PlayedFiveDuels => "played_5_duels",
            Self::ReachedSilver => "reached_silver",
            Self::ReachedGold => "reached_gold",
            Self::ReachedPlatinum => "reached_platinum",
        }
    }

    /// What the inviter and the invitee each get for this milestone.
    pub fn rewards(&self) -> (ReferralReward, ReferralReward) {
        match self {
            Self::Registered => (ReferralReward::new(3, 100), ReferralReward::new(3, 100)),
            Self::PlayedFiveDuels => (ReferralReward::new(5, 300), ReferralReward::new(0, 200)),
            Self::ReachedSilver => (
                ReferralReward::new(10, 500).with_badge("mentor"),
                ReferralReward::new(0, 300),
            ),
            Self::ReachedGold => (
                ReferralReward::new(20, 1000).with_avatar("exclusive_referrer"),
                ReferralReward::new(0, 500),
            ),
            Self::ReachedPlatinum => (
                ReferralReward::new(50, 3000).with_title("legendary_mentor"),
                ReferralReward::new(0, 1000),
            ),
        }
    }
}

impl fmt::Display for ReferralMilestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferralMilestone {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| DomainError::parse(format!("Unknown referral milestone: {}", s)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralReward {
    pub tickets: u32,
    pub coins: u32,
    pub badge: Option<String>,
    pub avatar: Option<String>,
    pub title: Option<String>,
}

impl ReferralReward {
    fn new(tickets: u32, coins: u32) -> Self {
        Self {
            tickets,
            coins,
            ..Self::default()
        }
    }

    fn with_badge(mut self, badge: &str) -> Self {
        self.badge = Some(badge.to_string());
        self
    }

    fn with_avatar(mut self, avatar: &str) -> Self {
        self.avatar = Some(avatar.to_string());
        self
    }

    fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// Which side of the referral is claiming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferralSide {
    Inviter,
    Invitee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    id: ReferralId,
    inviter_id: UserId,
    invitee_id: UserId,
    reached: Vec<ReferralMilestone>,
    inviter_claimed: Vec<ReferralMilestone>,
    invitee_claimed: Vec<ReferralMilestone>,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Referral {
    /// Registration counts as the first milestone.
    pub fn new(inviter_id: UserId, invitee_id: UserId, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if inviter_id.is_nil() || invitee_id.is_nil() {
            return Err(DomainError::invalid_id("referral users must not be nil"));
        }
        if inviter_id == invitee_id {
            return Err(DomainError::SelfReferral);
        }

        let mut referral = Self {
            id: ReferralId::new(),
            inviter_id,
            invitee_id,
            reached: Vec::new(),
            inviter_claimed: Vec::new(),
            invitee_claimed: Vec::new(),
            created_at,
            events: Vec::new(),
        };
        referral.events.push(
            ReferralEvent::Created {
                referral_id: referral.id,
                inviter_id,
                invitee_id,
                occurred_at: created_at,
            }
            .into(),
        );
        referral.reach(ReferralMilestone::Registered, created_at);
        Ok(referral)
    }

    #[inline]
    pub fn id(&self) -> ReferralId {
        self.id
    }

    #[inline]
    pub fn inviter_id(&self) -> UserId {
        self.inviter_id
    }

    #[inline]
    pub fn invitee_id(&self) -> UserId {
        self.invitee_id
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_reached(&self, milestone: ReferralMilestone) -> bool {
        self.reached.contains(&milestone)
    }

    pub fn is_claimed(&self, side: ReferralSide, milestone: ReferralMilestone) -> bool {
        self.claimed(side).contains(&milestone)
    }

    /// Reached milestones not yet claimed by `side`, in ladder order.
    pub fn pending_rewards(&self, side: ReferralSide) -> Vec<ReferralMilestone> {
        ReferralMilestone::ALL
            .iter()
            .copied()
            .filter(|m| self.is_reached(*m) && !self.is_claimed(side, *m))
            .collect()
    }

    /// Record the invitee's progress; returns milestones newly reached.
    pub fn update_progress(
        &mut self,
        duels_played: u32,
        current_league: League,
        updated_at: DateTime<Utc>,
    ) -> Vec<ReferralMilestone> {
        let checks = [
            (ReferralMilestone::PlayedFiveDuels, duels_played >= DUELS_FOR_MILESTONE),
            (ReferralMilestone::ReachedSilver, current_league >= League::Silver),
            (ReferralMilestone::ReachedGold, current_league >= League::Gold),
            (ReferralMilestone::ReachedPlatinum, current_league >= League::Platinum),
        ];

        let mut newly = Vec::new();
        for (milestone, met) in checks {
            if met && !self.is_reached(milestone) {
                self.reach(milestone, updated_at);
                newly.push(milestone);
            }
        }
        newly
    }

    pub fn claim_reward(
        &mut self,
        side: ReferralSide,
        milestone: ReferralMilestone,
        claimed_at: DateTime<Utc>,
    ) -> Result<ReferralReward, DomainError> {
        if !self.is_reached(milestone) {
            return Err(DomainError::MilestoneNotReached(milestone.to_string()));
        }
        if self.is_claimed(side, milestone) {
            return Err(DomainError::RewardAlreadyClaimed(milestone.to_string()));
        }

        let (inviter_reward, invitee_reward) = milestone.rewards();
        let (claimant, reward) = match side {
            ReferralSide::Inviter => {
                self.inviter_claimed.push(milestone);
                (self.inviter_id, inviter_reward)
            }
            ReferralSide::Invitee => {
                self.invitee_claimed.push(milestone);
                (self.invitee_id, invitee_reward)
            }
        };

        self.events.push(
            ReferralEvent::RewardClaimed {
                referral_id: self.id,
                user_id: claimant,
                milestone,
                occurred_at: claimed_at,
            }
            .into(),
        );
        Ok(reward)
    }

    pub fn claim_inviter_reward(
        &mut self,
        milestone: ReferralMilestone,
        claimed_at: DateTime<Utc>,
    ) -> Result<ReferralReward, DomainError> {
        self.claim_reward(ReferralSide::Inviter, milestone, claimed_at)
    }

    pub fn claim_invitee_reward(
        &mut self,
        milestone: ReferralMilestone,
        claimed_at: DateTime<Utc>,
    ) -> Result<ReferralReward, DomainError> {
        self.claim_reward(ReferralSide::Invitee, milestone, claimed_at)
    }

    fn claimed(&self, side: ReferralSide) -> &[ReferralMilestone] {
        match side {
            ReferralSide::Inviter => &self.inviter_claimed,
            ReferralSide::Invitee => &self.invitee_claimed,
        }
    }

    fn reach(&mut self, milestone: ReferralMilestone, at: DateTime<Utc>) {
        self.reached.push(milestone);
        self.events.push(
            ReferralEvent::MilestoneReached {
                referral_id: self.id,
                inviter_id: self.inviter_id,
                invitee_id: self.invitee_id,
                milestone,
                occurred_at: at,
            }
            .into(),
        );
    }
}

impl EventSource for Referral {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)
    }

    fn referral() -> Referral {
        Referral::new(UserId::new(), UserId::new(), now()).unwrap()
    }

    #[test]
    fn creation_reaches_registered() {
        let mut r = referral();
        assert!(r.is_reached(ReferralMilestone::Registered));
        let types: Vec<_> = r.take_events().iter().map(DomainEvent::event_type).collect();
        assert_eq!(types, vec!["referral.created", "referral.milestone_reached"]);
    }

    #[test]
    fn self_referral_is_rejected() {
        let me = UserId::new();
        assert_eq!(Referral::new(me, me, now()).unwrap_err(), DomainError::SelfReferral);
    }

    #[test]
    fn progress_sets_each_flag_once() {
        let mut r = referral();
        assert!(r.update_progress(2, League::Bronze, now()).is_empty());
        assert_eq!(
            r.update_progress(5, League::Gold, now()),
            vec![
                ReferralMilestone::PlayedFiveDuels,
                ReferralMilestone::ReachedSilver,
                ReferralMilestone::ReachedGold
            ]
        );
        assert!(r.update_progress(9, League::Gold, now()).is_empty());
        assert!(!r.is_reached(ReferralMilestone::ReachedPlatinum));
    }

    #[test]
    fn claims_check_reached_then_claimed() {
        let mut r = referral();
        assert_eq!(
            r.claim_inviter_reward(ReferralMilestone::ReachedGold, now()).unwrap_err(),
            DomainError::MilestoneNotReached("reached_gold".into())
        );

        let reward = r.claim_inviter_reward(ReferralMilestone::Registered, now()).unwrap();
        assert_eq!((reward.tickets, reward.coins), (3, 100));
        assert_eq!(
            r.claim_inviter_reward(ReferralMilestone::Registered, now()).unwrap_err(),
            DomainError::RewardAlreadyClaimed("registered".into())
        );
        // each side claims independently
        assert!(r.claim_invitee_reward(ReferralMilestone::Registered, now()).is_ok());
    }

    #[test]
    fn reward_table_extras() {
        let (inviter, invitee) = ReferralMilestone::ReachedSilver.rewards();
        assert_eq!(inviter.badge.as_deref(), Some("mentor"));
        assert_eq!((invitee.tickets, invitee.coins), (0, 300));
        let (inviter, _) = ReferralMilestone::ReachedPlatinum.rewards();
        assert_eq!((inviter.tickets, inviter.coins), (50, 3000));
        assert!(inviter.title.is_some());
    }

    #[test]
    fn pending_rewards_per_side() {
        let mut r = referral();
        r.update_progress(5, League::Bronze, now());
        r.claim_invitee_reward(ReferralMilestone::Registered, now()).unwrap();
        assert_eq!(
            r.pending_rewards(ReferralSide::Invitee),
            vec![ReferralMilestone::PlayedFiveDuels]
        );
        assert_eq!(r.pending_rewards(ReferralSide::Inviter).len(), 2);
    }

    #[test]
    fn milestone_names_round_trip() {
        for m in ReferralMilestone::ALL {
            assert_eq!(m.as_str().parse::<ReferralMilestone>().unwrap(), m);
            assert_eq!(serde_json::to_string(&m).unwrap(), format!("\"{}\"", m.as_str()));
        }
    }

    #[test]
    fn stored_referral_round_trips() {
        let mut r = referral();
        r.update_progress(5, League::Silver, now());
        r.claim_inviter_reward(ReferralMilestone::Registered, now()).unwrap();
        r.take_events();

        let mut back: Referral = serde_json::from_str(&serde_json::to_string(&r).unwrap()).unwrap();
        assert_eq!(back, r);
        assert!(back.is_reached(ReferralMilestone::ReachedSilver));
        assert_eq!(
            back.claim_inviter_reward(ReferralMilestone::Registered, now()).unwrap_err(),
            DomainError::RewardAlreadyClaimed("registered".into())
        );
    }
}
