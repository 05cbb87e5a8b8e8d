//! Referral use cases.
//!
//! An inviter brings in a new player; both sides earn rewards as the invitee
//! plays duels and climbs leagues. Progress is driven by the duel flow.

use std::sync::Arc;

use quizsprint_domain::modes::duel::{Referral, ReferralMilestone, ReferralReward, ReferralSide};
use quizsprint_domain::rating::League;
use quizsprint_domain::{DomainError, EventSource, ReferralId, UserId};

use crate::infrastructure::ports::{ClockPort, EventBus, ReferralRepo, RepoError};
use crate::use_cases::publish;

/// Container for referral use cases.
pub struct ReferralUseCases {
    pub create: Arc<CreateReferral>,
    pub update_progress: Arc<UpdateReferralProgress>,
    pub claim_reward: Arc<ClaimReferralReward>,
    pub pending_rewards: Arc<ListPendingReferralRewards>,
}

impl ReferralUseCases {
    pub fn new(
        create: Arc<CreateReferral>,
        update_progress: Arc<UpdateReferralProgress>,
        claim_reward: Arc<ClaimReferralReward>,
        pending_rewards: Arc<ListPendingReferralRewards>,
    ) -> Self {
        Self {
            create,
            update_progress,
            claim_reward,
            pending_rewards,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReferralError {
    #[error("Referral not found: {0}")]
    ReferralNotFound(ReferralId),
    #[error("User {0} is not part of this referral")]
    NotParticipant(UserId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

// =============================================================================
// Create
// =============================================================================

pub struct CreateReferral {
    referrals: Arc<dyn ReferralRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl CreateReferral {
    pub fn new(referrals: Arc<dyn ReferralRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            referrals,
            events,
            clock,
        }
    }

    /// A player can be referred once. Registration is the first milestone.
    pub async fn execute(&self, inviter_id: UserId, invitee_id: UserId) -> Result<Referral, ReferralError> {
        if self.referrals.find_by_invitee(invitee_id).await?.is_some() {
            return Err(DomainError::AlreadyReferred.into());
        }

        let mut referral = Referral::new(inviter_id, invitee_id, self.clock.now())?;
        match self.referrals.save(&referral).await {
            Ok(()) => {}
            Err(RepoError::ConstraintViolation(_)) => return Err(DomainError::AlreadyReferred.into()),
            Err(e) => return Err(e.into()),
        }
        publish(self.events.as_ref(), referral.take_events()).await;

        tracing::info!(referral_id = %referral.id(), %inviter_id, %invitee_id, "Referral created");
        Ok(referral)
    }
}

// =============================================================================
// Progress
// =============================================================================

pub struct UpdateReferralProgress {
    referrals: Arc<dyn ReferralRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl UpdateReferralProgress {
    pub fn new(referrals: Arc<dyn ReferralRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            referrals,
            events,
            clock,
        }
    }

    /// Record the invitee's duel count and league. Returns milestones newly
    /// reached; a player nobody referred gets an empty list.
    pub async fn execute(
        &self,
        invitee_id: UserId,
        duels_played: u32,
        league: League,
    ) -> Result<Vec<ReferralMilestone>, ReferralError> {
        let Some(mut referral) = self.referrals.find_by_invitee(invitee_id).await? else {
            return Ok(Vec::new());
        };

        let reached = referral.update_progress(duels_played, league, self.clock.now());
        if reached.is_empty() {
            return Ok(reached);
        }

        self.referrals.save(&referral).await?;
        publish(self.events.as_ref(), referral.take_events()).await;

        tracing::info!(
            referral_id = %referral.id(),
            %invitee_id,
            milestones = ?reached,
            "Referral milestones reached"
        );
        Ok(reached)
    }
}

// =============================================================================
// Rewards
// =============================================================================

pub struct ClaimReferralReward {
    referrals: Arc<dyn ReferralRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl ClaimReferralReward {
    pub fn new(referrals: Arc<dyn ReferralRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            referrals,
            events,
            clock,
        }
    }

    /// The claimant's side is derived from who they are in the referral.
    pub async fn execute(
        &self,
        referral_id: ReferralId,
        claimant_id: UserId,
        milestone: ReferralMilestone,
    ) -> Result<ReferralReward, ReferralError> {
        let mut referral = self
            .referrals
            .get(referral_id)
            .await?
            .ok_or(ReferralError::ReferralNotFound(referral_id))?;

        let side = side_of(&referral, claimant_id).ok_or(ReferralError::NotParticipant(claimant_id))?;
        let reward = referral.claim_reward(side, milestone, self.clock.now())?;

        self.referrals.save(&referral).await?;
        publish(self.events.as_ref(), referral.take_events()).await;

        tracing::info!(%referral_id, %claimant_id, ?side, %milestone, "Referral reward claimed");
        Ok(reward)
    }
}

fn side_of(referral: &Referral, user_id: UserId) -> Option<ReferralSide> {
    if referral.inviter_id() == user_id {
        Some(ReferralSide::Inviter)
    } else if referral.invitee_id() == user_id {
        Some(ReferralSide::Invitee)
    } else {
        None
    }
}

/// A reached milestone the user has not claimed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReferralReward {
    pub referral_id: ReferralId,
    pub side: ReferralSide,
    pub milestone: ReferralMilestone,
    pub reward: ReferralReward,
}

pub struct ListPendingReferralRewards {
    referrals: Arc<dyn ReferralRepo>,
}

impl ListPendingReferralRewards {
    pub fn new(referrals: Arc<dyn ReferralRepo>) -> Self {
        Self { referrals }
    }

    /// Rewards as inviter first (oldest referral first), then as invitee.
    pub async fn execute(&self, user_id: UserId) -> Result<Vec<PendingReferralReward>, ReferralError> {
        let mut referrals: Vec<(ReferralSide, Referral)> = self
            .referrals
            .list_by_inviter(user_id)
            .await?
            .into_iter()
            .map(|r| (ReferralSide::Inviter, r))
            .collect();
        if let Some(own) = self.referrals.find_by_invitee(user_id).await? {
            referrals.push((ReferralSide::Invitee, own));
        }

        Ok(referrals
            .iter()
            .flat_map(|(side, referral)| {
                referral.pending_rewards(*side).into_iter().map(move |milestone| {
                    let (inviter, invitee) = milestone.rewards();
                    PendingReferralReward {
                        referral_id: referral.id(),
                        side: *side,
                        milestone,
                        reward: match side {
                            ReferralSide::Inviter => inviter,
                            ReferralSide::Invitee => invitee,
                        },
                    }
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory::{InMemoryEventBus, InMemoryReferrals};
    use crate::infrastructure::ports::MockReferralRepo;
    use crate::test_fixtures::now;

    struct Fixture {
        referrals: Arc<InMemoryReferrals>,
        bus: Arc<InMemoryEventBus>,
        create: CreateReferral,
        progress: UpdateReferralProgress,
        claim: ClaimReferralReward,
        pending: ListPendingReferralRewards,
    }

    fn fixture() -> Fixture {
        let referrals = Arc::new(InMemoryReferrals::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(FixedClock(now()));
        Fixture {
            create: CreateReferral::new(referrals.clone(), bus.clone(), clock.clone()),
            progress: UpdateReferralProgress::new(referrals.clone(), bus.clone(), clock.clone()),
            claim: ClaimReferralReward::new(referrals.clone(), bus.clone(), clock),
            pending: ListPendingReferralRewards::new(referrals.clone()),
            referrals,
            bus,
        }
    }

    mod create {
        use super::*;

        #[tokio::test]
        async fn registration_is_reached_on_creation() {
            let f = fixture();
            let (inviter, invitee) = (UserId::new(), UserId::new());

            let referral = f.create.execute(inviter, invitee).await.unwrap();

            assert!(referral.is_reached(ReferralMilestone::Registered));
            assert!(f.referrals.find_by_invitee(invitee).await.unwrap().is_some());
            assert_eq!(
                f.bus.event_types().await,
                vec!["referral.created", "referral.milestone_reached"]
            );
        }

        #[tokio::test]
        async fn invitee_can_only_be_referred_once() {
            let f = fixture();
            let invitee = UserId::new();
            f.create.execute(UserId::new(), invitee).await.unwrap();

            let err = f.create.execute(UserId::new(), invitee).await.unwrap_err();
            assert!(matches!(err, ReferralError::Domain(DomainError::AlreadyReferred)));
        }

        #[tokio::test]
        async fn self_referral_is_rejected() {
            let f = fixture();
            let user = UserId::new();
            let err = f.create.execute(user, user).await.unwrap_err();
            assert!(matches!(err, ReferralError::Domain(DomainError::SelfReferral)));
        }
    }

    mod progress {
        use super::*;

        #[tokio::test]
        async fn unreferred_player_is_a_no_op() {
            let invitee = UserId::new();
            let mut repo = MockReferralRepo::new();
            repo.expect_find_by_invitee()
                .with(eq(invitee))
                .returning(|_| Ok(None));
            repo.expect_save().never();

            let progress = UpdateReferralProgress::new(
                Arc::new(repo),
                Arc::new(InMemoryEventBus::new()),
                Arc::new(FixedClock(now())),
            );
            assert!(progress.execute(invitee, 12, League::Gold).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn reaches_duel_and_league_milestones_once() {
            let f = fixture();
            let invitee = UserId::new();
            f.create.execute(UserId::new(), invitee).await.unwrap();

            assert!(f.progress.execute(invitee, 4, League::Bronze).await.unwrap().is_empty());
            let reached = f.progress.execute(invitee, 5, League::Silver).await.unwrap();
            assert_eq!(
                reached,
                vec![ReferralMilestone::PlayedFiveDuels, ReferralMilestone::ReachedSilver]
            );
            assert!(f.progress.execute(invitee, 6, League::Silver).await.unwrap().is_empty());
        }
    }

    mod rewards {
        use super::*;

        #[tokio::test]
        async fn each_side_claims_its_own_reward_once() {
            let f = fixture();
            let (inviter, invitee) = (UserId::new(), UserId::new());
            let referral = f.create.execute(inviter, invitee).await.unwrap();
            f.progress.execute(invitee, 5, League::Bronze).await.unwrap();

            let inviter_reward = f
                .claim
                .execute(referral.id(), inviter, ReferralMilestone::PlayedFiveDuels)
                .await
                .unwrap();
            let invitee_reward = f
                .claim
                .execute(referral.id(), invitee, ReferralMilestone::PlayedFiveDuels)
                .await
                .unwrap();
            assert_eq!((inviter_reward.tickets, inviter_reward.coins), (5, 300));
            assert_eq!((invitee_reward.tickets, invitee_reward.coins), (0, 200));

            let err = f
                .claim
                .execute(referral.id(), inviter, ReferralMilestone::PlayedFiveDuels)
                .await
                .unwrap_err();
            assert!(matches!(err, ReferralError::Domain(DomainError::RewardAlreadyClaimed(_))));
        }

        #[tokio::test]
        async fn outsiders_and_unreached_milestones_are_rejected() {
            let f = fixture();
            let (inviter, invitee) = (UserId::new(), UserId::new());
            let referral = f.create.execute(inviter, invitee).await.unwrap();

            let stranger = UserId::new();
            let err = f
                .claim
                .execute(referral.id(), stranger, ReferralMilestone::Registered)
                .await
                .unwrap_err();
            assert!(matches!(err, ReferralError::NotParticipant(id) if id == stranger));

            let err = f
                .claim
                .execute(referral.id(), inviter, ReferralMilestone::ReachedGold)
                .await
                .unwrap_err();
            assert!(matches!(err, ReferralError::Domain(DomainError::MilestoneNotReached(_))));
        }

        #[tokio::test]
        async fn pending_lists_both_sides() {
            let f = fixture();
            let (inviter, user, friend) = (UserId::new(), UserId::new(), UserId::new());
            f.create.execute(inviter, user).await.unwrap();
            let invited = f.create.execute(user, friend).await.unwrap();
            f.claim
                .execute(invited.id(), user, ReferralMilestone::Registered)
                .await
                .unwrap();
            f.progress.execute(friend, 5, League::Bronze).await.unwrap();

            let pending = f.pending.execute(user).await.unwrap();
            let summary: Vec<_> = pending.iter().map(|p| (p.side, p.milestone)).collect();
            assert_eq!(
                summary,
                vec![
                    (ReferralSide::Inviter, ReferralMilestone::PlayedFiveDuels),
                    (ReferralSide::Invitee, ReferralMilestone::Registered),
                ]
            );
            assert_eq!(pending[1].reward.coins, 100);
        }
    }
}
