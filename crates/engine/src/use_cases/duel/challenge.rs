//! Friend challenges, rematches and who is around to play.

use std::sync::Arc;

use quizsprint_domain::modes::duel::DuelChallenge;
use quizsprint_domain::{ChallengeId, DomainError, DuelGameId, EventSource, Lifecycle, UserId};

use super::{load_game, DuelError, DuelMatch, DuelSeat, DuelStarter};
use crate::infrastructure::ports::{ChallengeRepo, ClockPort, DuelGameRepo, EventBus, MatchmakingQueue, OnlineTracker};
use crate::use_cases::publish;

/// Name used for a challenger the presence tracker no longer knows.
const UNKNOWN_PLAYER_NAME: &str = "Player";

// =============================================================================
// Sending
// =============================================================================

pub struct SendDirectChallenge {
    challenges: Arc<dyn ChallengeRepo>,
    games: Arc<dyn DuelGameRepo>,
    queue: Arc<dyn MatchmakingQueue>,
    presence: Arc<dyn OnlineTracker>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl SendDirectChallenge {
    pub fn new(
        challenges: Arc<dyn ChallengeRepo>,
        games: Arc<dyn DuelGameRepo>,
        queue: Arc<dyn MatchmakingQueue>,
        presence: Arc<dyn OnlineTracker>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            challenges,
            games,
            queue,
            presence,
            events,
            clock,
        }
    }

    /// Challenge a friend. An open challenge to the same friend is returned
    /// as is. Offline friends get the longer push deadline.
    pub async fn execute(&self, challenger_id: UserId, challenged_id: UserId) -> Result<DuelChallenge, DuelError> {
        if challenger_id == challenged_id {
            return Err(DomainError::CannotChallengeSelf.into());
        }
        if self.games.find_active_by_player(challenger_id).await?.is_some() {
            return Err(DomainError::AlreadyInGame.into());
        }
        if self.is_busy(challenged_id).await? {
            return Err(DomainError::FriendBusy(challenged_id).into());
        }

        let now = self.clock.now();
        if let Some(mut open) = self.challenges.find_pending_between(challenger_id, challenged_id).await? {
            if !open.is_expired(now) {
                return Ok(open);
            }
            open.expire(now)?;
            self.challenges.save(&open).await?;
            publish(self.events.as_ref(), open.take_events()).await;
        }

        let mut challenge = DuelChallenge::direct(challenger_id, challenged_id, now)?;
        if !self.presence.is_online(challenged_id, now).await {
            challenge.extend_for_push()?;
        }
        self.challenges.save(&challenge).await?;
        publish(self.events.as_ref(), challenge.take_events()).await;

        tracing::info!(
            challenge_id = %challenge.id(),
            %challenger_id,
            %challenged_id,
            expires_at = %challenge.expires_at(),
            "Challenge sent"
        );
        Ok(challenge)
    }

    async fn is_busy(&self, player_id: UserId) -> Result<bool, DuelError> {
        if self.presence.in_match(player_id).await.is_some() || self.queue.contains(player_id).await? {
            return Ok(true);
        }
        Ok(self.games.find_active_by_player(player_id).await?.is_some())
    }
}

pub struct CreateLinkChallenge {
    challenges: Arc<dyn ChallengeRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl CreateLinkChallenge {
    pub fn new(challenges: Arc<dyn ChallengeRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            challenges,
            events,
            clock,
        }
    }

    pub async fn execute(&self, challenger_id: UserId) -> Result<DuelChallenge, DuelError> {
        let mut challenge = DuelChallenge::link(challenger_id, self.clock.now())?;
        self.challenges.save(&challenge).await?;
        publish(self.events.as_ref(), challenge.take_events()).await;

        tracing::info!(challenge_id = %challenge.id(), %challenger_id, "Challenge link created");
        Ok(challenge)
    }
}

// =============================================================================
// Responding
// =============================================================================

/// How a responder names the challenge: by id, or by the code in a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeRef {
    Id(ChallengeId),
    Code(String),
}

#[derive(Debug, Clone)]
pub struct ChallengeResponse {
    pub challenge: DuelChallenge,
    /// Started when the challenge was accepted
    pub duel: Option<DuelMatch>,
}

pub struct RespondToChallenge {
    challenges: Arc<dyn ChallengeRepo>,
    games: Arc<dyn DuelGameRepo>,
    queue: Arc<dyn MatchmakingQueue>,
    presence: Arc<dyn OnlineTracker>,
    starter: Arc<DuelStarter>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl RespondToChallenge {
    pub fn new(
        challenges: Arc<dyn ChallengeRepo>,
        games: Arc<dyn DuelGameRepo>,
        queue: Arc<dyn MatchmakingQueue>,
        presence: Arc<dyn OnlineTracker>,
        starter: Arc<DuelStarter>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            challenges,
            games,
            queue,
            presence,
            starter,
            events,
            clock,
        }
    }

    /// Accept or decline. Accepting starts the duel straight away. A
    /// challenge found past its deadline is expired and saved before
    /// `ChallengeExpired` is returned.
    pub async fn execute(
        &self,
        responder_id: UserId,
        responder_name: &str,
        target: ChallengeRef,
        accept: bool,
    ) -> Result<ChallengeResponse, DuelError> {
        let mut challenge = self.load(&target).await?;
        let now = self.clock.now();

        let responded = if accept {
            challenge.accept(responder_id, now)
        } else {
            challenge.decline(responder_id, now)
        };
        if let Err(e) = responded {
            if matches!(e, DomainError::ChallengeExpired) {
                self.challenges.save(&challenge).await?;
                publish(self.events.as_ref(), challenge.take_events()).await;
            }
            return Err(e.into());
        }

        if !accept {
            self.challenges.save(&challenge).await?;
            publish(self.events.as_ref(), challenge.take_events()).await;
            tracing::info!(challenge_id = %challenge.id(), %responder_id, "Challenge declined");
            return Ok(ChallengeResponse { challenge, duel: None });
        }

        let challenger_id = challenge.challenger_id();
        if self.games.find_active_by_player(responder_id).await?.is_some() {
            return Err(DomainError::AlreadyInGame.into());
        }
        if self.games.find_active_by_player(challenger_id).await?.is_some() {
            return Err(DomainError::FriendBusy(challenger_id).into());
        }

        self.presence.touch(responder_id, responder_name, now).await;
        let challenger_name = self
            .presence
            .presence(challenger_id)
            .await
            .map(|p| p.username)
            .unwrap_or_else(|| UNKNOWN_PLAYER_NAME.to_string());
        for id in [challenger_id, responder_id] {
            self.queue.remove(id).await?;
        }

        let duel = self
            .starter
            .start(
                DuelSeat::new(challenger_id, challenger_name),
                DuelSeat::new(responder_id, responder_name),
                now,
            )
            .await?;
        challenge.attach_match(duel.game.id());
        self.challenges.save(&challenge).await?;
        publish(self.events.as_ref(), challenge.take_events()).await;

        tracing::info!(
            challenge_id = %challenge.id(),
            %challenger_id,
            %responder_id,
            game_id = %duel.game.id(),
            "Challenge accepted"
        );
        Ok(ChallengeResponse {
            challenge,
            duel: Some(duel),
        })
    }

    async fn load(&self, target: &ChallengeRef) -> Result<DuelChallenge, DuelError> {
        let found = match target {
            ChallengeRef::Id(id) => self.challenges.get(*id).await?,
            ChallengeRef::Code(code) => self.challenges.find_pending_by_code(code).await?,
        };
        found.ok_or_else(|| {
            DuelError::ChallengeNotFound(match target {
                ChallengeRef::Id(id) => id.to_string(),
                ChallengeRef::Code(code) => code.clone(),
            })
        })
    }
}

// =============================================================================
// Expiry
// =============================================================================

pub struct ExpireChallenges {
    challenges: Arc<dyn ChallengeRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl ExpireChallenges {
    pub fn new(challenges: Arc<dyn ChallengeRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            challenges,
            events,
            clock,
        }
    }

    /// Expire every pending challenge past its deadline. Returns how many.
    pub async fn execute(&self) -> Result<usize, DuelError> {
        let now = self.clock.now();
        let stale = self.challenges.find_expired_pending(now).await?;
        let count = stale.len();

        for mut challenge in stale {
            challenge.expire(now)?;
            self.challenges.save(&challenge).await?;
            publish(self.events.as_ref(), challenge.take_events()).await;
        }

        if count > 0 {
            tracing::info!(count, "Expired stale challenges");
        }
        Ok(count)
    }
}

// =============================================================================
// Rematch
// =============================================================================

#[derive(Debug, Clone)]
pub enum Rematch {
    /// Waiting for the opponent to accept
    Requested(DuelChallenge),
    /// The opponent had already asked; their challenge was accepted
    Started(ChallengeResponse),
}

pub struct RequestRematch {
    games: Arc<dyn DuelGameRepo>,
    challenges: Arc<dyn ChallengeRepo>,
    send: Arc<SendDirectChallenge>,
    respond: Arc<RespondToChallenge>,
    clock: Arc<dyn ClockPort>,
}

impl RequestRematch {
    pub fn new(
        games: Arc<dyn DuelGameRepo>,
        challenges: Arc<dyn ChallengeRepo>,
        send: Arc<SendDirectChallenge>,
        respond: Arc<RespondToChallenge>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            games,
            challenges,
            send,
            respond,
            clock,
        }
    }

    /// Ask the opponent of a finished duel for another round. If they asked
    /// first, their request is accepted and the new duel starts.
    pub async fn execute(
        &self,
        requester_id: UserId,
        requester_name: &str,
        game_id: DuelGameId,
    ) -> Result<Rematch, DuelError> {
        let game = load_game(self.games.as_ref(), game_id).await?;
        let opponent_id = game
            .opponent_of(requester_id)
            .map(|p| p.user_id())
            .ok_or(DuelError::NotParticipant(requester_id))?;
        if !game.status().is_terminal() {
            return Err(DomainError::InvalidStateTransition("rematch needs a finished duel".into()).into());
        }

        let now = self.clock.now();
        if let Some(theirs) = self.challenges.find_pending_between(opponent_id, requester_id).await? {
            if !theirs.is_expired(now) {
                tracing::debug!(%game_id, %requester_id, "Accepting opponent's rematch");
                let response = self
                    .respond
                    .execute(requester_id, requester_name, ChallengeRef::Id(theirs.id()), true)
                    .await?;
                return Ok(Rematch::Started(response));
            }
        }

        let challenge = self.send.execute(requester_id, opponent_id).await?;
        Ok(Rematch::Requested(challenge))
    }
}

// =============================================================================
// Friends
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineFriend {
    pub user_id: UserId,
    pub username: String,
    /// Duel the friend is playing; busy friends cannot be challenged
    pub in_match: Option<DuelGameId>,
}

pub struct GetOnlineFriends {
    presence: Arc<dyn OnlineTracker>,
    clock: Arc<dyn ClockPort>,
}

impl GetOnlineFriends {
    pub fn new(presence: Arc<dyn OnlineTracker>, clock: Arc<dyn ClockPort>) -> Self {
        Self { presence, clock }
    }

    /// Friends seen recently, in the order given.
    pub async fn execute(&self, friend_ids: &[UserId]) -> Result<Vec<OnlineFriend>, DuelError> {
        let online = self.presence.online_among(friend_ids, self.clock.now()).await;
        let mut friends = Vec::with_capacity(online.len());
        for user_id in online {
            if let Some(p) = self.presence.presence(user_id).await {
                friends.push(OnlineFriend {
                    user_id,
                    username: p.username,
                    in_match: p.in_match,
                });
            }
        }
        Ok(friends)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::infrastructure::clock::{FixedRandom, SteppingClock};
    use crate::infrastructure::memory::{
        InMemoryChallenges, InMemoryContent, InMemoryDuelGames, InMemoryEventBus, InMemoryMatchmakingQueue,
        InMemoryOnlineTracker, InMemoryRatings, InMemorySeasons,
    };
    use crate::infrastructure::ports::{QueuedPlayer, QuestionRepo};
    use crate::test_fixtures::{now, question};
    use crate::use_cases::content::QuestionSelector;
    use crate::use_cases::duel::SeasonalRatings;
    use quizsprint_domain::modes::duel::{ChallengeStatus, DuelStatus};
    use quizsprint_domain::rating::Mmr;

    struct Friends {
        challenges: Arc<InMemoryChallenges>,
        games: Arc<InMemoryDuelGames>,
        queue: Arc<InMemoryMatchmakingQueue>,
        presence: Arc<InMemoryOnlineTracker>,
        bus: Arc<InMemoryEventBus>,
        clock: Arc<SteppingClock>,
        send: Arc<SendDirectChallenge>,
        link: CreateLinkChallenge,
        respond: Arc<RespondToChallenge>,
        expire: ExpireChallenges,
        rematch: RequestRematch,
        online: GetOnlineFriends,
        ana: UserId,
        bo: UserId,
    }

    async fn friends() -> Friends {
        let content = Arc::new(InMemoryContent::new());
        for _ in 0..10 {
            content.save(&question(100)).await.unwrap();
        }
        let challenges = Arc::new(InMemoryChallenges::new());
        let games = Arc::new(InMemoryDuelGames::new());
        let queue = Arc::new(InMemoryMatchmakingQueue::new());
        let presence = Arc::new(InMemoryOnlineTracker::new(std::time::Duration::from_secs(60)));
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(SteppingClock::new(now()));
        let starter = Arc::new(DuelStarter::new(
            games.clone(),
            Arc::new(SeasonalRatings::new(
                Arc::new(InMemoryRatings::new()),
                Arc::new(InMemorySeasons::new()),
                bus.clone(),
                "season-1",
            )),
            Arc::new(QuestionSelector::new(content)),
            presence.clone(),
            bus.clone(),
            Arc::new(FixedRandom(5)),
        ));

        let send = Arc::new(SendDirectChallenge::new(
            challenges.clone(),
            games.clone(),
            queue.clone(),
            presence.clone(),
            bus.clone(),
            clock.clone(),
        ));
        let respond = Arc::new(RespondToChallenge::new(
            challenges.clone(),
            games.clone(),
            queue.clone(),
            presence.clone(),
            starter,
            bus.clone(),
            clock.clone(),
        ));

        let (ana, bo) = (UserId::new(), UserId::new());
        presence.touch(ana, "ana", now()).await;
        presence.touch(bo, "bo", now()).await;

        Friends {
            link: CreateLinkChallenge::new(challenges.clone(), bus.clone(), clock.clone()),
            expire: ExpireChallenges::new(challenges.clone(), bus.clone(), clock.clone()),
            rematch: RequestRematch::new(games.clone(), challenges.clone(), send.clone(), respond.clone(), clock.clone()),
            online: GetOnlineFriends::new(presence.clone(), clock.clone()),
            challenges,
            games,
            queue,
            presence,
            bus,
            clock,
            send,
            respond,
            ana,
            bo,
        }
    }

    mod sending {
        use super::*;

        #[tokio::test]
        async fn online_friend_gets_a_one_minute_challenge() {
            let f = friends().await;
            let challenge = f.send.execute(f.ana, f.bo).await.unwrap();

            assert_eq!(challenge.challenged_id(), Some(f.bo));
            assert_eq!(challenge.expires_at(), now() + Duration::seconds(60));
            assert_eq!(f.bus.event_types().await, vec!["challenge.created"]);
        }

        #[tokio::test]
        async fn offline_friend_gets_the_push_deadline() {
            let f = friends().await;
            let stranger = UserId::new();
            let challenge = f.send.execute(f.ana, stranger).await.unwrap();
            assert_eq!(challenge.expires_at(), now() + Duration::seconds(300));
        }

        #[tokio::test]
        async fn open_challenge_is_reused() {
            let f = friends().await;
            let first = f.send.execute(f.ana, f.bo).await.unwrap();
            let second = f.send.execute(f.ana, f.bo).await.unwrap();
            assert_eq!(first.id(), second.id());
        }

        #[tokio::test]
        async fn queued_friend_is_busy() {
            let f = friends().await;
            f.queue
                .add(QueuedPlayer::new(f.bo, "bo", Mmr::INITIAL, now()))
                .await
                .unwrap();

            let err = f.send.execute(f.ana, f.bo).await.unwrap_err();
            assert!(matches!(err, DuelError::Domain(DomainError::FriendBusy(id)) if id == f.bo));
        }
    }

    mod responding {
        use super::*;

        #[tokio::test]
        async fn accepting_starts_the_duel() {
            let f = friends().await;
            let challenge = f.send.execute(f.ana, f.bo).await.unwrap();

            let response = f
                .respond
                .execute(f.bo, "bo", ChallengeRef::Id(challenge.id()), true)
                .await
                .unwrap();

            let duel = response.duel.unwrap();
            assert_eq!(duel.game.player1().user_id(), f.ana);
            assert_eq!(duel.game.player1().username(), "ana");
            assert_eq!(duel.game.status(), DuelStatus::InProgress);
            let stored = f.challenges.get(challenge.id()).await.unwrap().unwrap();
            assert_eq!(stored.status(), ChallengeStatus::Accepted);
            assert_eq!(stored.match_id(), Some(duel.game.id()));
            assert_eq!(f.presence.in_match(f.bo).await, Some(duel.game.id()));
        }

        #[tokio::test]
        async fn declining_starts_nothing() {
            let f = friends().await;
            let challenge = f.send.execute(f.ana, f.bo).await.unwrap();

            let response = f
                .respond
                .execute(f.bo, "bo", ChallengeRef::Id(challenge.id()), false)
                .await
                .unwrap();

            assert!(response.duel.is_none());
            assert_eq!(response.challenge.status(), ChallengeStatus::Declined);
            assert!(f.games.find_active_by_player(f.ana).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn late_answer_expires_the_challenge() {
            let f = friends().await;
            let challenge = f.send.execute(f.ana, f.bo).await.unwrap();
            f.clock.advance(Duration::seconds(61));

            let err = f
                .respond
                .execute(f.bo, "bo", ChallengeRef::Id(challenge.id()), true)
                .await
                .unwrap_err();

            assert!(matches!(err, DuelError::Domain(DomainError::ChallengeExpired)));
            let stored = f.challenges.get(challenge.id()).await.unwrap().unwrap();
            assert_eq!(stored.status(), ChallengeStatus::Expired);
        }

        #[tokio::test]
        async fn link_is_accepted_by_code() {
            let f = friends().await;
            let challenge = f.link.execute(f.ana).await.unwrap();
            let code = challenge.id().to_string()[..8].to_uppercase();

            let response = f
                .respond
                .execute(f.bo, "bo", ChallengeRef::Code(code), true)
                .await
                .unwrap();
            assert_eq!(response.challenge.challenged_id(), Some(f.bo));
            assert!(response.duel.is_some());
        }

        #[tokio::test]
        async fn unknown_code_is_not_found() {
            let f = friends().await;
            let err = f
                .respond
                .execute(f.bo, "bo", ChallengeRef::Code("deadbeef".into()), true)
                .await
                .unwrap_err();
            assert!(matches!(err, DuelError::ChallengeNotFound(code) if code == "deadbeef"));
        }
    }

    mod sweeping {
        use super::*;

        #[tokio::test]
        async fn only_stale_challenges_expire() {
            let f = friends().await;
            f.send.execute(f.ana, f.bo).await.unwrap();
            f.link.execute(f.bo).await.unwrap();

            assert_eq!(f.expire.execute().await.unwrap(), 0);
            f.clock.advance(Duration::minutes(2));
            assert_eq!(f.expire.execute().await.unwrap(), 1);
            assert_eq!(f.expire.execute().await.unwrap(), 0);
            assert!(f.bus.event_types().await.contains(&"challenge.expired"));
        }
    }

    mod rematch {
        use super::*;

        async fn finished_duel(f: &Friends) -> DuelGameId {
            let challenge = f.send.execute(f.ana, f.bo).await.unwrap();
            let duel = f
                .respond
                .execute(f.bo, "bo", ChallengeRef::Id(challenge.id()), true)
                .await
                .unwrap()
                .duel
                .unwrap();
            let mut game = duel.game;
            game.handle_disconnect(f.ana, now()).unwrap();
            let _ = game.handle_disconnect(f.bo, now());
            f.games.save(&game).await.unwrap();
            for id in [f.ana, f.bo] {
                f.presence.set_in_match(id, None).await;
            }
            game.id()
        }

        #[tokio::test]
        async fn first_request_waits_second_starts() {
            let f = friends().await;
            let game_id = finished_duel(&f).await;

            let Rematch::Requested(asked) = f.rematch.execute(f.ana, "ana", game_id).await.unwrap() else {
                panic!("expected a pending rematch");
            };
            assert_eq!(asked.challenged_id(), Some(f.bo));

            let Rematch::Started(response) = f.rematch.execute(f.bo, "bo", game_id).await.unwrap() else {
                panic!("expected the rematch to start");
            };
            assert_eq!(response.challenge.id(), asked.id());
            assert!(response.duel.is_some());
        }

        #[tokio::test]
        async fn running_duel_cannot_be_rematched() {
            let f = friends().await;
            let challenge = f.send.execute(f.ana, f.bo).await.unwrap();
            let duel = f
                .respond
                .execute(f.bo, "bo", ChallengeRef::Id(challenge.id()), true)
                .await
                .unwrap()
                .duel
                .unwrap();

            let err = f.rematch.execute(f.ana, "ana", duel.game.id()).await.unwrap_err();
            assert!(matches!(err, DuelError::Domain(DomainError::InvalidStateTransition(_))));

            let err = f.rematch.execute(UserId::new(), "eve", duel.game.id()).await.unwrap_err();
            assert!(matches!(err, DuelError::NotParticipant(_)));
        }
    }

    mod presence {
        use super::*;

        #[tokio::test]
        async fn lists_online_friends_with_match_state() {
            let f = friends().await;
            let game_id = DuelGameId::new();
            f.presence.set_in_match(f.bo, Some(game_id)).await;

            let online = f.online.execute(&[f.bo, UserId::new(), f.ana]).await.unwrap();
            assert_eq!(
                online.iter().map(|o| (o.user_id, o.in_match)).collect::<Vec<_>>(),
                vec![(f.bo, Some(game_id)), (f.ana, None)]
            );
            assert_eq!(online[0].username, "bo");
        }
    }
}
