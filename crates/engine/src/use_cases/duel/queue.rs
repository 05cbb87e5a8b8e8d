//! Matchmaking: joining the queue and polling for an opponent.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use quizsprint_domain::content::Question;
use quizsprint_domain::rating::{search_window, Mmr, Rank};
use quizsprint_domain::{DomainError, DuelGameId, UserId};

use super::{current_question, DuelError, DuelSeat, DuelStarter, SeasonalRatings};
use crate::infrastructure::ports::{ClockPort, DuelGameRepo, MatchmakingQueue, OnlineTracker, QueuedPlayer, QuestionRepo};

/// What a player learns on entering the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueTicket {
    pub mmr: Mmr,
    pub rank: Rank,
    pub joined_at: DateTime<Utc>,
    /// Players waiting, this one included
    pub queue_size: usize,
}

pub struct JoinQueue {
    queue: Arc<dyn MatchmakingQueue>,
    games: Arc<dyn DuelGameRepo>,
    ratings: Arc<SeasonalRatings>,
    presence: Arc<dyn OnlineTracker>,
    clock: Arc<dyn ClockPort>,
}

impl JoinQueue {
    pub fn new(
        queue: Arc<dyn MatchmakingQueue>,
        games: Arc<dyn DuelGameRepo>,
        ratings: Arc<SeasonalRatings>,
        presence: Arc<dyn OnlineTracker>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            queue,
            games,
            ratings,
            presence,
            clock,
        }
    }

    pub async fn execute(&self, player_id: UserId, username: &str) -> Result<QueueTicket, DuelError> {
        if self.queue.contains(player_id).await? {
            return Err(DomainError::AlreadyInQueue.into());
        }
        if self.games.find_active_by_player(player_id).await?.is_some() {
            return Err(DomainError::AlreadyInGame.into());
        }

        let now = self.clock.now();
        let rating = self.ratings.load_current(player_id, now).await?;
        self.presence.touch(player_id, username, now).await;

        if !self
            .queue
            .add(QueuedPlayer::new(player_id, username, rating.mmr(), now))
            .await?
        {
            return Err(DomainError::AlreadyInQueue.into());
        }
        let queue_size = self.queue.len().await?;

        tracing::info!(%player_id, mmr = rating.mmr().value(), queue_size, "Joined matchmaking");
        Ok(QueueTicket {
            mmr: rating.mmr(),
            rank: rating.rank(),
            joined_at: now,
            queue_size,
        })
    }
}

pub struct LeaveQueue {
    queue: Arc<dyn MatchmakingQueue>,
}

impl LeaveQueue {
    pub fn new(queue: Arc<dyn MatchmakingQueue>) -> Self {
        Self { queue }
    }

    /// Returns false when the player was not queued.
    pub async fn execute(&self, player_id: UserId) -> Result<bool, DuelError> {
        let removed = self.queue.remove(player_id).await?;
        if removed {
            tracing::info!(%player_id, "Left matchmaking");
        }
        Ok(removed)
    }
}

#[derive(Debug, Clone)]
pub enum MatchStatus {
    /// Still searching; `window` is the current MMR half-width, `None` for anyone
    Waiting { waited_ms: u64, window: Option<u32> },
    Matched {
        game_id: DuelGameId,
        opponent_id: UserId,
        opponent_name: String,
        question: Question,
    },
}

pub struct PollMatch {
    queue: Arc<dyn MatchmakingQueue>,
    games: Arc<dyn DuelGameRepo>,
    questions: Arc<dyn QuestionRepo>,
    starter: Arc<DuelStarter>,
    clock: Arc<dyn ClockPort>,
}

impl PollMatch {
    pub fn new(
        queue: Arc<dyn MatchmakingQueue>,
        games: Arc<dyn DuelGameRepo>,
        questions: Arc<dyn QuestionRepo>,
        starter: Arc<DuelStarter>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            queue,
            games,
            questions,
            starter,
            clock,
        }
    }

    /// Look for an opponent inside the window for how long the player has
    /// waited. A player already matched by someone else's poll gets that duel.
    pub async fn execute(&self, player_id: UserId) -> Result<MatchStatus, DuelError> {
        if let Some(game) = self.games.find_active_by_player(player_id).await? {
            let question = current_question(self.questions.as_ref(), &game)
                .await?
                .ok_or(DomainError::GameNotActive)?;
            let opponent = game
                .opponent_of(player_id)
                .ok_or(DuelError::NotParticipant(player_id))?;
            return Ok(MatchStatus::Matched {
                game_id: game.id(),
                opponent_id: opponent.user_id(),
                opponent_name: opponent.username().to_string(),
                question,
            });
        }

        let me = self
            .queue
            .get(player_id)
            .await?
            .ok_or(DuelError::NotInQueue(player_id))?;
        let now = self.clock.now();
        let waited_ms = me.entry.waited_ms(now);
        let waiting = MatchStatus::Waiting {
            waited_ms,
            window: search_window(waited_ms),
        };

        let Some(opponent) = self.queue.find_match(player_id, me.entry.mmr, waited_ms).await? else {
            return Ok(waiting);
        };

        // Claim ourselves first, then the opponent; put ourselves back if
        // another poll got to them.
        if !self.queue.remove(player_id).await? {
            return Ok(waiting);
        }
        if !self.queue.remove(opponent.player_id()).await? {
            self.queue.add(me).await?;
            return Ok(waiting);
        }

        tracing::debug!(
            %player_id,
            opponent_id = %opponent.player_id(),
            waited_ms,
            "Matched"
        );
        let started = self
            .starter
            .start(
                DuelSeat::new(opponent.player_id(), opponent.username.clone()),
                DuelSeat::new(player_id, me.username.clone()),
                now,
            )
            .await;
        let duel = match started {
            Ok(duel) => duel,
            Err(e) => {
                tracing::warn!(%player_id, opponent_id = %opponent.player_id(), error = %e, "Duel failed to start, requeueing both");
                self.queue.add(opponent).await?;
                self.queue.add(me).await?;
                return Err(e);
            }
        };

        Ok(MatchStatus::Matched {
            game_id: duel.game.id(),
            opponent_id: opponent.player_id(),
            opponent_name: opponent.username,
            question: duel.first_question,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mockall::predicate::eq;

    use super::*;
    use crate::infrastructure::clock::{FixedRandom, SteppingClock};
    use crate::infrastructure::memory::{
        InMemoryContent, InMemoryDuelGames, InMemoryEventBus, InMemoryMatchmakingQueue, InMemoryOnlineTracker,
        InMemoryRatings, InMemorySeasons,
    };
    use crate::infrastructure::ports::{MockDuelGameRepo, MockMatchmakingQueue, PlayerRatingRepo};
    use crate::test_fixtures::{now, question};
    use crate::use_cases::content::QuestionSelector;
    use quizsprint_domain::rating::PlayerRating;

    struct Lobby {
        ratings: Arc<InMemoryRatings>,
        games: Arc<InMemoryDuelGames>,
        presence: Arc<InMemoryOnlineTracker>,
        queue: Arc<InMemoryMatchmakingQueue>,
        clock: Arc<SteppingClock>,
        join: JoinQueue,
        poll: PollMatch,
    }

    async fn lobby() -> Lobby {
        stocked_lobby(10).await
    }

    async fn stocked_lobby(questions: usize) -> Lobby {
        let content = Arc::new(InMemoryContent::new());
        for _ in 0..questions {
            content.save(&question(100)).await.unwrap();
        }
        let ratings = Arc::new(InMemoryRatings::new());
        let games = Arc::new(InMemoryDuelGames::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let presence = Arc::new(InMemoryOnlineTracker::new(std::time::Duration::from_secs(60)));
        let queue = Arc::new(InMemoryMatchmakingQueue::new());
        let clock = Arc::new(SteppingClock::new(now()));
        let seasonal = Arc::new(SeasonalRatings::new(
            ratings.clone(),
            Arc::new(InMemorySeasons::new()),
            bus.clone(),
            "season-1",
        ));
        let starter = Arc::new(DuelStarter::new(
            games.clone(),
            seasonal.clone(),
            Arc::new(QuestionSelector::new(content.clone())),
            presence.clone(),
            bus,
            Arc::new(FixedRandom(3)),
        ));

        Lobby {
            join: JoinQueue::new(queue.clone(), games.clone(), seasonal, presence.clone(), clock.clone()),
            poll: PollMatch::new(queue.clone(), games.clone(), content, starter, clock.clone()),
            ratings,
            games,
            presence,
            queue,
            clock,
        }
    }

    async fn rated(l: &Lobby, mmr: u32) -> UserId {
        let player = UserId::new();
        let rating =
            PlayerRating::reconstruct(player, "season-1", Mmr::new(mmr).unwrap(), 0, 40, now()).unwrap();
        l.ratings.save(&rating).await.unwrap();
        player
    }

    mod joining {
        use super::*;

        #[tokio::test]
        async fn new_player_joins_at_initial_rating() {
            let l = lobby().await;
            let player = UserId::new();

            let ticket = l.join.execute(player, "ana").await.unwrap();

            assert_eq!(ticket.mmr, Mmr::INITIAL);
            assert_eq!(ticket.queue_size, 1);
            assert!(l.presence.is_online(player, now()).await);
        }

        #[tokio::test]
        async fn joining_twice_is_rejected() {
            let l = lobby().await;
            let player = UserId::new();
            l.join.execute(player, "ana").await.unwrap();

            let err = l.join.execute(player, "ana").await.unwrap_err();
            assert!(matches!(err, DuelError::Domain(DomainError::AlreadyInQueue)));
        }

        #[tokio::test]
        async fn player_in_a_duel_cannot_queue() {
            let player = UserId::new();
            let mut queue = MockMatchmakingQueue::new();
            queue.expect_contains().with(eq(player)).returning(|_| Ok(false));
            queue.expect_add().never();
            let mut games = MockDuelGameRepo::new();
            games.expect_find_active_by_player().with(eq(player)).returning(|_| {
                let game = quizsprint_domain::modes::duel::DuelGame::new(
                    quizsprint_domain::modes::duel::DuelPlayer::new(UserId::new(), "a", Default::default()),
                    quizsprint_domain::modes::duel::DuelPlayer::new(UserId::new(), "b", Default::default()),
                    (0..7).map(|_| quizsprint_domain::QuestionId::new()).collect(),
                    now(),
                )
                .unwrap();
                Ok(Some(game))
            });

            let join = JoinQueue::new(
                Arc::new(queue),
                Arc::new(games),
                Arc::new(SeasonalRatings::new(
                    Arc::new(InMemoryRatings::new()),
                    Arc::new(InMemorySeasons::new()),
                    Arc::new(InMemoryEventBus::new()),
                    "season-1",
                )),
                Arc::new(InMemoryOnlineTracker::new(std::time::Duration::from_secs(60))),
                Arc::new(SteppingClock::new(now())),
            );
            let err = join.execute(player, "ana").await.unwrap_err();
            assert!(matches!(err, DuelError::Domain(DomainError::AlreadyInGame)));
        }
    }

    mod polling {
        use super::*;

        #[tokio::test]
        async fn unqueued_player_is_told_so() {
            let l = lobby().await;
            let player = UserId::new();
            let err = l.poll.execute(player).await.unwrap_err();
            assert!(matches!(err, DuelError::NotInQueue(id) if id == player));
        }

        #[tokio::test]
        async fn close_ratings_match_and_leave_the_queue() {
            let l = lobby().await;
            let (a, b) = (rated(&l, 1200).await, rated(&l, 1260).await);
            l.join.execute(a, "ana").await.unwrap();
            l.join.execute(b, "bo").await.unwrap();

            let MatchStatus::Matched { game_id, opponent_id, .. } = l.poll.execute(b).await.unwrap() else {
                panic!("expected a match");
            };
            assert_eq!(opponent_id, a);
            assert_eq!(l.queue.len().await.unwrap(), 0);
            assert_eq!(l.presence.in_match(a).await, Some(game_id));
            assert_eq!(l.presence.in_match(b).await, Some(game_id));

            // The other side finds the same duel.
            let MatchStatus::Matched { game_id: seen, opponent_id, .. } = l.poll.execute(a).await.unwrap() else {
                panic!("expected a match");
            };
            assert_eq!((seen, opponent_id), (game_id, b));
            assert!(l.games.get(game_id).await.unwrap().is_some());
        }

        #[tokio::test]
        async fn failed_start_puts_both_players_back() {
            let l = stocked_lobby(0).await;
            let (a, b) = (rated(&l, 1000).await, rated(&l, 1020).await);
            l.join.execute(a, "ana").await.unwrap();
            l.join.execute(b, "bo").await.unwrap();

            let err = l.poll.execute(b).await.unwrap_err();

            assert!(matches!(err, DuelError::Content(_)));
            assert_eq!(l.queue.len().await.unwrap(), 2);
            assert!(l.queue.contains(a).await.unwrap());
            assert!(l.queue.contains(b).await.unwrap());
            assert!(l.games.find_active_by_player(a).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn window_widens_with_waiting_time() {
            let l = lobby().await;
            let (a, b) = (rated(&l, 1000).await, rated(&l, 1300).await);
            l.join.execute(a, "ana").await.unwrap();
            l.join.execute(b, "bo").await.unwrap();

            assert!(matches!(
                l.poll.execute(a).await.unwrap(),
                MatchStatus::Waiting { window: Some(100), .. }
            ));

            l.clock.advance(Duration::seconds(10));
            assert!(matches!(
                l.poll.execute(a).await.unwrap(),
                MatchStatus::Matched { opponent_id, .. } if opponent_id == b
            ));
        }
    }
}
