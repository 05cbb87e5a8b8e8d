//! Quick duel use cases.
//!
//! Ranked 1v1 games found through the matchmaking queue or started from a
//! friend challenge. Finishing a duel moves both players' ratings and feeds
//! referral progress.

use std::sync::Arc;

use quizsprint_domain::content::{Question, QuestionFilter};
use quizsprint_domain::modes::duel::{DuelGame, DuelPlayer, QUESTIONS_PER_DUEL};
use quizsprint_domain::rating::EloRating;
use quizsprint_domain::{DomainError, DuelGameId, EventSource, UserId};

use crate::infrastructure::ports::{
    DuelGameRepo, EventBus, OnlineTracker, QuestionRepo, RandomPort, RepoError,
};
use crate::use_cases::content::{ContentError, QuestionSelector};
use crate::use_cases::publish;

mod challenge;
mod play;
mod queue;
mod ratings;

pub use challenge::{
    ChallengeRef, ChallengeResponse, CreateLinkChallenge, ExpireChallenges, GetOnlineFriends, OnlineFriend,
    Rematch, RequestRematch, RespondToChallenge, SendDirectChallenge,
};
pub use play::{DisconnectFromDuel, DuelAnswerInput, DuelAnswerResult, DuelRatingUpdate, ReconnectToDuel, SubmitDuelAnswer};
pub use queue::{JoinQueue, LeaveQueue, MatchStatus, PollMatch, QueueTicket};
pub use ratings::{GetPlayerRating, GetRatingLeaderboard, PlayerRatingView, ResetPlayerSeason, SeasonalRatings};

/// Container for duel use cases.
pub struct DuelUseCases {
    pub join_queue: Arc<JoinQueue>,
    pub leave_queue: Arc<LeaveQueue>,
    pub poll_match: Arc<PollMatch>,
    pub submit_answer: Arc<SubmitDuelAnswer>,
    pub disconnect: Arc<DisconnectFromDuel>,
    pub reconnect: Arc<ReconnectToDuel>,
    pub send_challenge: Arc<SendDirectChallenge>,
    pub create_link: Arc<CreateLinkChallenge>,
    pub respond: Arc<RespondToChallenge>,
    pub expire_challenges: Arc<ExpireChallenges>,
    pub rematch: Arc<RequestRematch>,
    pub leaderboard: Arc<GetRatingLeaderboard>,
    pub player_rating: Arc<GetPlayerRating>,
    pub reset_season: Arc<ResetPlayerSeason>,
    pub online_friends: Arc<GetOnlineFriends>,
}

impl DuelUseCases {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        join_queue: Arc<JoinQueue>,
        leave_queue: Arc<LeaveQueue>,
        poll_match: Arc<PollMatch>,
        submit_answer: Arc<SubmitDuelAnswer>,
        disconnect: Arc<DisconnectFromDuel>,
        reconnect: Arc<ReconnectToDuel>,
        send_challenge: Arc<SendDirectChallenge>,
        create_link: Arc<CreateLinkChallenge>,
        respond: Arc<RespondToChallenge>,
        expire_challenges: Arc<ExpireChallenges>,
        rematch: Arc<RequestRematch>,
        leaderboard: Arc<GetRatingLeaderboard>,
        player_rating: Arc<GetPlayerRating>,
        reset_season: Arc<ResetPlayerSeason>,
        online_friends: Arc<GetOnlineFriends>,
    ) -> Self {
        Self {
            join_queue,
            leave_queue,
            poll_match,
            submit_answer,
            disconnect,
            reconnect,
            send_challenge,
            create_link,
            respond,
            expire_challenges,
            rematch,
            leaderboard,
            player_rating,
            reset_season,
            online_friends,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    #[error("Duel not found: {0}")]
    GameNotFound(DuelGameId),
    #[error("Challenge not found: {0}")]
    ChallengeNotFound(String),
    #[error("No rating for player {0}")]
    RatingNotFound(UserId),
    #[error("Player {0} is not in the matchmaking queue")]
    NotInQueue(UserId),
    #[error("Player {0} did not play this duel")]
    NotParticipant(UserId),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

async fn load_game(games: &dyn DuelGameRepo, game_id: DuelGameId) -> Result<DuelGame, DuelError> {
    games.get(game_id).await?.ok_or(DuelError::GameNotFound(game_id))
}

/// Question of the round in progress, if any.
async fn current_question(questions: &dyn QuestionRepo, game: &DuelGame) -> Result<Option<Question>, DuelError> {
    match game.current_question_id() {
        Some(id) => Ok(Some(
            questions
                .get(id)
                .await?
                .ok_or(DomainError::QuestionNotFound(id))?,
        )),
        None => Ok(None),
    }
}

/// One side of a duel about to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelSeat {
    pub player_id: UserId,
    pub username: String,
}

impl DuelSeat {
    pub fn new(player_id: UserId, username: impl Into<String>) -> Self {
        Self {
            player_id,
            username: username.into(),
        }
    }
}

/// A freshly started duel and its opening question.
#[derive(Debug, Clone)]
pub struct DuelMatch {
    pub game: DuelGame,
    pub first_question: Question,
}

/// Creates and starts duels for the queue and for accepted challenges.
pub struct DuelStarter {
    games: Arc<dyn DuelGameRepo>,
    ratings: Arc<SeasonalRatings>,
    selector: Arc<QuestionSelector>,
    presence: Arc<dyn OnlineTracker>,
    events: Arc<dyn EventBus>,
    random: Arc<dyn RandomPort>,
}

impl DuelStarter {
    pub fn new(
        games: Arc<dyn DuelGameRepo>,
        ratings: Arc<SeasonalRatings>,
        selector: Arc<QuestionSelector>,
        presence: Arc<dyn OnlineTracker>,
        events: Arc<dyn EventBus>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            games,
            ratings,
            selector,
            presence,
            events,
            random,
        }
    }

    /// Draw seven questions, seat both players at their current rating and
    /// open round one. Both players are marked in-match.
    pub async fn start(
        &self,
        first: DuelSeat,
        second: DuelSeat,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<DuelMatch, DuelError> {
        let first_rating = self.ratings.load_current(first.player_id, now).await?;
        let second_rating = self.ratings.load_current(second.player_id, now).await?;

        let seed = i64::from(self.random.gen_range(0, i32::MAX));
        let questions = self
            .selector
            .draw(&QuestionFilter::new(), QUESTIONS_PER_DUEL, seed)
            .await?;
        let first_question = questions
            .first()
            .cloned()
            .ok_or(ContentError::NotEnoughQuestions {
                needed: QUESTIONS_PER_DUEL,
                found: 0,
            })?;

        let mut game = DuelGame::new(
            DuelPlayer::new(
                first.player_id,
                first.username,
                EloRating::new(first_rating.mmr(), first_rating.games_played()),
            ),
            DuelPlayer::new(
                second.player_id,
                second.username,
                EloRating::new(second_rating.mmr(), second_rating.games_played()),
            ),
            questions.iter().map(Question::id).collect(),
            now,
        )?;
        game.start(now)?;

        self.games.save(&game).await?;
        self.presence.set_in_match(first.player_id, Some(game.id())).await;
        self.presence.set_in_match(second.player_id, Some(game.id())).await;
        publish(self.events.as_ref(), game.take_events()).await;

        tracing::info!(
            game_id = %game.id(),
            player1 = %first.player_id,
            player2 = %second.player_id,
            player1_mmr = first_rating.mmr().value(),
            player2_mmr = second_rating.mmr().value(),
            "Duel started"
        );
        Ok(DuelMatch { game, first_question })
    }
}
