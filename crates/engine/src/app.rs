//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::memory::{
    InMemoryChallenges, InMemoryClassicGames, InMemoryContent, InMemoryDailyGames, InMemoryDailyQuizzes,
    InMemoryDuelGames, InMemoryEventBus, InMemoryLeaderboard, InMemoryMatchmakingQueue, InMemoryOnlineTracker,
    InMemoryPartyGames, InMemoryPartyRooms, InMemoryPersonalBests, InMemoryRatings, InMemoryReferrals,
    InMemorySeasons, InMemorySessions,
};
use crate::infrastructure::ports::{
    CategoryRepo, ChallengeRepo, ClassicGameRepo, ClockPort, DailyGameRepo, DailyQuizRepo, DuelGameRepo, EventBus,
    LeaderboardRepo, MatchmakingQueue, OnlineTracker, PartyGameRepo, PartyRoomRepo, PersonalBestRepo,
    PlayerRatingRepo, QuestionRepo, QuizRepo, RandomPort, ReferralRepo, SeasonRepo, SessionRepo,
};
use crate::use_cases::{self, classic, content, daily, duel, party, referral};

/// Main application state.
///
/// Holds every port and the use cases built on them.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    /// Everything published so far; the in-memory bus doubles as an audit log
    pub events: Arc<InMemoryEventBus>,
    pub config: EngineConfig,
}

/// Container for all ports.
pub struct Repositories {
    pub quizzes: Arc<dyn QuizRepo>,
    pub questions: Arc<dyn QuestionRepo>,
    pub categories: Arc<dyn CategoryRepo>,
    pub sessions: Arc<dyn SessionRepo>,
    pub leaderboard: Arc<dyn LeaderboardRepo>,
    pub classic_games: Arc<dyn ClassicGameRepo>,
    pub personal_bests: Arc<dyn PersonalBestRepo>,
    pub daily_quizzes: Arc<dyn DailyQuizRepo>,
    pub daily_games: Arc<dyn DailyGameRepo>,
    pub party_rooms: Arc<dyn PartyRoomRepo>,
    pub party_games: Arc<dyn PartyGameRepo>,
    pub duel_games: Arc<dyn DuelGameRepo>,
    pub ratings: Arc<dyn PlayerRatingRepo>,
    pub challenges: Arc<dyn ChallengeRepo>,
    pub referrals: Arc<dyn ReferralRepo>,
    pub seasons: Arc<dyn SeasonRepo>,
    pub matchmaking: Arc<dyn MatchmakingQueue>,
    pub presence: Arc<dyn OnlineTracker>,
}

/// Container for all use cases.
pub struct UseCases {
    pub content: use_cases::ContentUseCases,
    pub classic: use_cases::ClassicUseCases,
    pub daily: use_cases::DailyUseCases,
    pub party: use_cases::PartyUseCases,
    pub duel: use_cases::DuelUseCases,
    pub referral: use_cases::ReferralUseCases,
}

impl App {
    /// Wire every use case to in-memory adapters.
    pub fn in_memory(config: EngineConfig, clock: Arc<dyn ClockPort>, random: Arc<dyn RandomPort>) -> Self {
        let content_store = Arc::new(InMemoryContent::new());
        let bus = Arc::new(InMemoryEventBus::new());

        let repositories = Repositories {
            quizzes: content_store.clone(),
            questions: content_store.clone(),
            categories: content_store,
            sessions: Arc::new(InMemorySessions::new()),
            leaderboard: Arc::new(InMemoryLeaderboard::new()),
            classic_games: Arc::new(InMemoryClassicGames::new()),
            personal_bests: Arc::new(InMemoryPersonalBests::new()),
            daily_quizzes: Arc::new(InMemoryDailyQuizzes::new()),
            daily_games: Arc::new(InMemoryDailyGames::new()),
            party_rooms: Arc::new(InMemoryPartyRooms::new()),
            party_games: Arc::new(InMemoryPartyGames::new()),
            duel_games: Arc::new(InMemoryDuelGames::new()),
            ratings: Arc::new(InMemoryRatings::new()),
            challenges: Arc::new(InMemoryChallenges::new()),
            referrals: Arc::new(InMemoryReferrals::new()),
            seasons: Arc::new(InMemorySeasons::new()),
            matchmaking: Arc::new(InMemoryMatchmakingQueue::new()),
            presence: Arc::new(InMemoryOnlineTracker::new(config.online_ttl)),
        };

        let events: Arc<dyn EventBus> = bus.clone();
        let use_cases = Self::wire(&repositories, &config, events, clock, random);

        tracing::info!(season = %config.season_id, "Engine wired with in-memory storage");
        Self {
            repositories,
            use_cases,
            events: bus,
            config,
        }
    }

    fn wire(
        r: &Repositories,
        config: &EngineConfig,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> UseCases {
        let selector = Arc::new(content::QuestionSelector::new(r.questions.clone()));

        let content = use_cases::ContentUseCases::new(
            Arc::new(content::ListQuizzes::new(r.quizzes.clone())),
            Arc::new(content::GetRandomQuiz::new(r.quizzes.clone(), random.clone())),
            Arc::new(content::ListCategories::new(r.categories.clone())),
            Arc::new(content::GetQuizLeaderboard::new(r.quizzes.clone(), r.leaderboard.clone())),
            Arc::new(content::GetGlobalLeaderboard::new(r.leaderboard.clone())),
            Arc::new(content::GetSessionResults::new(r.sessions.clone())),
            selector.clone(),
        );

        let classic = use_cases::ClassicUseCases::new(
            Arc::new(classic::StartClassic::new(
                r.quizzes.clone(),
                r.classic_games.clone(),
                r.personal_bests.clone(),
                events.clone(),
                clock.clone(),
            )),
            Arc::new(classic::SubmitClassicAnswer::new(
                r.classic_games.clone(),
                r.personal_bests.clone(),
                r.leaderboard.clone(),
                r.sessions.clone(),
                events.clone(),
                clock.clone(),
            )),
            Arc::new(classic::GetPersonalBest::new(r.personal_bests.clone())),
            Arc::new(classic::GetActiveClassic::new(r.classic_games.clone())),
            Arc::new(classic::ListActiveClassic::new(r.classic_games.clone())),
            Arc::new(classic::AbandonClassic::new(r.classic_games.clone())),
        );

        let daily_quiz = Arc::new(daily::GetOrCreateDailyQuiz::new(
            r.daily_quizzes.clone(),
            selector.clone(),
            events.clone(),
            clock.clone(),
        ));
        let daily = use_cases::DailyUseCases::new(
            daily_quiz.clone(),
            Arc::new(daily::StartDaily::new(
                daily_quiz.clone(),
                r.questions.clone(),
                r.daily_games.clone(),
                events.clone(),
                clock.clone(),
            )),
            Arc::new(daily::SubmitDailyAnswer::new(
                r.daily_games.clone(),
                events.clone(),
                clock.clone(),
                random.clone(),
            )),
            Arc::new(daily::RetryDaily::new(
                daily_quiz,
                r.questions.clone(),
                r.daily_games.clone(),
                events.clone(),
                clock.clone(),
            )),
            Arc::new(daily::GetDailyStatus::new(r.daily_games.clone(), clock.clone())),
            Arc::new(daily::GetDailyLeaderboard::new(r.daily_games.clone(), clock.clone())),
            Arc::new(daily::GetPlayerStreak::new(r.daily_games.clone(), clock.clone())),
            Arc::new(daily::OpenChest::new(
                r.daily_games.clone(),
                events.clone(),
                clock.clone(),
                random.clone(),
            )),
        );

        let party = use_cases::PartyUseCases::new(
            Arc::new(party::CreateRoom::new(
                r.party_rooms.clone(),
                events.clone(),
                clock.clone(),
                random.clone(),
            )),
            Arc::new(party::JoinRoom::new(r.party_rooms.clone(), events.clone(), clock.clone())),
            Arc::new(party::LeaveRoom::new(r.party_rooms.clone(), events.clone(), clock.clone())),
            Arc::new(party::SetReady::new(r.party_rooms.clone(), events.clone(), clock.clone())),
            Arc::new(party::KickPlayer::new(r.party_rooms.clone(), events.clone(), clock.clone())),
            Arc::new(party::StartPartyGame::new(
                r.party_rooms.clone(),
                r.party_games.clone(),
                selector.clone(),
                events.clone(),
                clock.clone(),
                random.clone(),
            )),
            Arc::new(party::SubmitPartyAnswer::new(
                r.party_games.clone(),
                r.party_rooms.clone(),
                r.questions.clone(),
                events.clone(),
                clock.clone(),
            )),
            Arc::new(party::GetRoomState::new(r.party_rooms.clone(), r.party_games.clone())),
        );

        let update_referral = Arc::new(referral::UpdateReferralProgress::new(
            r.referrals.clone(),
            events.clone(),
            clock.clone(),
        ));
        let referral = use_cases::ReferralUseCases::new(
            Arc::new(referral::CreateReferral::new(r.referrals.clone(), events.clone(), clock.clone())),
            update_referral.clone(),
            Arc::new(referral::ClaimReferralReward::new(
                r.referrals.clone(),
                events.clone(),
                clock.clone(),
            )),
            Arc::new(referral::ListPendingReferralRewards::new(r.referrals.clone())),
        );

        let seasonal = Arc::new(duel::SeasonalRatings::new(
            r.ratings.clone(),
            r.seasons.clone(),
            events.clone(),
            config.season_id.clone(),
        ));
        let starter = Arc::new(duel::DuelStarter::new(
            r.duel_games.clone(),
            seasonal.clone(),
            selector,
            r.presence.clone(),
            events.clone(),
            random,
        ));
        let send_challenge = Arc::new(duel::SendDirectChallenge::new(
            r.challenges.clone(),
            r.duel_games.clone(),
            r.matchmaking.clone(),
            r.presence.clone(),
            events.clone(),
            clock.clone(),
        ));
        let respond = Arc::new(duel::RespondToChallenge::new(
            r.challenges.clone(),
            r.duel_games.clone(),
            r.matchmaking.clone(),
            r.presence.clone(),
            starter.clone(),
            events.clone(),
            clock.clone(),
        ));
        let duel = use_cases::DuelUseCases::new(
            Arc::new(duel::JoinQueue::new(
                r.matchmaking.clone(),
                r.duel_games.clone(),
                seasonal.clone(),
                r.presence.clone(),
                clock.clone(),
            )),
            Arc::new(duel::LeaveQueue::new(r.matchmaking.clone())),
            Arc::new(duel::PollMatch::new(
                r.matchmaking.clone(),
                r.duel_games.clone(),
                r.questions.clone(),
                starter,
                clock.clone(),
            )),
            Arc::new(duel::SubmitDuelAnswer::new(
                r.duel_games.clone(),
                r.questions.clone(),
                r.ratings.clone(),
                seasonal.clone(),
                r.presence.clone(),
                update_referral,
                events.clone(),
                clock.clone(),
            )),
            Arc::new(duel::DisconnectFromDuel::new(
                r.duel_games.clone(),
                r.presence.clone(),
                events.clone(),
                clock.clone(),
            )),
            Arc::new(duel::ReconnectToDuel::new(r.duel_games.clone(), events.clone(), clock.clone())),
            send_challenge.clone(),
            Arc::new(duel::CreateLinkChallenge::new(r.challenges.clone(), events.clone(), clock.clone())),
            respond.clone(),
            Arc::new(duel::ExpireChallenges::new(r.challenges.clone(), events.clone(), clock.clone())),
            Arc::new(duel::RequestRematch::new(
                r.duel_games.clone(),
                r.challenges.clone(),
                send_challenge,
                respond,
                clock.clone(),
            )),
            Arc::new(duel::GetRatingLeaderboard::new(r.ratings.clone())),
            Arc::new(duel::GetPlayerRating::new(r.ratings.clone())),
            Arc::new(duel::ResetPlayerSeason::new(
                r.ratings.clone(),
                seasonal,
                events,
                clock.clone(),
            )),
            Arc::new(duel::GetOnlineFriends::new(r.presence.clone(), clock)),
        );

        UseCases {
            content,
            classic,
            daily,
            party,
            duel,
            referral,
        }
    }
}
