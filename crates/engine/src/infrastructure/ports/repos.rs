//! Repository port traits, one per aggregate.
//!
//! All saves are upserts. Lookups return `Ok(None)` for missing rows; use cases
//! decide which absence is an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use quizsprint_domain::content::{
    Category, GlobalLeaderboardEntry, LeaderboardEntry, Question, QuestionFilter, Quiz, QuizFilter,
};
use quizsprint_domain::kernel::GameplaySession;
use quizsprint_domain::modes::classic::{ClassicGame, PersonalBest};
use quizsprint_domain::modes::daily::{DailyGame, DailyQuiz};
use quizsprint_domain::modes::duel::{DuelChallenge, DuelGame, Referral};
use quizsprint_domain::modes::party::{PartyGame, PartyRoom, RoomCode};
use quizsprint_domain::rating::{League, PlayerRating};
use quizsprint_domain::value_objects::GameDate;
use quizsprint_domain::{
    CategoryId, ChallengeId, ClassicGameId, DailyGameId, DailyQuizId, DuelGameId, PartyGameId,
    PartyRoomId, QuestionId, QuizId, ReferralId, SessionId, UserId,
};

use super::error::RepoError;
use super::types::Season;

// =============================================================================
// Content
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepo: Send + Sync {
    async fn get(&self, id: QuizId) -> Result<Option<Quiz>, RepoError>;
    async fn save(&self, quiz: &Quiz) -> Result<(), RepoError>;
    async fn delete(&self, id: QuizId) -> Result<(), RepoError>;
    /// Newest first.
    async fn list(&self, limit: usize) -> Result<Vec<Quiz>, RepoError>;
    /// Newest first, only quizzes `filter` matches.
    async fn find_by_filter(&self, filter: &QuizFilter, limit: usize) -> Result<Vec<Quiz>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepo: Send + Sync {
    async fn get(&self, id: QuestionId) -> Result<Option<Question>, RepoError>;
    /// Questions in the order of `ids`; unknown ids are skipped.
    async fn get_many(&self, ids: &[QuestionId]) -> Result<Vec<Question>, RepoError>;
    async fn save(&self, question: &Question) -> Result<(), RepoError>;
    async fn delete(&self, id: QuestionId) -> Result<(), RepoError>;

    /// Pick one quiz with exactly `questions_per_quiz` questions, chosen by
    /// `seed`, and return all of its questions. Empty when no quiz qualifies.
    ///
    /// Must return the same result for the same seed on every node.
    async fn find_questions_by_quiz_seed(
        &self,
        questions_per_quiz: usize,
        seed: i64,
    ) -> Result<Vec<Question>, RepoError>;

    /// Up to `limit` questions drawn from the filtered pool, chosen by `seed`.
    ///
    /// Must return the same result for the same seed on every node.
    async fn find_questions_by_seed(
        &self,
        filter: &QuestionFilter,
        limit: usize,
        seed: i64,
    ) -> Result<Vec<Question>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepo: Send + Sync {
    async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepoError>;
    async fn save(&self, category: &Category) -> Result<(), RepoError>;
    async fn delete(&self, id: CategoryId) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<Category>, RepoError>;
}

/// Finished kernel sessions, kept for history and audits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn get(&self, id: SessionId) -> Result<Option<GameplaySession>, RepoError>;
    async fn save(&self, user_id: UserId, session: &GameplaySession) -> Result<(), RepoError>;
    async fn delete(&self, id: SessionId) -> Result<(), RepoError>;
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<GameplaySession>, RepoError>;
}

/// Per-quiz leaderboard of finished runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardRepo: Send + Sync {
    async fn record(&self, entry: &LeaderboardEntry) -> Result<(), RepoError>;
    /// Ranked rows, best first.
    async fn leaderboard_by_quiz(
        &self,
        quiz_id: QuizId,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, RepoError>;
    /// Rank of the player's best run on the quiz.
    async fn rank_of_player(&self, quiz_id: QuizId, user_id: UserId) -> Result<Option<u32>, RepoError>;
    async fn delete_by_quiz(&self, quiz_id: QuizId) -> Result<(), RepoError>;
    /// Standings across every quiz, counting each player's best run per quiz.
    async fn global_leaderboard(&self, limit: usize) -> Result<Vec<GlobalLeaderboardEntry>, RepoError>;
}

// =============================================================================
// Daily Challenge
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DailyQuizRepo: Send + Sync {
    async fn get(&self, id: DailyQuizId) -> Result<Option<DailyQuiz>, RepoError>;
    async fn save(&self, quiz: &DailyQuiz) -> Result<(), RepoError>;
    async fn delete(&self, id: DailyQuizId) -> Result<(), RepoError>;
    async fn find_by_date(&self, date: GameDate) -> Result<Option<DailyQuiz>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DailyGameRepo: Send + Sync {
    async fn get(&self, id: DailyGameId) -> Result<Option<DailyGame>, RepoError>;
    async fn save(&self, game: &DailyGame) -> Result<(), RepoError>;
    async fn delete(&self, id: DailyGameId) -> Result<(), RepoError>;
    /// Every attempt by the player on `date`, oldest first.
    async fn find_by_player_and_date(
        &self,
        player_id: UserId,
        date: GameDate,
    ) -> Result<Vec<DailyGame>, RepoError>;
    /// The player's most recent game on any date.
    async fn find_latest_by_player(&self, player_id: UserId) -> Result<Option<DailyGame>, RepoError>;
    /// Completed games on `date`, best final score first, one per player.
    async fn top_by_date(&self, date: GameDate, limit: usize) -> Result<Vec<DailyGame>, RepoError>;
    /// 1-based rank a final score would take on `date`.
    async fn rank_for_score(&self, date: GameDate, final_score: u32) -> Result<u32, RepoError>;
}

// =============================================================================
// Classic
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassicGameRepo: Send + Sync {
    async fn get(&self, id: ClassicGameId) -> Result<Option<ClassicGame>, RepoError>;
    async fn save(&self, game: &ClassicGame) -> Result<(), RepoError>;
    async fn delete(&self, id: ClassicGameId) -> Result<(), RepoError>;
    /// Every unfinished run of the player, newest first.
    async fn list_active_by_player(&self, player_id: UserId) -> Result<Vec<ClassicGame>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonalBestRepo: Send + Sync {
    async fn get(&self, player_id: UserId, quiz_id: QuizId) -> Result<Option<PersonalBest>, RepoError>;
    async fn save(&self, best: &PersonalBest) -> Result<(), RepoError>;
    async fn delete(&self, player_id: UserId, quiz_id: QuizId) -> Result<(), RepoError>;
}

// =============================================================================
// Party
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartyRoomRepo: Send + Sync {
    async fn get(&self, id: PartyRoomId) -> Result<Option<PartyRoom>, RepoError>;
    async fn save(&self, room: &PartyRoom) -> Result<(), RepoError>;
    async fn delete(&self, id: PartyRoomId) -> Result<(), RepoError>;
    /// Open (not closed) room using `code`.
    async fn find_by_code(&self, code: &RoomCode) -> Result<Option<PartyRoom>, RepoError>;
    async fn find_active_by_player(&self, player_id: UserId) -> Result<Option<PartyRoom>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartyGameRepo: Send + Sync {
    async fn get(&self, id: PartyGameId) -> Result<Option<PartyGame>, RepoError>;
    async fn save(&self, game: &PartyGame) -> Result<(), RepoError>;
    async fn delete(&self, id: PartyGameId) -> Result<(), RepoError>;
    /// Latest game played in the room.
    async fn find_by_room(&self, room_id: PartyRoomId) -> Result<Option<PartyGame>, RepoError>;
}

// =============================================================================
// Duel & Ranked
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DuelGameRepo: Send + Sync {
    async fn get(&self, id: DuelGameId) -> Result<Option<DuelGame>, RepoError>;
    async fn save(&self, game: &DuelGame) -> Result<(), RepoError>;
    async fn delete(&self, id: DuelGameId) -> Result<(), RepoError>;
    /// Non-terminal duel the player is part of.
    async fn find_active_by_player(&self, player_id: UserId) -> Result<Option<DuelGame>, RepoError>;
    /// Finished duels the player took part in.
    async fn count_finished_by_player(&self, player_id: UserId) -> Result<u32, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRatingRepo: Send + Sync {
    async fn get(&self, player_id: UserId) -> Result<Option<PlayerRating>, RepoError>;
    async fn save(&self, rating: &PlayerRating) -> Result<(), RepoError>;
    async fn delete(&self, player_id: UserId) -> Result<(), RepoError>;
    /// Highest MMR first; ties by player id.
    async fn top(&self, limit: usize) -> Result<Vec<PlayerRating>, RepoError>;
    async fn top_by_league(&self, league: League, limit: usize) -> Result<Vec<PlayerRating>, RepoError>;
    /// 1-based position on the global ladder.
    async fn rank_of_player(&self, player_id: UserId) -> Result<Option<u32>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChallengeRepo: Send + Sync {
    async fn get(&self, id: ChallengeId) -> Result<Option<DuelChallenge>, RepoError>;
    async fn save(&self, challenge: &DuelChallenge) -> Result<(), RepoError>;
    async fn delete(&self, id: ChallengeId) -> Result<(), RepoError>;
    /// Pending challenges addressed to the player.
    async fn find_pending_for_player(&self, player_id: UserId) -> Result<Vec<DuelChallenge>, RepoError>;
    /// Pending direct challenge from `challenger_id` to `challenged_id`.
    async fn find_pending_between(
        &self,
        challenger_id: UserId,
        challenged_id: UserId,
    ) -> Result<Option<DuelChallenge>, RepoError>;
    async fn find_pending_by_code(&self, code: &str) -> Result<Option<DuelChallenge>, RepoError>;
    /// Pending challenges whose deadline is at or before `now`.
    async fn find_expired_pending(&self, now: DateTime<Utc>) -> Result<Vec<DuelChallenge>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferralRepo: Send + Sync {
    async fn get(&self, id: ReferralId) -> Result<Option<Referral>, RepoError>;
    async fn save(&self, referral: &Referral) -> Result<(), RepoError>;
    async fn delete(&self, id: ReferralId) -> Result<(), RepoError>;
    async fn find_by_invitee(&self, invitee_id: UserId) -> Result<Option<Referral>, RepoError>;
    async fn list_by_inviter(&self, inviter_id: UserId) -> Result<Vec<Referral>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeasonRepo: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Season>, RepoError>;
    async fn save(&self, season: &Season) -> Result<(), RepoError>;
    async fn delete(&self, id: &str) -> Result<(), RepoError>;
    /// Season active at `now`, latest start first.
    async fn find_current(&self, now: DateTime<Utc>) -> Result<Option<Season>, RepoError>;
}
