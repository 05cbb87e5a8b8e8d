//! Content use cases: catalogue reads, the quiz leaderboard and question
//! selection for the generated modes.

use std::sync::Arc;

use quizsprint_domain::content::{Category, GlobalLeaderboardEntry, LeaderboardEntry, Quiz, QuizFilter};
use quizsprint_domain::{DomainError, QuizId, SessionId, UserId};

use super::clamp_limit;
use crate::infrastructure::ports::{CategoryRepo, LeaderboardRepo, QuizRepo, RandomPort, RepoError};

mod results;
mod selector;

pub use results::{GetSessionResults, SessionResults};
pub use selector::QuestionSelector;

/// How many matching quizzes a random pick draws from.
const RANDOM_POOL: usize = 500;

/// Container for content use cases.
pub struct ContentUseCases {
    pub list_quizzes: Arc<ListQuizzes>,
    pub random_quiz: Arc<GetRandomQuiz>,
    pub list_categories: Arc<ListCategories>,
    pub leaderboard: Arc<GetQuizLeaderboard>,
    pub global_leaderboard: Arc<GetGlobalLeaderboard>,
    pub session_results: Arc<GetSessionResults>,
    pub selector: Arc<QuestionSelector>,
}

impl ContentUseCases {
    pub fn new(
        list_quizzes: Arc<ListQuizzes>,
        random_quiz: Arc<GetRandomQuiz>,
        list_categories: Arc<ListCategories>,
        leaderboard: Arc<GetQuizLeaderboard>,
        global_leaderboard: Arc<GetGlobalLeaderboard>,
        session_results: Arc<GetSessionResults>,
        selector: Arc<QuestionSelector>,
    ) -> Self {
        Self {
            list_quizzes,
            random_quiz,
            list_categories,
            leaderboard,
            global_leaderboard,
            session_results,
            selector,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Quiz not found: {0}")]
    QuizNotFound(QuizId),
    #[error("Not enough questions: needed {needed}, found {found}")]
    NotEnoughQuestions { needed: usize, found: usize },
    #[error("No playable quiz matches the filter")]
    NoQuizAvailable,
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("Session {0} is still running")]
    SessionNotFinished(SessionId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

// =============================================================================
// Catalogue
// =============================================================================

pub struct ListQuizzes {
    quizzes: Arc<dyn QuizRepo>,
}

impl ListQuizzes {
    pub fn new(quizzes: Arc<dyn QuizRepo>) -> Self {
        Self { quizzes }
    }

    /// Newest quizzes first, restricted to those `filter` matches.
    pub async fn execute(&self, filter: &QuizFilter, limit: Option<usize>) -> Result<Vec<Quiz>, ContentError> {
        Ok(self.quizzes.find_by_filter(filter, clamp_limit(limit)).await?)
    }
}

pub struct GetRandomQuiz {
    quizzes: Arc<dyn QuizRepo>,
    random: Arc<dyn RandomPort>,
}

impl GetRandomQuiz {
    pub fn new(quizzes: Arc<dyn QuizRepo>, random: Arc<dyn RandomPort>) -> Self {
        Self { quizzes, random }
    }

    /// Any playable quiz `filter` matches, picked uniformly.
    pub async fn execute(&self, filter: &QuizFilter) -> Result<Quiz, ContentError> {
        let mut playable: Vec<Quiz> = self
            .quizzes
            .find_by_filter(filter, RANDOM_POOL)
            .await?
            .into_iter()
            .filter(|q| q.can_start().is_ok())
            .collect();
        if playable.is_empty() {
            return Err(ContentError::NoQuizAvailable);
        }

        let last = i32::try_from(playable.len() - 1).unwrap_or(i32::MAX);
        let index = usize::try_from(self.random.gen_range(0, last)).unwrap_or(0);
        let quiz = playable.swap_remove(index.min(playable.len() - 1));
        tracing::debug!(quiz_id = %quiz.id(), pool = playable.len() + 1, "Random quiz picked");
        Ok(quiz)
    }
}

pub struct ListCategories {
    categories: Arc<dyn CategoryRepo>,
}

impl ListCategories {
    pub fn new(categories: Arc<dyn CategoryRepo>) -> Self {
        Self { categories }
    }

    pub async fn execute(&self) -> Result<Vec<Category>, ContentError> {
        Ok(self.categories.list().await?)
    }
}

// =============================================================================
// Quiz leaderboard
// =============================================================================

/// One page of a quiz leaderboard plus the caller's own rank.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizLeaderboard {
    pub quiz_id: QuizId,
    pub entries: Vec<LeaderboardEntry>,
    pub player_rank: Option<u32>,
}

pub struct GetQuizLeaderboard {
    quizzes: Arc<dyn QuizRepo>,
    leaderboard: Arc<dyn LeaderboardRepo>,
}

impl GetQuizLeaderboard {
    pub fn new(quizzes: Arc<dyn QuizRepo>, leaderboard: Arc<dyn LeaderboardRepo>) -> Self {
        Self {
            quizzes,
            leaderboard,
        }
    }

    pub async fn execute(
        &self,
        quiz_id: QuizId,
        player_id: Option<UserId>,
        limit: Option<usize>,
    ) -> Result<QuizLeaderboard, ContentError> {
        if self.quizzes.get(quiz_id).await?.is_none() {
            return Err(ContentError::QuizNotFound(quiz_id));
        }

        let entries = self
            .leaderboard
            .leaderboard_by_quiz(quiz_id, clamp_limit(limit))
            .await?;
        let player_rank = match player_id {
            Some(user_id) => self.leaderboard.rank_of_player(quiz_id, user_id).await?,
            None => None,
        };

        Ok(QuizLeaderboard {
            quiz_id,
            entries,
            player_rank,
        })
    }
}

// =============================================================================
// Global leaderboard
// =============================================================================

pub struct GetGlobalLeaderboard {
    leaderboard: Arc<dyn LeaderboardRepo>,
}

impl GetGlobalLeaderboard {
    pub fn new(leaderboard: Arc<dyn LeaderboardRepo>) -> Self {
        Self { leaderboard }
    }

    pub async fn execute(&self, limit: Option<usize>) -> Result<Vec<GlobalLeaderboardEntry>, ContentError> {
        Ok(self.leaderboard.global_leaderboard(clamp_limit(limit)).await?)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::infrastructure::ports::{MockLeaderboardRepo, MockQuizRepo};
    use crate::test_fixtures::{quiz, ScriptedRandom};
    use quizsprint_domain::{CategoryId, Tag};

    #[tokio::test]
    async fn leaderboard_for_unknown_quiz_is_not_found() {
        let mut quizzes = MockQuizRepo::new();
        quizzes.expect_get().returning(|_| Ok(None));
        let leaderboard = MockLeaderboardRepo::new();

        let use_case = GetQuizLeaderboard::new(Arc::new(quizzes), Arc::new(leaderboard));
        let err = use_case.execute(QuizId::new(), None, None).await.unwrap_err();

        assert!(matches!(err, ContentError::QuizNotFound(_)));
    }

    #[tokio::test]
    async fn leaderboard_clamps_limit_and_reports_player_rank() {
        let q = quiz(3, 100, 15, 0);
        let quiz_id = q.id();
        let player = UserId::new();

        let mut quizzes = MockQuizRepo::new();
        quizzes.expect_get().returning(move |_| Ok(Some(q.clone())));
        let mut leaderboard = MockLeaderboardRepo::new();
        leaderboard
            .expect_leaderboard_by_quiz()
            .with(eq(quiz_id), eq(100))
            .returning(|_, _| Ok(Vec::new()));
        leaderboard
            .expect_rank_of_player()
            .with(eq(quiz_id), eq(player))
            .returning(|_, _| Ok(Some(4)));

        let use_case = GetQuizLeaderboard::new(Arc::new(quizzes), Arc::new(leaderboard));
        let board = use_case.execute(quiz_id, Some(player), Some(1_000)).await.unwrap();

        assert_eq!(board.player_rank, Some(4));
    }

    #[tokio::test]
    async fn list_quizzes_passes_filter_and_clamped_limit() {
        let category = CategoryId::new();
        let filter = QuizFilter::new()
            .with_category(category)
            .with_tag(Tag::new("topic:space").unwrap());
        let expected = filter.clone();
        let mut quizzes = MockQuizRepo::new();
        quizzes
            .expect_find_by_filter()
            .withf(move |f, limit| *f == expected && *limit == 100)
            .returning(|_, _| Ok(vec![quiz(1, 100, 15, 0)]));

        let listed = ListQuizzes::new(Arc::new(quizzes))
            .execute(&filter, Some(5_000))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn global_leaderboard_clamps_limit() {
        let mut leaderboard = MockLeaderboardRepo::new();
        leaderboard
            .expect_global_leaderboard()
            .with(eq(10))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let rows = GetGlobalLeaderboard::new(Arc::new(leaderboard))
            .execute(None)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    mod random_quiz {
        use super::*;

        fn repo_with(quizzes: Vec<Quiz>) -> Arc<MockQuizRepo> {
            let mut repo = MockQuizRepo::new();
            repo.expect_find_by_filter()
                .returning(move |_, _| Ok(quizzes.clone()));
            Arc::new(repo)
        }

        #[tokio::test]
        async fn picks_the_drawn_index() {
            let pool: Vec<Quiz> = (0..3).map(|_| quiz(2, 100, 15, 0)).collect();
            let third = pool[2].id();

            let picked = GetRandomQuiz::new(repo_with(pool), Arc::new(ScriptedRandom::new([2])))
                .execute(&QuizFilter::new())
                .await
                .unwrap();
            assert_eq!(picked.id(), third);
        }

        #[tokio::test]
        async fn empty_quizzes_are_never_picked() {
            let pool = vec![quiz(0, 100, 15, 0), quiz(2, 100, 15, 0)];
            let playable = pool[1].id();

            let picked = GetRandomQuiz::new(repo_with(pool), Arc::new(ScriptedRandom::new([0])))
                .execute(&QuizFilter::new())
                .await
                .unwrap();
            assert_eq!(picked.id(), playable);
        }

        #[tokio::test]
        async fn nothing_matching_is_an_error() {
            let err = GetRandomQuiz::new(repo_with(Vec::new()), Arc::new(ScriptedRandom::new([])))
                .execute(&QuizFilter::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ContentError::NoQuizAvailable));
        }
    }
}
