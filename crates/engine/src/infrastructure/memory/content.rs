//! In-memory content store: quizzes, questions, categories, sessions and the
//! per-quiz leaderboard.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quizsprint_domain::content::{
    global_standings, rank_entries, Category, GlobalLeaderboardEntry, LeaderboardEntry, Question, QuestionFilter, Quiz,
    QuizFilter,
};
use quizsprint_domain::kernel::GameplaySession;
use quizsprint_domain::{CategoryId, QuestionId, QuizId, SessionId, UserId};

use super::selection::{pick_index, pick_many};
use crate::infrastructure::ports::{CategoryRepo, LeaderboardRepo, QuestionRepo, QuizRepo, RepoError, SessionRepo};

/// Quizzes, questions and categories. Saving a quiz also stores its questions.
#[derive(Default)]
pub struct InMemoryContent {
    quizzes: RwLock<HashMap<QuizId, Quiz>>,
    questions: RwLock<HashMap<QuestionId, Question>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl InMemoryContent {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepo for InMemoryContent {
    async fn get(&self, id: QuizId) -> Result<Option<Quiz>, RepoError> {
        Ok(self.quizzes.read().await.get(&id).cloned())
    }

    async fn save(&self, quiz: &Quiz) -> Result<(), RepoError> {
        {
            let mut questions = self.questions.write().await;
            for question in quiz.questions() {
                questions.insert(question.id(), question.clone());
            }
        }
        self.quizzes.write().await.insert(quiz.id(), quiz.clone());
        Ok(())
    }

    async fn delete(&self, id: QuizId) -> Result<(), RepoError> {
        self.quizzes.write().await.remove(&id);
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Quiz>, RepoError> {
        self.find_by_filter(&QuizFilter::new(), limit).await
    }

    async fn find_by_filter(&self, filter: &QuizFilter, limit: usize) -> Result<Vec<Quiz>, RepoError> {
        let mut quizzes: Vec<Quiz> = self
            .quizzes
            .read()
            .await
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())));
        quizzes.truncate(limit);
        Ok(quizzes)
    }
}

#[async_trait]
impl QuestionRepo for InMemoryContent {
    async fn get(&self, id: QuestionId) -> Result<Option<Question>, RepoError> {
        Ok(self.questions.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[QuestionId]) -> Result<Vec<Question>, RepoError> {
        let questions = self.questions.read().await;
        Ok(ids.iter().filter_map(|id| questions.get(id).cloned()).collect())
    }

    async fn save(&self, question: &Question) -> Result<(), RepoError> {
        self.questions.write().await.insert(question.id(), question.clone());
        Ok(())
    }

    async fn delete(&self, id: QuestionId) -> Result<(), RepoError> {
        self.questions.write().await.remove(&id);
        Ok(())
    }

    async fn find_questions_by_quiz_seed(
        &self,
        questions_per_quiz: usize,
        seed: i64,
    ) -> Result<Vec<Question>, RepoError> {
        let quizzes = self.quizzes.read().await;
        let mut candidates: Vec<&Quiz> = quizzes
            .values()
            .filter(|q| q.question_count() == questions_per_quiz)
            .collect();
        candidates.sort_by_key(|q| q.id());

        Ok(pick_index(candidates.len(), seed)
            .and_then(|i| candidates.get(i))
            .map(|quiz| quiz.questions().to_vec())
            .unwrap_or_default())
    }

    async fn find_questions_by_seed(
        &self,
        filter: &QuestionFilter,
        limit: usize,
        seed: i64,
    ) -> Result<Vec<Question>, RepoError> {
        let questions = self.questions.read().await;
        let mut pool: Vec<&Question> = questions.values().filter(|q| filter.matches(q)).collect();
        pool.sort_by_key(|q| q.id());

        Ok(pick_many(&pool, limit, seed).into_iter().cloned().collect())
    }
}

#[async_trait]
impl CategoryRepo for InMemoryContent {
    async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepoError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn save(&self, category: &Category) -> Result<(), RepoError> {
        self.categories.write().await.insert(category.id(), category.clone());
        Ok(())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), RepoError> {
        self.categories.write().await.remove(&id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories: Vec<Category> = self.categories.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(categories)
    }
}

// =============================================================================
// Sessions
// =============================================================================

#[derive(Default)]
pub struct InMemorySessions {
    sessions: RwLock<HashMap<SessionId, (UserId, GameplaySession)>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepo for InMemorySessions {
    async fn get(&self, id: SessionId) -> Result<Option<GameplaySession>, RepoError> {
        Ok(self.sessions.read().await.get(&id).map(|(_, s)| s.clone()))
    }

    async fn save(&self, user_id: UserId, session: &GameplaySession) -> Result<(), RepoError> {
        self.sessions
            .write()
            .await
            .insert(session.id(), (user_id, session.clone()));
        Ok(())
    }

    async fn delete(&self, id: SessionId) -> Result<(), RepoError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<GameplaySession>, RepoError> {
        let mut sessions: Vec<GameplaySession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, s)| s.clone())
            .collect();
        sessions.sort_by_key(|s| s.started_at());
        Ok(sessions)
    }
}

// =============================================================================
// Quiz leaderboard
// =============================================================================

#[derive(Default)]
pub struct InMemoryLeaderboard {
    entries: RwLock<Vec<LeaderboardEntry>>,
}

impl InMemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best run per user on the quiz, ranked.
    async fn ranked(&self, quiz_id: QuizId) -> Vec<LeaderboardEntry> {
        let entries = self.entries.read().await;
        let mut best: HashMap<UserId, &LeaderboardEntry> = HashMap::new();
        for entry in entries.iter().filter(|e| e.quiz_id == quiz_id) {
            best.entry(entry.user_id)
                .and_modify(|current| {
                    if entry.score > current.score {
                        *current = entry;
                    }
                })
                .or_insert(entry);
        }
        let mut rows: Vec<LeaderboardEntry> = best.into_values().cloned().collect();
        rank_entries(&mut rows);
        rows
    }
}

#[async_trait]
impl LeaderboardRepo for InMemoryLeaderboard {
    async fn record(&self, entry: &LeaderboardEntry) -> Result<(), RepoError> {
        let mut entries = self.entries.write().await;
        entries.retain(|e| e.session_id != entry.session_id);
        entries.push(entry.clone());
        Ok(())
    }

    async fn leaderboard_by_quiz(
        &self,
        quiz_id: QuizId,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, RepoError> {
        let mut rows = self.ranked(quiz_id).await;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn rank_of_player(&self, quiz_id: QuizId, user_id: UserId) -> Result<Option<u32>, RepoError> {
        Ok(self
            .ranked(quiz_id)
            .await
            .iter()
            .find(|e| e.user_id == user_id)
            .map(|e| e.rank))
    }

    async fn delete_by_quiz(&self, quiz_id: QuizId) -> Result<(), RepoError> {
        self.entries.write().await.retain(|e| e.quiz_id != quiz_id);
        Ok(())
    }

    async fn global_leaderboard(&self, limit: usize) -> Result<Vec<GlobalLeaderboardEntry>, RepoError> {
        let mut standings = global_standings(&self.entries.read().await);
        standings.truncate(limit);
        Ok(standings)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::test_fixtures::{now, question, quiz};

    mod selection {
        use super::*;

        #[tokio::test]
        async fn quiz_seed_returns_whole_quiz_with_exact_size() {
            let store = InMemoryContent::new();
            let ten = quiz(10, 100, 15, 0);
            QuizRepo::save(&store, &quiz(5, 100, 15, 0)).await.unwrap();
            QuizRepo::save(&store, &ten).await.unwrap();

            let picked = store.find_questions_by_quiz_seed(10, 20260101).await.unwrap();
            assert_eq!(picked.iter().map(|q| q.id()).collect::<Vec<_>>(), ten.question_ids());
        }

        #[tokio::test]
        async fn quiz_seed_without_candidates_is_empty() {
            let store = InMemoryContent::new();
            QuizRepo::save(&store, &quiz(5, 100, 15, 0)).await.unwrap();
            assert!(store.find_questions_by_quiz_seed(10, 1).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn question_seed_is_deterministic_and_filtered() {
            let store = InMemoryContent::new();
            for points in [50, 100, 150, 200, 250, 300] {
                for _ in 0..5 {
                    QuestionRepo::save(&store, &question(points)).await.unwrap();
                }
            }
            let filter = QuestionFilter::new().with_points_between(100, 200);

            let first = store.find_questions_by_seed(&filter, 10, 77).await.unwrap();
            let second = store.find_questions_by_seed(&filter, 10, 77).await.unwrap();

            assert_eq!(first.len(), 10);
            assert_eq!(first, second);
            assert!(first.iter().all(|q| (100..=200).contains(&q.points().value())));
        }
    }

    mod leaderboard {
        use super::*;

        fn entry(quiz_id: QuizId, user_id: UserId, score: u32, minutes: i64) -> LeaderboardEntry {
            LeaderboardEntry {
                session_id: SessionId::new(),
                quiz_id,
                user_id,
                username: "player".into(),
                score,
                rank: 0,
                completed_at: now() + Duration::minutes(minutes),
            }
        }

        #[tokio::test]
        async fn keeps_best_run_per_user_and_ranks() {
            let board = InMemoryLeaderboard::new();
            let quiz_id = QuizId::new();
            let (a, b) = (UserId::new(), UserId::new());
            board.record(&entry(quiz_id, a, 300, 0)).await.unwrap();
            board.record(&entry(quiz_id, a, 500, 1)).await.unwrap();
            board.record(&entry(quiz_id, b, 400, 2)).await.unwrap();
            board.record(&entry(QuizId::new(), b, 900, 3)).await.unwrap();

            let rows = board.leaderboard_by_quiz(quiz_id, 10).await.unwrap();
            assert_eq!(rows.iter().map(|r| (r.user_id, r.score, r.rank)).collect::<Vec<_>>(), vec![(a, 500, 1), (b, 400, 2)]);
            assert_eq!(board.rank_of_player(quiz_id, b).await.unwrap(), Some(2));
            assert_eq!(board.rank_of_player(quiz_id, UserId::new()).await.unwrap(), None);
        }

        #[tokio::test]
        async fn global_board_adds_up_quizzes() {
            let board = InMemoryLeaderboard::new();
            let (a, b) = (UserId::new(), UserId::new());
            let (first, second) = (QuizId::new(), QuizId::new());
            board.record(&entry(first, a, 300, 0)).await.unwrap();
            board.record(&entry(second, a, 300, 1)).await.unwrap();
            board.record(&entry(first, b, 500, 2)).await.unwrap();

            let rows = board.global_leaderboard(10).await.unwrap();
            assert_eq!(
                rows.iter().map(|r| (r.user_id, r.total_score, r.rank)).collect::<Vec<_>>(),
                vec![(a, 600, 1), (b, 500, 2)]
            );
            assert_eq!(board.global_leaderboard(1).await.unwrap().len(), 1);
        }
    }

    mod browsing {
        use super::*;
        use quizsprint_domain::Tag;

        #[tokio::test]
        async fn filter_by_tag_and_category() {
            let store = InMemoryContent::new();
            let category = CategoryId::new();
            let go = Tag::new("language:go").unwrap();
            let tagged = quiz(3, 100, 15, 0).with_category(category).with_tags([go.clone()]).unwrap();
            QuizRepo::save(&store, &tagged).await.unwrap();
            QuizRepo::save(&store, &quiz(3, 100, 15, 0).with_category(category)).await.unwrap();

            let by_tag = store.find_by_filter(&QuizFilter::new().with_tag(go), 10).await.unwrap();
            assert_eq!(by_tag.iter().map(Quiz::id).collect::<Vec<_>>(), vec![tagged.id()]);

            let by_category = store
                .find_by_filter(&QuizFilter::new().with_category(category), 10)
                .await
                .unwrap();
            assert_eq!(by_category.len(), 2);
        }
    }
}
