//! In-memory daily challenge storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quizsprint_domain::modes::daily::{DailyGame, DailyQuiz};
use quizsprint_domain::value_objects::GameDate;
use quizsprint_domain::{DailyGameId, DailyQuizId, UserId};

use super::stored;
use crate::infrastructure::ports::{DailyGameRepo, DailyQuizRepo, RepoError};

#[derive(Default)]
pub struct InMemoryDailyQuizzes {
    quizzes: RwLock<HashMap<DailyQuizId, DailyQuiz>>,
}

impl InMemoryDailyQuizzes {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DailyQuizRepo for InMemoryDailyQuizzes {
    async fn get(&self, id: DailyQuizId) -> Result<Option<DailyQuiz>, RepoError> {
        Ok(self.quizzes.read().await.get(&id).cloned())
    }

    async fn save(&self, quiz: &DailyQuiz) -> Result<(), RepoError> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes
            .values()
            .any(|q| q.date() == quiz.date() && q.id() != quiz.id())
        {
            return Err(RepoError::constraint(format!(
                "daily quiz for {} already exists",
                quiz.date()
            )));
        }
        quizzes.insert(quiz.id(), stored(quiz));
        Ok(())
    }

    async fn delete(&self, id: DailyQuizId) -> Result<(), RepoError> {
        self.quizzes.write().await.remove(&id);
        Ok(())
    }

    async fn find_by_date(&self, date: GameDate) -> Result<Option<DailyQuiz>, RepoError> {
        Ok(self
            .quizzes
            .read()
            .await
            .values()
            .find(|q| q.date() == date)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryDailyGames {
    games: RwLock<HashMap<DailyGameId, DailyGame>>,
}

impl InMemoryDailyGames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best completed game per player on `date`, best first.
    async fn standings(&self, date: GameDate) -> Vec<DailyGame> {
        let games = self.games.read().await;
        let mut best: HashMap<UserId, &DailyGame> = HashMap::new();
        for game in games.values().filter(|g| g.date() == date && g.is_completed()) {
            best.entry(game.player_id())
                .and_modify(|current| {
                    if game.final_score() > current.final_score() {
                        *current = game;
                    }
                })
                .or_insert(game);
        }
        let mut rows: Vec<DailyGame> = best.into_values().cloned().collect();
        rows.sort_by(|a, b| {
            b.final_score()
                .cmp(&a.final_score())
                .then_with(|| a.session().finished_at().cmp(&b.session().finished_at()))
                .then_with(|| a.id().cmp(&b.id()))
        });
        rows
    }
}

#[async_trait]
impl DailyGameRepo for InMemoryDailyGames {
    async fn get(&self, id: DailyGameId) -> Result<Option<DailyGame>, RepoError> {
        Ok(self.games.read().await.get(&id).cloned())
    }

    async fn save(&self, game: &DailyGame) -> Result<(), RepoError> {
        self.games.write().await.insert(game.id(), stored(game));
        Ok(())
    }

    async fn delete(&self, id: DailyGameId) -> Result<(), RepoError> {
        self.games.write().await.remove(&id);
        Ok(())
    }

    async fn find_by_player_and_date(
        &self,
        player_id: UserId,
        date: GameDate,
    ) -> Result<Vec<DailyGame>, RepoError> {
        let mut games: Vec<DailyGame> = self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.player_id() == player_id && g.date() == date)
            .cloned()
            .collect();
        games.sort_by_key(|g| g.attempt());
        Ok(games)
    }

    async fn find_latest_by_player(&self, player_id: UserId) -> Result<Option<DailyGame>, RepoError> {
        Ok(self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.player_id() == player_id)
            .max_by_key(|g| (g.date(), g.attempt(), g.session().started_at()))
            .cloned())
    }

    async fn top_by_date(&self, date: GameDate, limit: usize) -> Result<Vec<DailyGame>, RepoError> {
        let mut rows = self.standings(date).await;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn rank_for_score(&self, date: GameDate, final_score: u32) -> Result<u32, RepoError> {
        let better = self
            .standings(date)
            .await
            .iter()
            .filter(|g| g.final_score() > final_score)
            .count();
        Ok(better as u32 + 1)
    }
}
