//! In-memory classic mode storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quizsprint_domain::modes::classic::{ClassicGame, PersonalBest};
use quizsprint_domain::{ClassicGameId, QuizId, UserId};

use super::stored;
use crate::infrastructure::ports::{ClassicGameRepo, PersonalBestRepo, RepoError};

#[derive(Default)]
pub struct InMemoryClassicGames {
    games: RwLock<HashMap<ClassicGameId, ClassicGame>>,
}

impl InMemoryClassicGames {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClassicGameRepo for InMemoryClassicGames {
    async fn get(&self, id: ClassicGameId) -> Result<Option<ClassicGame>, RepoError> {
        Ok(self.games.read().await.get(&id).cloned())
    }

    async fn save(&self, game: &ClassicGame) -> Result<(), RepoError> {
        self.games.write().await.insert(game.id(), stored(game));
        Ok(())
    }

    async fn delete(&self, id: ClassicGameId) -> Result<(), RepoError> {
        self.games.write().await.remove(&id);
        Ok(())
    }

    async fn list_active_by_player(&self, player_id: UserId) -> Result<Vec<ClassicGame>, RepoError> {
        let mut open: Vec<ClassicGame> = self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.player_id() == player_id && !g.is_finished())
            .cloned()
            .collect();
        open.sort_by(|a, b| b.session().started_at().cmp(&a.session().started_at()));
        Ok(open)
    }
}

#[derive(Default)]
pub struct InMemoryPersonalBests {
    bests: RwLock<HashMap<(UserId, QuizId), PersonalBest>>,
}

impl InMemoryPersonalBests {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonalBestRepo for InMemoryPersonalBests {
    async fn get(&self, player_id: UserId, quiz_id: QuizId) -> Result<Option<PersonalBest>, RepoError> {
        Ok(self.bests.read().await.get(&(player_id, quiz_id)).cloned())
    }

    async fn save(&self, best: &PersonalBest) -> Result<(), RepoError> {
        self.bests
            .write()
            .await
            .insert((best.player_id(), best.quiz_id()), stored(best));
        Ok(())
    }

    async fn delete(&self, player_id: UserId, quiz_id: QuizId) -> Result<(), RepoError> {
        self.bests.write().await.remove(&(player_id, quiz_id));
        Ok(())
    }
}
