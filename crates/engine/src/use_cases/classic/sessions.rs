//! Open classic runs: list them, look one up, or give one up.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use quizsprint_domain::content::Question;
use quizsprint_domain::modes::classic::ClassicGame;
use quizsprint_domain::{ClassicGameId, DomainError, QuizId, UserId};

use super::ClassicError;
use crate::infrastructure::ports::ClassicGameRepo;

/// One open run as shown in the player's "continue playing" list.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRunSummary {
    pub game_id: ClassicGameId,
    pub quiz_id: QuizId,
    pub quiz_title: String,
    pub answered: usize,
    pub total_questions: usize,
    pub total_score: u32,
    pub started_at: DateTime<Utc>,
}

/// Where an open run stands, with the question to answer next.
#[derive(Debug, Clone)]
pub struct ActiveRun {
    pub summary: ActiveRunSummary,
    pub question: Option<Question>,
    pub current_streak: u32,
}

fn summary(game: &ClassicGame) -> ActiveRunSummary {
    ActiveRunSummary {
        game_id: game.id(),
        quiz_id: game.quiz_id(),
        quiz_title: game.quiz().title().as_str().to_string(),
        answered: game.session().answers().len(),
        total_questions: game.quiz().question_count(),
        total_score: game.total_score(),
        started_at: game.session().started_at(),
    }
}

pub struct ListActiveClassic {
    games: Arc<dyn ClassicGameRepo>,
}

impl ListActiveClassic {
    pub fn new(games: Arc<dyn ClassicGameRepo>) -> Self {
        Self { games }
    }

    /// Newest first.
    pub async fn execute(&self, player_id: UserId) -> Result<Vec<ActiveRunSummary>, ClassicError> {
        let open = self.games.list_active_by_player(player_id).await?;
        Ok(open.iter().map(summary).collect())
    }
}

pub struct GetActiveClassic {
    games: Arc<dyn ClassicGameRepo>,
}

impl GetActiveClassic {
    pub fn new(games: Arc<dyn ClassicGameRepo>) -> Self {
        Self { games }
    }

    /// The player's open run on `quiz_id`, if any.
    pub async fn execute(&self, player_id: UserId, quiz_id: QuizId) -> Result<Option<ActiveRun>, ClassicError> {
        let open = self.games.list_active_by_player(player_id).await?;
        Ok(open.iter().find(|g| g.quiz_id() == quiz_id).map(|game| ActiveRun {
            summary: summary(game),
            question: game.session().current_question().cloned(),
            current_streak: game.current_streak(),
        }))
    }
}

pub struct AbandonClassic {
    games: Arc<dyn ClassicGameRepo>,
}

impl AbandonClassic {
    pub fn new(games: Arc<dyn ClassicGameRepo>) -> Self {
        Self { games }
    }

    /// Drop an unfinished run. Nothing reaches the leaderboard or personal bests.
    pub async fn execute(&self, player_id: UserId, game_id: ClassicGameId) -> Result<(), ClassicError> {
        let game = self
            .games
            .get(game_id)
            .await?
            .filter(|g| g.player_id() == player_id)
            .ok_or(ClassicError::GameNotFound(game_id))?;
        if game.is_finished() {
            return Err(DomainError::GameFinished.into());
        }

        self.games.delete(game_id).await?;
        tracing::info!(
            %game_id,
            %player_id,
            answered = game.session().answers().len(),
            "Classic game abandoned"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::infrastructure::memory::InMemoryClassicGames;
    use crate::infrastructure::ports::MockClassicGameRepo;
    use crate::test_fixtures::{correct_id, now, quiz};

    fn run_with_one_answer(player: UserId) -> ClassicGame {
        let mut game = ClassicGame::new(player, quiz(3, 100, 15, 0), None, now()).unwrap();
        let first = game.quiz().questions()[0].clone();
        game.submit_answer(first.id(), correct_id(&first), 1_000, now() + Duration::seconds(1))
            .unwrap();
        game
    }

    mod listing {
        use super::*;

        #[tokio::test]
        async fn summaries_show_progress() {
            let games = Arc::new(InMemoryClassicGames::new());
            let player = UserId::new();
            let game = run_with_one_answer(player);
            games.save(&game).await.unwrap();

            let listed = ListActiveClassic::new(games).execute(player).await.unwrap();

            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].game_id, game.id());
            assert_eq!((listed[0].answered, listed[0].total_questions), (1, 3));
            assert_eq!(listed[0].total_score, game.total_score());
            assert_eq!(listed[0].quiz_title, "Space trivia");
        }

        #[tokio::test]
        async fn active_run_points_at_the_next_question() {
            let games = Arc::new(InMemoryClassicGames::new());
            let player = UserId::new();
            let game = run_with_one_answer(player);
            let second = game.quiz().questions()[1].id();
            games.save(&game).await.unwrap();
            let lookup = GetActiveClassic::new(games);

            let run = lookup.execute(player, game.quiz_id()).await.unwrap().unwrap();
            assert_eq!(run.question.map(|q| q.id()), Some(second));
            assert_eq!(run.current_streak, 1);

            assert!(lookup.execute(player, QuizId::new()).await.unwrap().is_none());
        }
    }

    mod abandoning {
        use super::*;

        #[tokio::test]
        async fn open_run_is_removed() {
            let games = Arc::new(InMemoryClassicGames::new());
            let player = UserId::new();
            let game = run_with_one_answer(player);
            games.save(&game).await.unwrap();

            AbandonClassic::new(games.clone()).execute(player, game.id()).await.unwrap();

            assert!(games.get(game.id()).await.unwrap().is_none());
            assert!(games.list_active_by_player(player).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn someone_elses_run_is_not_found() {
            let game = run_with_one_answer(UserId::new());
            let game_id = game.id();
            let mut games = MockClassicGameRepo::new();
            games.expect_get().returning(move |_| Ok(Some(game.clone())));
            games.expect_delete().never();

            let err = AbandonClassic::new(Arc::new(games))
                .execute(UserId::new(), game_id)
                .await
                .unwrap_err();
            assert!(matches!(err, ClassicError::GameNotFound(id) if id == game_id));
        }

        #[tokio::test]
        async fn finished_run_is_kept() {
            let player = UserId::new();
            let mut game = ClassicGame::new(player, quiz(1, 100, 15, 0), None, now()).unwrap();
            let only = game.quiz().questions()[0].clone();
            game.submit_answer(only.id(), correct_id(&only), 1_000, now()).unwrap();
            game.finish(now()).unwrap();
            let game_id = game.id();
            let mut games = MockClassicGameRepo::new();
            games.expect_get().returning(move |_| Ok(Some(game.clone())));
            games.expect_delete().never();

            let err = AbandonClassic::new(Arc::new(games))
                .execute(player, game_id)
                .await
                .unwrap_err();
            assert!(matches!(err, ClassicError::Domain(DomainError::GameFinished)));
        }
    }
}
