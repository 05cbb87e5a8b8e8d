//! Start a classic run, or resume the player's open run on the same quiz.

use std::sync::Arc;

use quizsprint_domain::content::Question;
use quizsprint_domain::modes::classic::ClassicGame;
use quizsprint_domain::{ClassicGameId, EventSource, QuizId, UserId};

use super::ClassicError;
use crate::infrastructure::ports::{ClassicGameRepo, ClockPort, EventBus, PersonalBestRepo, QuizRepo};
use crate::use_cases::publish;

/// Result of starting a classic run.
#[derive(Debug, Clone)]
pub struct ClassicStarted {
    pub game_id: ClassicGameId,
    pub quiz_id: QuizId,
    pub total_questions: usize,
    /// Next question to answer; the first one for a fresh run
    pub question: Option<Question>,
    pub personal_best_score: Option<u32>,
    pub resumed: bool,
}

pub struct StartClassic {
    quizzes: Arc<dyn QuizRepo>,
    games: Arc<dyn ClassicGameRepo>,
    personal_bests: Arc<dyn PersonalBestRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl StartClassic {
    pub fn new(
        quizzes: Arc<dyn QuizRepo>,
        games: Arc<dyn ClassicGameRepo>,
        personal_bests: Arc<dyn PersonalBestRepo>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            quizzes,
            games,
            personal_bests,
            events,
            clock,
        }
    }

    pub async fn execute(&self, player_id: UserId, quiz_id: QuizId) -> Result<ClassicStarted, ClassicError> {
        let open = self.games.list_active_by_player(player_id).await?;
        if let Some(open) = open.iter().find(|g| g.quiz_id() == quiz_id) {
            tracing::debug!(game_id = %open.id(), %player_id, "Resuming classic game");
            return Ok(started(open, true));
        }

        let quiz = self
            .quizzes
            .get(quiz_id)
            .await?
            .ok_or(ClassicError::QuizNotFound(quiz_id))?;
        let personal_best = self.personal_bests.get(player_id, quiz_id).await?;

        let mut game = ClassicGame::new(player_id, quiz, personal_best.as_ref(), self.clock.now())?;
        self.games.save(&game).await?;
        publish(self.events.as_ref(), game.take_events()).await;

        tracing::info!(
            game_id = %game.id(),
            %player_id,
            %quiz_id,
            has_personal_best = personal_best.is_some(),
            "Classic game started"
        );
        Ok(started(&game, false))
    }
}

fn started(game: &ClassicGame, resumed: bool) -> ClassicStarted {
    ClassicStarted {
        game_id: game.id(),
        quiz_id: game.quiz_id(),
        total_questions: game.quiz().question_count(),
        question: game.session().current_question().cloned(),
        personal_best_score: game.personal_best_score(),
        resumed,
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory::InMemoryEventBus;
    use crate::infrastructure::ports::{MockClassicGameRepo, MockPersonalBestRepo, MockQuizRepo};
    use crate::test_fixtures::{now, quiz};

    fn use_case(
        quizzes: MockQuizRepo,
        games: MockClassicGameRepo,
        personal_bests: MockPersonalBestRepo,
    ) -> (StartClassic, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let start = StartClassic::new(
            Arc::new(quizzes),
            Arc::new(games),
            Arc::new(personal_bests),
            bus.clone(),
            Arc::new(FixedClock(now())),
        );
        (start, bus)
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let mut quizzes = MockQuizRepo::new();
        quizzes.expect_get().returning(|_| Ok(None));
        let mut games = MockClassicGameRepo::new();
        games.expect_list_active_by_player().returning(|_| Ok(Vec::new()));

        let (start, _) = use_case(quizzes, games, MockPersonalBestRepo::new());
        let err = start.execute(UserId::new(), QuizId::new()).await.unwrap_err();

        assert!(matches!(err, ClassicError::QuizNotFound(_)));
    }

    #[tokio::test]
    async fn new_game_is_saved_and_announced() {
        let q = quiz(5, 100, 15, 50);
        let quiz_id = q.id();
        let first = q.questions()[0].id();
        let player = UserId::new();

        let mut quizzes = MockQuizRepo::new();
        quizzes
            .expect_get()
            .with(eq(quiz_id))
            .returning(move |_| Ok(Some(q.clone())));
        let mut games = MockClassicGameRepo::new();
        games.expect_list_active_by_player().returning(|_| Ok(Vec::new()));
        games
            .expect_save()
            .withf(move |g| g.player_id() == player)
            .times(1)
            .returning(|_| Ok(()));
        let mut personal_bests = MockPersonalBestRepo::new();
        personal_bests.expect_get().returning(|_, _| Ok(None));

        let (start, bus) = use_case(quizzes, games, personal_bests);
        let started = start.execute(player, quiz_id).await.unwrap();

        assert!(!started.resumed);
        assert_eq!(started.total_questions, 5);
        assert_eq!(started.question.map(|q| q.id()), Some(first));
        assert_eq!(bus.event_types().await, vec!["classic.game_started"]);
    }

    #[tokio::test]
    async fn open_game_on_same_quiz_is_resumed() {
        let q = quiz(5, 100, 15, 50);
        let quiz_id = q.id();
        let player = UserId::new();
        let open = ClassicGame::new(player, q, None, now()).unwrap();
        let open_id = open.id();
        let elsewhere = ClassicGame::new(player, quiz(3, 100, 15, 0), None, now()).unwrap();

        let mut games = MockClassicGameRepo::new();
        games
            .expect_list_active_by_player()
            .returning(move |_| Ok(vec![elsewhere.clone(), open.clone()]));

        let (start, bus) = use_case(MockQuizRepo::new(), games, MockPersonalBestRepo::new());
        let started = start.execute(player, quiz_id).await.unwrap();

        assert!(started.resumed);
        assert_eq!(started.game_id, open_id);
        assert!(bus.event_types().await.is_empty());
    }
}
