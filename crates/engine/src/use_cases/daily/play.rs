//! Starting, answering and retrying the daily challenge.

use std::fmt;
use std::sync::Arc;

use quizsprint_domain::content::Question;
use quizsprint_domain::events::DailyAnswerOutcome;
use quizsprint_domain::modes::daily::{ChestReward, DailyGame, DailyStreak, StreakBonus};
use quizsprint_domain::{
    AnswerId, DailyGameId, DomainError, EventSource, GameDate, QuestionId, UserId,
};

use super::quiz::{runtime_quiz, GetOrCreateDailyQuiz};
use super::{roll_chest, DailyError};
use crate::infrastructure::ports::{ClockPort, DailyGameRepo, EventBus, QuestionRepo, RandomPort};
use crate::use_cases::publish;

/// Coins charged for a second attempt on the same day.
pub const RETRY_COST_COINS: u32 = 100;

/// A daily attempt ready to be played.
#[derive(Debug, Clone)]
pub struct DailyStarted {
    pub game_id: DailyGameId,
    pub date: GameDate,
    pub attempt: u32,
    pub total_questions: usize,
    pub question: Option<Question>,
    pub current_streak: u32,
    pub resumed: bool,
}

impl DailyStarted {
    fn from_game(game: &DailyGame, resumed: bool) -> Self {
        Self {
            game_id: game.id(),
            date: game.date(),
            attempt: game.attempt(),
            total_questions: game.total_questions(),
            question: game.session().current_question().cloned(),
            current_streak: game.starting_streak().current(),
            resumed,
        }
    }
}

pub struct StartDaily {
    daily_quiz: Arc<GetOrCreateDailyQuiz>,
    questions: Arc<dyn QuestionRepo>,
    games: Arc<dyn DailyGameRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl StartDaily {
    pub fn new(
        daily_quiz: Arc<GetOrCreateDailyQuiz>,
        questions: Arc<dyn QuestionRepo>,
        games: Arc<dyn DailyGameRepo>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            daily_quiz,
            questions,
            games,
            events,
            clock,
        }
    }

    /// Start today's challenge, or resume an unfinished attempt.
    pub async fn execute(&self, player_id: UserId) -> Result<DailyStarted, DailyError> {
        let now = self.clock.now();
        let today = GameDate::from_datetime(now);

        let attempts = self.games.find_by_player_and_date(player_id, today).await?;
        if let Some(open) = attempts.iter().find(|g| !g.is_completed()) {
            tracing::debug!(game_id = %open.id(), %player_id, "Resuming daily game");
            return Ok(DailyStarted::from_game(open, true));
        }
        if !attempts.is_empty() {
            return Err(DomainError::AlreadyPlayedToday(today).into());
        }

        let streak = self
            .games
            .find_latest_by_player(player_id)
            .await?
            .map(|g| g.streak())
            .unwrap_or_default();

        let daily = self.daily_quiz.execute(today).await?;
        let quiz = runtime_quiz(&daily, self.questions.as_ref()).await?;
        let mut game = DailyGame::new(player_id, daily.id(), today, quiz, streak, now)?;

        self.games.save(&game).await?;
        publish(self.events.as_ref(), game.take_events()).await;

        tracing::info!(
            game_id = %game.id(),
            %player_id,
            date = %today,
            streak = streak.current(),
            "Daily game started"
        );
        Ok(DailyStarted::from_game(&game, false))
    }
}

#[derive(Debug, Clone)]
pub struct DailyAnswerInput {
    pub game_id: DailyGameId,
    pub player_id: UserId,
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
    pub time_taken_ms: u32,
}

/// Revealed once the last question is answered.
#[derive(Debug, Clone)]
pub struct DailyCompletion {
    pub final_score: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub rank: u32,
    pub streak: DailyStreak,
    pub streak_bonus: StreakBonus,
    pub chest: ChestReward,
}

#[derive(Debug, Clone)]
pub struct DailyAnswerResult {
    pub outcome: DailyAnswerOutcome,
    pub next_question: Option<Question>,
    pub completion: Option<DailyCompletion>,
}

pub struct SubmitDailyAnswer {
    games: Arc<dyn DailyGameRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl SubmitDailyAnswer {
    pub fn new(
        games: Arc<dyn DailyGameRepo>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            games,
            events,
            clock,
            random,
        }
    }

    pub async fn execute(&self, input: DailyAnswerInput) -> Result<DailyAnswerResult, DailyError> {
        let mut game = self
            .games
            .get(input.game_id)
            .await?
            .filter(|g| g.player_id() == input.player_id)
            .ok_or(DailyError::GameNotFound(input.game_id))?;

        let now = self.clock.now();
        let outcome = game.answer_question(input.question_id, input.answer_id, input.time_taken_ms, now)?;
        tracing::debug!(
            game_id = %game.id(),
            question_index = outcome.question_index,
            remaining = outcome.remaining_questions,
            "Daily answer recorded"
        );

        let completion = if outcome.is_game_completed {
            let rank = self.games.rank_for_score(game.date(), game.final_score()).await?;
            game.set_rank(rank);
            let chest = roll_chest(&mut game, self.random.as_ref(), now)?;

            tracing::info!(
                game_id = %game.id(),
                player_id = %game.player_id(),
                final_score = game.final_score(),
                correct = game.correct_answers(),
                rank,
                streak = game.streak().current(),
                chest = %chest.chest_type,
                "Daily game completed"
            );
            Some(DailyCompletion {
                final_score: game.final_score(),
                correct_answers: game.correct_answers(),
                total_questions: game.total_questions(),
                rank,
                streak: game.streak(),
                streak_bonus: game.streak_bonus(),
                chest,
            })
        } else {
            None
        };

        self.games.save(&game).await?;
        publish(self.events.as_ref(), game.take_events()).await;

        Ok(DailyAnswerResult {
            outcome,
            next_question: game.session().current_question().cloned(),
            completion,
        })
    }
}

/// How a retry is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPayment {
    Coins,
    Ad,
}

impl RetryPayment {
    pub fn cost_coins(&self) -> u32 {
        match self {
            Self::Coins => RETRY_COST_COINS,
            Self::Ad => 0,
        }
    }
}

impl fmt::Display for RetryPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coins => f.write_str("coins"),
            Self::Ad => f.write_str("ad"),
        }
    }
}

/// Second attempt on today's challenge. The attempt keeps the streak the
/// first attempt started with.
pub struct RetryDaily {
    daily_quiz: Arc<GetOrCreateDailyQuiz>,
    questions: Arc<dyn QuestionRepo>,
    games: Arc<dyn DailyGameRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl RetryDaily {
    pub fn new(
        daily_quiz: Arc<GetOrCreateDailyQuiz>,
        questions: Arc<dyn QuestionRepo>,
        games: Arc<dyn DailyGameRepo>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            daily_quiz,
            questions,
            games,
            events,
            clock,
        }
    }

    pub async fn execute(&self, player_id: UserId, payment: RetryPayment) -> Result<DailyStarted, DailyError> {
        let now = self.clock.now();
        let today = GameDate::from_datetime(now);

        let attempts = self.games.find_by_player_and_date(player_id, today).await?;
        let last = attempts.last().ok_or(DailyError::NoGameOnDate(today))?;

        let daily = self.daily_quiz.execute(today).await?;
        let quiz = runtime_quiz(&daily, self.questions.as_ref()).await?;
        let mut game = last.retry(quiz, now)?;

        self.games.save(&game).await?;
        publish(self.events.as_ref(), game.take_events()).await;

        tracing::info!(
            game_id = %game.id(),
            %player_id,
            attempt = game.attempt(),
            %payment,
            cost_coins = payment.cost_coins(),
            "Daily retry started"
        );
        Ok(DailyStarted::from_game(&game, false))
    }
}
