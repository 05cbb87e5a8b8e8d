//! Daily game aggregate - one player's attempt at a daily quiz
//!
//! Correctness is withheld while playing: answers only report progress. On the
//! last answer the game completes, the streak advances and the final score is
//! fixed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Quiz;
use crate::error::DomainError;
use crate::events::{DailyAnswerOutcome, DailyEvent, DomainEvent, EventSource};
use crate::ids::{AnswerId, DailyGameId, DailyQuizId, QuestionId, SessionId, UserId};
use crate::kernel::GameplaySession;
use crate::modes::Lifecycle;
use crate::value_objects::GameDate;

use super::chest::{ChestReward, ChestType};
use super::streak::{is_streak_milestone, DailyStreak, StreakBonus};

/// Attempts allowed per player and date (first play plus one retry)
pub const MAX_ATTEMPTS_PER_DAY: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DailyStatus {
    InProgress,
    Completed,
}

impl Lifecycle for DailyStatus {
    fn can_transition_to(&self, next: Self) -> bool {
        matches!((self, next), (Self::InProgress, Self::Completed))
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGame {
    id: DailyGameId,
    player_id: UserId,
    daily_quiz_id: DailyQuizId,
    date: GameDate,
    status: DailyStatus,
    session: GameplaySession,
    /// Streak carried into this attempt
    starting_streak: DailyStreak,
    /// Streak after completion (equal to `starting_streak` while playing)
    streak: DailyStreak,
    rank: Option<u32>,
    chest_reward: Option<ChestReward>,
    attempt: u32,
    question_started_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl DailyGame {
    pub fn new(
        player_id: UserId,
        daily_quiz_id: DailyQuizId,
        date: GameDate,
        quiz: Quiz,
        streak: DailyStreak,
        started_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::start_attempt(player_id, daily_quiz_id, date, quiz, streak, 1, started_at)
    }

    /// Start another attempt on the same date, keeping the original streak.
    pub fn retry(&self, quiz: Quiz, started_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if !self.is_completed() {
            return Err(DomainError::GameNotActive);
        }
        if self.attempt >= MAX_ATTEMPTS_PER_DAY {
            return Err(DomainError::RetryLimitReached {
                max: MAX_ATTEMPTS_PER_DAY,
            });
        }
        Self::start_attempt(
            self.player_id,
            self.daily_quiz_id,
            self.date,
            quiz,
            self.starting_streak,
            self.attempt + 1,
            started_at,
        )
    }

    fn start_attempt(
        player_id: UserId,
        daily_quiz_id: DailyQuizId,
        date: GameDate,
        quiz: Quiz,
        streak: DailyStreak,
        attempt: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if player_id.is_nil() {
            return Err(DomainError::invalid_id("player id must not be nil"));
        }
        if daily_quiz_id.is_nil() {
            return Err(DomainError::invalid_id("daily quiz id must not be nil"));
        }
        let session = GameplaySession::new(SessionId::new(), quiz, started_at)?;

        let mut game = Self {
            id: DailyGameId::new(),
            player_id,
            daily_quiz_id,
            date,
            status: DailyStatus::InProgress,
            session,
            starting_streak: streak,
            streak,
            rank: None,
            chest_reward: None,
            attempt,
            question_started_at: started_at,
            events: Vec::new(),
        };

        game.events.push(
            DailyEvent::GameStarted {
                game_id: game.id,
                player_id,
                daily_quiz_id,
                date,
                current_streak: streak.current(),
                attempt,
                occurred_at: started_at,
            }
            .into(),
        );
        Ok(game)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> DailyGameId {
        self.id
    }

    #[inline]
    pub fn player_id(&self) -> UserId {
        self.player_id
    }

    #[inline]
    pub fn daily_quiz_id(&self) -> DailyQuizId {
        self.daily_quiz_id
    }

    #[inline]
    pub fn date(&self) -> GameDate {
        self.date
    }

    #[inline]
    pub fn status(&self) -> DailyStatus {
        self.status
    }

    #[inline]
    pub fn session(&self) -> &GameplaySession {
        &self.session
    }

    #[inline]
    pub fn streak(&self) -> DailyStreak {
        self.streak
    }

    #[inline]
    pub fn starting_streak(&self) -> DailyStreak {
        self.starting_streak
    }

    #[inline]
    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    #[inline]
    pub fn chest_reward(&self) -> Option<&ChestReward> {
        self.chest_reward.as_ref()
    }

    #[inline]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    #[inline]
    pub fn question_started_at(&self) -> DateTime<Utc> {
        self.question_started_at
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn streak_bonus(&self) -> StreakBonus {
        self.streak.bonus()
    }

    /// `floor(base_score * streak_bonus)`
    pub fn final_score(&self) -> u32 {
        self.streak.bonus().apply(self.session.base_score())
    }

    pub fn correct_answers(&self) -> usize {
        self.session.count_correct()
    }

    pub fn total_questions(&self) -> usize {
        self.session.quiz().question_count()
    }

    pub fn chest_type(&self) -> ChestType {
        ChestType::from_correct_answers(self.correct_answers())
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Record an answer. Correctness is not revealed.
    pub fn answer_question(
        &mut self,
        question_id: QuestionId,
        answer_id: AnswerId,
        time_taken_ms: u32,
        answered_at: DateTime<Utc>,
    ) -> Result<DailyAnswerOutcome, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::GameNotActive);
        }

        self.session
            .answer_question(question_id, answer_id, time_taken_ms, answered_at)?;

        self.events.push(
            DailyEvent::QuestionAnswered {
                game_id: self.id,
                player_id: self.player_id,
                question_id,
                answer_id,
                time_taken_ms,
                occurred_at: answered_at,
            }
            .into(),
        );

        let answered = self.session.current_index();
        let finished = self.session.is_finished();
        if finished {
            self.complete(answered_at)?;
        } else {
            self.question_started_at = answered_at;
        }

        Ok(DailyAnswerOutcome {
            question_index: answered - 1,
            time_taken_ms,
            remaining_questions: self.total_questions().saturating_sub(answered),
            is_game_completed: finished,
        })
    }

    fn complete(&mut self, completed_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.session.finish(completed_at)?;
        self.status = self.status.transition(DailyStatus::Completed)?;

        let previous = self.streak.current();
        self.streak = self.streak.update_for_date(self.date);
        let bonus = self.streak.bonus();

        if is_streak_milestone(self.streak.current()) && self.streak.current() > previous {
            self.events.push(
                DailyEvent::StreakMilestoneReached {
                    game_id: self.id,
                    player_id: self.player_id,
                    streak_days: self.streak.current(),
                    bonus_percent: bonus.extra_percent(),
                    occurred_at: completed_at,
                }
                .into(),
            );
        }

        self.events.push(
            DailyEvent::GameCompleted {
                game_id: self.id,
                player_id: self.player_id,
                daily_quiz_id: self.daily_quiz_id,
                date: self.date,
                final_score: self.final_score(),
                correct_answers: self.correct_answers() as u32,
                total_questions: self.total_questions() as u32,
                new_streak: self.streak.current(),
                streak_bonus: bonus,
                rank: self.rank,
                occurred_at: completed_at,
            }
            .into(),
        );
        Ok(())
    }

    pub fn set_rank(&mut self, rank: u32) {
        self.rank = Some(rank);
    }

    /// Attach the rolled chest. Once attached the stored reward is kept and
    /// returned on every later call.
    pub fn attach_chest(
        &mut self,
        reward: ChestReward,
        occurred_at: DateTime<Utc>,
    ) -> Result<&ChestReward, DomainError> {
        if !self.is_completed() {
            return Err(DomainError::GameNotActive);
        }
        if self.chest_reward.is_none() {
            self.events.push(
                DailyEvent::ChestEarned {
                    game_id: self.id,
                    player_id: self.player_id,
                    date: self.date,
                    reward: reward.clone(),
                    streak_bonus: self.streak.bonus(),
                    occurred_at,
                }
                .into(),
            );
        }
        Ok(self.chest_reward.get_or_insert(reward))
    }
}

impl EventSource for DailyGame {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}
