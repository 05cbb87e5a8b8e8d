//! Classic game aggregate
//!
//! Wraps a kernel session and adds the streak multiplier, time bonus and ghost
//! comparison against the player's personal best.
//!
//! The multiplier-adjusted running total is what gets persisted; in-flight
//! display, final tally and personal best all read the same number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Quiz;
use crate::error::DomainError;
use crate::events::{ClassicAnswerOutcome, ClassicEvent, ClassicFinishOutcome, DomainEvent, EventSource};
use crate::ids::{AnswerId, ClassicGameId, QuestionId, QuizId, SessionId, UserId};
use crate::kernel::GameplaySession;
use crate::modes::Lifecycle;

use super::personal_best::PersonalBest;
use super::streak::{is_streak_milestone, Multiplier, VisualState};

/// Classic game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassicStatus {
    InProgress,
    Finished,
}

impl Lifecycle for ClassicStatus {
    fn can_transition_to(&self, next: Self) -> bool {
        matches!((self, next), (Self::InProgress, Self::Finished))
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Time bonus for a correct answer:
/// `floor(max_bonus * max(0, 1 - time_taken / time_limit))`.
pub fn time_bonus(max_bonus: u32, time_taken_ms: u32, time_limit_ms: u64) -> u32 {
    let taken = u64::from(time_taken_ms);
    if time_limit_ms == 0 || taken >= time_limit_ms {
        return 0;
    }
    (u64::from(max_bonus) * (time_limit_ms - taken) / time_limit_ms) as u32
}

/// A single-player Classic run over one quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassicGame {
    id: ClassicGameId,
    player_id: UserId,
    quiz_id: QuizId,
    status: ClassicStatus,
    session: GameplaySession,
    current_streak: u32,
    max_streak: u32,
    multiplier: Multiplier,
    total_score: u32,
    /// Running total after each answer, in answer order
    score_trace: Vec<u32>,
    personal_best_score: Option<u32>,
    personal_best_trace: Vec<u32>,
    ghost_diff: i64,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl ClassicGame {
    /// Start a new Classic game for `player_id`.
    pub fn new(
        player_id: UserId,
        quiz: Quiz,
        personal_best: Option<&PersonalBest>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if player_id.is_nil() {
            return Err(DomainError::invalid_id("player id must not be nil"));
        }
        let quiz_id = quiz.id();
        let session = GameplaySession::new(SessionId::new(), quiz, started_at)?;

        let mut game = Self {
            id: ClassicGameId::new(),
            player_id,
            quiz_id,
            status: ClassicStatus::InProgress,
            session,
            current_streak: 0,
            max_streak: 0,
            multiplier: Multiplier::Normal,
            total_score: 0,
            score_trace: Vec::new(),
            personal_best_score: personal_best.map(PersonalBest::best_score),
            personal_best_trace: personal_best
                .map(|pb| pb.score_by_question().to_vec())
                .unwrap_or_default(),
            ghost_diff: 0,
            events: Vec::new(),
        };

        game.events.push(
            ClassicEvent::GameStarted {
                game_id: game.id,
                player_id,
                quiz_id,
                has_personal_best: game.personal_best_score.is_some(),
                personal_best_score: game.personal_best_score,
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
    pub fn id(&self) -> ClassicGameId {
        self.id
    }

    #[inline]
    pub fn player_id(&self) -> UserId {
        self.player_id
    }

    #[inline]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[inline]
    pub fn status(&self) -> ClassicStatus {
        self.status
    }

    #[inline]
    pub fn session(&self) -> &GameplaySession {
        &self.session
    }

    #[inline]
    pub fn quiz(&self) -> &Quiz {
        self.session.quiz()
    }

    #[inline]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[inline]
    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    #[inline]
    pub fn multiplier(&self) -> Multiplier {
        self.multiplier
    }

    #[inline]
    pub fn visual_state(&self) -> VisualState {
        VisualState::from_streak(self.current_streak)
    }

    /// Multiplier-adjusted score so far.
    #[inline]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    #[inline]
    pub fn score_trace(&self) -> &[u32] {
        &self.score_trace
    }

    #[inline]
    pub fn personal_best_score(&self) -> Option<u32> {
        self.personal_best_score
    }

    #[inline]
    pub fn ghost_diff(&self) -> i64 {
        self.ghost_diff
    }

    pub fn is_finished(&self) -> bool {
        self.status == ClassicStatus::Finished
    }

    /// Running total after each question, padded to the quiz length.
    pub fn score_by_question(&self) -> Vec<u32> {
        let count = self.session.quiz().question_count();
        let mut trace = self.score_trace.clone();
        let last = trace.last().copied().unwrap_or(0);
        trace.resize(count.max(trace.len()), last);
        trace
    }

    /// Whether the final score reaches the quiz's passing percentage.
    pub fn has_passed(&self) -> bool {
        self.is_finished() && self.session.quiz().has_passed(self.total_score)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Submit an answer to a question of this game's quiz.
    pub fn submit_answer(
        &mut self,
        question_id: QuestionId,
        answer_id: AnswerId,
        time_taken_ms: u32,
        answered_at: DateTime<Utc>,
    ) -> Result<ClassicAnswerOutcome, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::GameFinished);
        }

        let kernel = self
            .session
            .answer_question(question_id, answer_id, time_taken_ms, answered_at)?;

        let mut bonus = 0;
        let mut total_points = 0;

        if kernel.is_correct {
            let quiz = self.session.quiz();
            bonus = time_bonus(quiz.max_time_bonus(), time_taken_ms, quiz.time_limit().millis());

            self.current_streak += 1;
            self.max_streak = self.max_streak.max(self.current_streak);

            // Points use the multiplier earned before this answer.
            let previous = self.multiplier;
            total_points = previous.apply(kernel.base_points + bonus);
            self.multiplier = Multiplier::from_streak(self.current_streak);

            if is_streak_milestone(self.current_streak) && self.multiplier != previous {
                self.events.push(
                    ClassicEvent::StreakMilestoneReached {
                        game_id: self.id,
                        player_id: self.player_id,
                        streak: self.current_streak,
                        visual_state: self.visual_state(),
                        multiplier: self.multiplier,
                        occurred_at: answered_at,
                    }
                    .into(),
                );
            }
        } else {
            if self.current_streak > 0 {
                self.events.push(
                    ClassicEvent::StreakBroken {
                        game_id: self.id,
                        player_id: self.player_id,
                        previous_streak: self.current_streak,
                        question_id,
                        occurred_at: answered_at,
                    }
                    .into(),
                );
            }
            self.current_streak = 0;
            self.multiplier = Multiplier::Normal;
        }

        self.total_score += total_points;
        self.score_trace.push(self.total_score);
        self.update_ghost();

        Ok(ClassicAnswerOutcome {
            is_correct: kernel.is_correct,
            base_points: kernel.base_points,
            time_bonus: bonus,
            multiplier: self.multiplier,
            total_points,
            current_streak: self.current_streak,
            max_streak: self.max_streak,
            visual_state: self.visual_state(),
            ghost_diff: self.ghost_diff,
            is_game_finished: self.session.is_finished(),
        })
    }

    /// Freeze the game and decide whether the run is a new personal best.
    pub fn finish(&mut self, finished_at: DateTime<Utc>) -> Result<ClassicFinishOutcome, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::GameFinished);
        }
        self.session.finish(finished_at)?;
        self.status = self.status.transition(ClassicStatus::Finished)?;

        let passed = self.has_passed();
        let is_new_personal_best =
            passed && self.personal_best_score.map_or(true, |pb| self.total_score > pb);

        self.events.push(
            ClassicEvent::GameFinished {
                game_id: self.id,
                player_id: self.player_id,
                quiz_id: self.quiz_id,
                final_score: self.total_score,
                max_streak: self.max_streak,
                is_new_personal_best,
                occurred_at: finished_at,
            }
            .into(),
        );

        Ok(ClassicFinishOutcome {
            final_score: self.total_score,
            max_streak: self.max_streak,
            accuracy: self.session.accuracy(),
            passed,
            is_new_personal_best,
        })
    }

    /// Ghost comparison against the personal-best trace at the same index,
    /// falling back to the personal-best total past the end of the trace.
    fn update_ghost(&mut self) {
        let Some(best) = self.personal_best_score else {
            self.ghost_diff = 0;
            return;
        };
        let index = self.score_trace.len().saturating_sub(1);
        let reference = self.personal_best_trace.get(index).copied().unwrap_or(best);
        self.ghost_diff = i64::from(self.total_score) - i64::from(reference);
    }
}

impl EventSource for ClassicGame {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}
