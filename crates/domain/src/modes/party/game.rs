//! Party game aggregate - round-by-round play for everyone in a room
//!
//! Players answer independently; a round completes once every player has
//! submitted, which is the only synchronization point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Question;
use crate::error::DomainError;
use crate::events::{DomainEvent, EventSource, PartyAnswerOutcome, PartyEvent};
use crate::ids::{AnswerId, PartyGameId, PartyRoomId, QuestionId, UserId};
use crate::modes::Lifecycle;

use super::room::RoomPlayer;
use super::settings::{MAX_QUESTIONS, MIN_PLAYERS};

/// Points for any correct answer before bonuses
pub const BASE_POINTS_CORRECT: u32 = 100;

/// Bonus for answering fast, in bracketed steps.
pub fn speed_bonus(time_taken_ms: u32) -> u32 {
    match time_taken_ms {
        0..=2000 => 75,
        2001..=4000 => 50,
        4001..=6000 => 35,
        6001..=8000 => 20,
        8001..=10000 => 10,
        _ => 0,
    }
}

/// Bonus for the order among correct answers on one question (1-based).
pub fn position_bonus(position: usize) -> u32 {
    match position {
        1 => 25,
        2 => 15,
        3 => 10,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartyGameStatus {
    InProgress,
    Finished,
}

impl Lifecycle for PartyGameStatus {
    fn can_transition_to(&self, next: Self) -> bool {
        matches!((self, next), (Self::InProgress, Self::Finished))
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// In-game player record (immutable value, re-bound on every answer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyPlayer {
    user_id: UserId,
    username: String,
    score: u32,
    correct_count: u32,
    answers_count: u32,
}

impl PartyPlayer {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            score: 0,
            correct_count: 0,
            answers_count: 0,
        }
    }

    #[must_use]
    pub fn with_answer(&self, is_correct: bool, points: u32) -> Self {
        Self {
            score: self.score + points,
            correct_count: self.correct_count + u32::from(is_correct),
            answers_count: self.answers_count + 1,
            ..self.clone()
        }
    }

    #[inline]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[inline]
    pub fn answers_count(&self) -> u32 {
        self.answers_count
    }
}

/// One submission within a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyAnswer {
    pub player_id: UserId,
    pub answer_id: AnswerId,
    pub is_correct: bool,
    pub time_taken_ms: u32,
    pub points: u32,
    /// Rank among correct answers, 0 when wrong
    pub position: usize,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyGame {
    id: PartyGameId,
    room_id: PartyRoomId,
    question_ids: Vec<QuestionId>,
    players: Vec<PartyPlayer>,
    current_question: usize,
    /// Submissions per question index
    answers: Vec<Vec<PartyAnswer>>,
    status: PartyGameStatus,
    winner_id: Option<UserId>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl PartyGame {
    /// Start a game for the room's current players and open the first question.
    pub fn new(
        room_id: PartyRoomId,
        question_ids: Vec<QuestionId>,
        room_players: &[RoomPlayer],
        started_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if question_ids.is_empty() {
            return Err(DomainError::validation("Party game needs at least one question"));
        }
        if question_ids.len() > MAX_QUESTIONS {
            return Err(DomainError::validation(format!(
                "Party game allows at most {} questions, got {}",
                MAX_QUESTIONS,
                question_ids.len()
            )));
        }
        if room_players.len() < MIN_PLAYERS {
            return Err(DomainError::NotEnoughPlayers {
                required: MIN_PLAYERS,
                actual: room_players.len(),
            });
        }

        let players: Vec<PartyPlayer> = room_players
            .iter()
            .map(|p| PartyPlayer::new(p.user_id(), p.username()))
            .collect();

        let mut game = Self {
            id: PartyGameId::new(),
            room_id,
            answers: vec![Vec::new(); question_ids.len()],
            question_ids,
            players,
            current_question: 0,
            status: PartyGameStatus::InProgress,
            winner_id: None,
            started_at,
            finished_at: None,
            events: Vec::new(),
        };

        game.events.push(
            PartyEvent::GameStarted {
                game_id: game.id,
                room_id,
                player_ids: game.players.iter().map(|p| p.user_id).collect(),
                question_ids: game.question_ids.clone(),
                occurred_at: started_at,
            }
            .into(),
        );
        game.push_question_started(started_at);
        Ok(game)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> PartyGameId {
        self.id
    }

    #[inline]
    pub fn room_id(&self) -> PartyRoomId {
        self.room_id
    }

    #[inline]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    #[inline]
    pub fn players(&self) -> &[PartyPlayer] {
        &self.players
    }

    #[inline]
    pub fn status(&self) -> PartyGameStatus {
        self.status
    }

    #[inline]
    pub fn current_question_index(&self) -> usize {
        self.current_question
    }

    /// 1-based number of the open question
    #[inline]
    pub fn question_number(&self) -> usize {
        self.current_question + 1
    }

    #[inline]
    pub fn winner_id(&self) -> Option<UserId> {
        self.winner_id
    }

    #[inline]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[inline]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn current_question_id(&self) -> Option<QuestionId> {
        self.question_ids.get(self.current_question).copied()
    }

    pub fn answers_for(&self, question_index: usize) -> &[PartyAnswer] {
        self.answers.get(question_index).map_or(&[], Vec::as_slice)
    }

    pub fn player(&self, player_id: UserId) -> Option<&PartyPlayer> {
        self.players.iter().find(|p| p.user_id == player_id)
    }

    pub fn has_player(&self, player_id: UserId) -> bool {
        self.player(player_id).is_some()
    }

    /// Players sorted by score, highest first; ties keep join order.
    pub fn standings(&self) -> Vec<&PartyPlayer> {
        let mut ranked: Vec<&PartyPlayer> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Record a player's answer to the open question.
    ///
    /// `question` must be the open question; the caller loads it by
    /// [`Self::current_question_id`].
    pub fn submit_answer(
        &mut self,
        player_id: UserId,
        answer_id: AnswerId,
        time_taken_ms: u32,
        question: &Question,
        answered_at: DateTime<Utc>,
    ) -> Result<PartyAnswerOutcome, DomainError> {
        if self.status != PartyGameStatus::InProgress {
            return Err(DomainError::GameNotActive);
        }
        let player_index = self
            .players
            .iter()
            .position(|p| p.user_id == player_id)
            .ok_or(DomainError::PlayerNotFound(player_id))?;
        let round = self.current_question;
        if self.answers[round].iter().any(|a| a.player_id == player_id) {
            return Err(DomainError::PlayerAlreadyAnswered(player_id));
        }
        if Some(question.id()) != self.current_question_id() {
            return Err(DomainError::QuestionNotInQuiz(question.id()));
        }
        let is_correct = question.is_correct_answer(answer_id)?;

        let (points, position) = if is_correct {
            let position = self.answers[round].iter().filter(|a| a.is_correct).count() + 1;
            (
                BASE_POINTS_CORRECT + speed_bonus(time_taken_ms) + position_bonus(position),
                position,
            )
        } else {
            (0, 0)
        };

        self.answers[round].push(PartyAnswer {
            player_id,
            answer_id,
            is_correct,
            time_taken_ms,
            points,
            position,
            answered_at,
        });
        self.players[player_index] = self.players[player_index].with_answer(is_correct, points);
        let player_score = self.players[player_index].score;
        let question_number = self.question_number();

        self.events.push(
            PartyEvent::PlayerAnswered {
                game_id: self.id,
                player_id,
                question_id: question.id(),
                answer_id,
                is_correct,
                time_taken_ms,
                points_earned: points,
                position,
                occurred_at: answered_at,
            }
            .into(),
        );

        let all_answered = self.answers[round].len() == self.players.len();
        if all_answered {
            self.complete_question(answered_at)?;
        }

        Ok(PartyAnswerOutcome {
            is_correct,
            points_earned: points,
            position,
            player_score,
            question_number,
            all_answered,
            is_game_finished: self.status == PartyGameStatus::Finished,
            winner_id: self.winner_id,
        })
    }

    fn complete_question(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        let question_id = self.question_ids[self.current_question];
        self.events.push(
            PartyEvent::QuestionCompleted {
                game_id: self.id,
                question_id,
                question_number: self.question_number(),
                occurred_at: at,
            }
            .into(),
        );

        if self.current_question + 1 >= self.question_ids.len() {
            self.finish(at)
        } else {
            self.current_question += 1;
            self.push_question_started(at);
            Ok(())
        }
    }

    fn finish(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.status = self.status.transition(PartyGameStatus::Finished)?;
        self.finished_at = Some(at);

        // First player in join order wins a tie.
        let mut winner: Option<&PartyPlayer> = None;
        for player in &self.players {
            if winner.map_or(true, |w| player.score > w.score) {
                winner = Some(player);
            }
        }
        self.winner_id = winner.map(|p| p.user_id);

        self.events.push(
            PartyEvent::GameFinished {
                game_id: self.id,
                room_id: self.room_id,
                winner_id: self.winner_id,
                players: self.players.clone(),
                occurred_at: at,
            }
            .into(),
        );
        Ok(())
    }

    fn push_question_started(&mut self, at: DateTime<Utc>) {
        let question_id = self.question_ids[self.current_question];
        self.events.push(
            PartyEvent::QuestionStarted {
                game_id: self.id,
                question_id,
                question_number: self.question_number(),
                occurred_at: at,
            }
            .into(),
        );
    }
}

impl EventSource for PartyGame {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}
