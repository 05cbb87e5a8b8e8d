//! Quick duel aggregate - seven synchronized rounds between two players

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Question;
use crate::error::DomainError;
use crate::events::{DomainEvent, DuelAnswerOutcome, DuelEvent, EventSource};
use crate::ids::{AnswerId, DuelGameId, QuestionId, UserId};
use crate::modes::Lifecycle;
use crate::rating::{EloRating, MatchOutcome};

pub const QUESTIONS_PER_DUEL: usize = 7;

/// Clients show each question for this long; enforced outside the core
pub const SECONDS_PER_QUESTION: u32 = 10;

pub const BASE_POINTS_CORRECT: u32 = 100;

/// Faster answers than this are rejected as automated
pub const MIN_ANSWER_TIME_MS: u32 = 500;

/// Duel speed bonus: 50 up to 3 s, 25 up to 5 s, 10 up to 7 s.
pub fn speed_bonus(time_taken_ms: u32) -> u32 {
    match time_taken_ms {
        0..=3000 => 50,
        3001..=5000 => 25,
        5001..=7000 => 10,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuelStatus {
    WaitingStart,
    InProgress,
    Finished,
    Abandoned,
}

impl Lifecycle for DuelStatus {
    fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::WaitingStart, Self::InProgress)
                | (Self::WaitingStart, Self::Abandoned)
                | (Self::InProgress, Self::Finished)
                | (Self::InProgress, Self::Abandoned)
        )
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Abandoned)
    }
}

/// Duel participant (immutable value, re-bound after every change)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelPlayer {
    user_id: UserId,
    username: String,
    elo: EloRating,
    score: u32,
    connected: bool,
    answers_count: u32,
}

impl DuelPlayer {
    pub fn new(user_id: UserId, username: impl Into<String>, elo: EloRating) -> Self {
        Self {
            user_id,
            username: username.into(),
            elo,
            score: 0,
            connected: true,
            answers_count: 0,
        }
    }

    #[must_use]
    pub fn with_answer(&self, points: u32) -> Self {
        Self {
            score: self.score + points,
            answers_count: self.answers_count + 1,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_connected(&self, connected: bool) -> Self {
        Self {
            connected,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_elo(&self, elo: EloRating) -> Self {
        Self {
            elo,
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
    pub fn elo(&self) -> EloRating {
        self.elo
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    #[inline]
    pub fn answers_count(&self) -> u32 {
        self.answers_count
    }
}

/// One player's answer in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundAnswer {
    pub player_id: UserId,
    pub answer_id: AnswerId,
    pub time_taken_ms: u32,
    pub is_correct: bool,
    pub points: u32,
    pub answered_at: DateTime<Utc>,
}

/// A 1v1 ranked duel
///
/// # Invariants
///
/// - Exactly seven questions; `current_round` is 0 before start, then 1..=7
/// - At most two answers per round; a round completes when both are in
/// - Ratings on the players are pre-game until the duel finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredDuelGame")]
pub struct DuelGame {
    id: DuelGameId,
    player1: DuelPlayer,
    player2: DuelPlayer,
    question_ids: Vec<QuestionId>,
    current_round: usize,
    status: DuelStatus,
    round_answers: Vec<Vec<RoundAnswer>>,
    winner_id: Option<UserId>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl DuelGame {
    pub fn new(
        player1: DuelPlayer,
        player2: DuelPlayer,
        question_ids: Vec<QuestionId>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if player1.user_id.is_nil() || player2.user_id.is_nil() {
            return Err(DomainError::invalid_id("duel players must not be nil"));
        }
        if player1.user_id == player2.user_id {
            return Err(DomainError::validation("A player cannot duel themselves"));
        }
        if question_ids.len() != QUESTIONS_PER_DUEL {
            return Err(DomainError::validation(format!(
                "A duel needs exactly {} questions, got {}",
                QUESTIONS_PER_DUEL,
                question_ids.len()
            )));
        }

        let mut game = Self {
            id: DuelGameId::new(),
            player1,
            player2,
            question_ids,
            current_round: 0,
            status: DuelStatus::WaitingStart,
            round_answers: vec![Vec::new(); QUESTIONS_PER_DUEL],
            winner_id: None,
            created_at,
            started_at: None,
            finished_at: None,
            events: Vec::new(),
        };

        game.events.push(
            DuelEvent::GameCreated {
                game_id: game.id,
                player1_id: game.player1.user_id,
                player2_id: game.player2.user_id,
                question_ids: game.question_ids.clone(),
                occurred_at: created_at,
            }
            .into(),
        );
        Ok(game)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> DuelGameId {
        self.id
    }

    #[inline]
    pub fn player1(&self) -> &DuelPlayer {
        &self.player1
    }

    #[inline]
    pub fn player2(&self) -> &DuelPlayer {
        &self.player2
    }

    #[inline]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    /// 1-based round, 0 before the duel starts
    #[inline]
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    #[inline]
    pub fn status(&self) -> DuelStatus {
        self.status
    }

    #[inline]
    pub fn winner_id(&self) -> Option<UserId> {
        self.winner_id
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[inline]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_player(&self, player_id: UserId) -> bool {
        self.player1.user_id == player_id || self.player2.user_id == player_id
    }

    pub fn player(&self, player_id: UserId) -> Option<&DuelPlayer> {
        [&self.player1, &self.player2]
            .into_iter()
            .find(|p| p.user_id == player_id)
    }

    pub fn opponent_of(&self, player_id: UserId) -> Option<&DuelPlayer> {
        if self.player1.user_id == player_id {
            Some(&self.player2)
        } else if self.player2.user_id == player_id {
            Some(&self.player1)
        } else {
            None
        }
    }

    /// Question of the open round
    pub fn current_question_id(&self) -> Option<QuestionId> {
        self.current_round
            .checked_sub(1)
            .and_then(|i| self.question_ids.get(i))
            .copied()
    }

    pub fn round_answers(&self, round: usize) -> &[RoundAnswer] {
        round
            .checked_sub(1)
            .and_then(|i| self.round_answers.get(i))
            .map_or(&[], Vec::as_slice)
    }

    /// A finished duel's result for `player_id`.
    pub fn outcome_for(&self, player_id: UserId) -> Option<MatchOutcome> {
        if self.status != DuelStatus::Finished {
            return None;
        }
        let me = self.player(player_id)?;
        let them = self.opponent_of(player_id)?;
        Some(MatchOutcome::from_scores(me.score, them.score))
    }

    fn player_mut(&mut self, player_id: UserId) -> Result<&mut DuelPlayer, DomainError> {
        if self.player1.user_id == player_id {
            Ok(&mut self.player1)
        } else if self.player2.user_id == player_id {
            Ok(&mut self.player2)
        } else {
            Err(DomainError::PlayerNotInGame(player_id))
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Both players are connected; open round one.
    pub fn start(&mut self, started_at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != DuelStatus::WaitingStart {
            return Err(DomainError::GameNotActive);
        }
        self.status = self.status.transition(DuelStatus::InProgress)?;
        self.started_at = Some(started_at);
        self.current_round = 1;

        self.events.push(
            DuelEvent::GameStarted {
                game_id: self.id,
                player1_id: self.player1.user_id,
                player2_id: self.player2.user_id,
                occurred_at: started_at,
            }
            .into(),
        );
        self.push_round_started(started_at);
        Ok(())
    }

    /// Record an answer for the open round.
    ///
    /// Checks, in order: the duel is in progress, the player is in it, the
    /// answer took at least 500 ms, the player has not answered this round,
    /// the question is the round's question, the answer belongs to it.
    pub fn submit_answer(
        &mut self,
        player_id: UserId,
        answer_id: AnswerId,
        time_taken_ms: u32,
        question: &Question,
        answered_at: DateTime<Utc>,
    ) -> Result<DuelAnswerOutcome, DomainError> {
        if self.status != DuelStatus::InProgress {
            return Err(DomainError::GameNotActive);
        }
        if !self.has_player(player_id) {
            return Err(DomainError::PlayerNotInGame(player_id));
        }
        if time_taken_ms < MIN_ANSWER_TIME_MS {
            return Err(DomainError::AnswerTooFast {
                time_taken_ms,
                min_ms: MIN_ANSWER_TIME_MS,
            });
        }
        let round_index = self.current_round - 1;
        if self.round_answers[round_index]
            .iter()
            .any(|a| a.player_id == player_id)
        {
            return Err(DomainError::PlayerAlreadyAnswered(player_id));
        }
        if Some(question.id()) != self.current_question_id() {
            return Err(DomainError::QuestionNotInQuiz(question.id()));
        }
        let is_correct = question.is_correct_answer(answer_id)?;

        let points = if is_correct {
            BASE_POINTS_CORRECT + speed_bonus(time_taken_ms)
        } else {
            0
        };

        self.round_answers[round_index].push(RoundAnswer {
            player_id,
            answer_id,
            time_taken_ms,
            is_correct,
            points,
            answered_at,
        });
        let player = self.player_mut(player_id)?;
        *player = player.with_answer(points);

        self.events.push(
            DuelEvent::PlayerAnswered {
                game_id: self.id,
                player_id,
                question_id: question.id(),
                answer_id,
                time_taken_ms,
                is_correct,
                points_earned: points,
                occurred_at: answered_at,
            }
            .into(),
        );

        let round_number = self.current_round;
        let both_answered = self.round_answers[round_index].len() == 2;
        if both_answered {
            self.complete_round(answered_at)?;
        }

        let (player_score, opponent_score) = match (self.player(player_id), self.opponent_of(player_id)) {
            (Some(me), Some(them)) => (me.score, them.score),
            _ => return Err(DomainError::PlayerNotInGame(player_id)),
        };

        Ok(DuelAnswerOutcome {
            is_correct,
            points_earned: points,
            player_score,
            opponent_score,
            round_number,
            both_answered,
            is_game_finished: self.status == DuelStatus::Finished,
            winner_id: self.winner_id,
        })
    }

    fn complete_round(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.events.push(
            DuelEvent::RoundCompleted {
                game_id: self.id,
                round: self.current_round,
                player1_score: self.player1.score,
                player2_score: self.player2.score,
                occurred_at: at,
            }
            .into(),
        );

        if self.current_round >= QUESTIONS_PER_DUEL {
            return self.finish(at);
        }
        self.current_round += 1;
        self.push_round_started(at);
        Ok(())
    }

    /// Decide the winner and move both rating snapshots.
    fn finish(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.status = self.status.transition(DuelStatus::Finished)?;
        self.finished_at = Some(at);

        let outcome1 = MatchOutcome::from_scores(self.player1.score, self.player2.score);
        let before1 = self.player1.elo;
        let before2 = self.player2.elo;
        let after1 = before1.after_game(outcome1, before2.rating());
        let after2 = before2.after_game(outcome1.opposite(), before1.rating());
        self.player1 = self.player1.with_elo(after1);
        self.player2 = self.player2.with_elo(after2);

        self.winner_id = match outcome1 {
            MatchOutcome::Win => Some(self.player1.user_id),
            MatchOutcome::Loss => Some(self.player2.user_id),
            MatchOutcome::Draw => None,
        };

        self.events.push(
            DuelEvent::GameFinished {
                game_id: self.id,
                winner_id: self.winner_id,
                player1: self.player1.clone(),
                player2: self.player2.clone(),
                player1_rating: after1,
                player2_rating: after2,
                occurred_at: at,
            }
            .into(),
        );
        Ok(())
    }

    /// Overwrite the finish-time snapshots with the ratings that were stored.
    ///
    /// Demotion protection can hold a player above their raw Elo result, so
    /// the snapshots and the pending `GameFinished` event take the stored
    /// values. Must run before the finish events are taken.
    pub fn record_settled_ratings(&mut self, player1: EloRating, player2: EloRating) -> Result<(), DomainError> {
        if self.status != DuelStatus::Finished {
            return Err(DomainError::GameNotActive);
        }
        self.player1 = self.player1.with_elo(player1);
        self.player2 = self.player2.with_elo(player2);

        for event in &mut self.events {
            if let DomainEvent::Duel(DuelEvent::GameFinished {
                player1: p1,
                player2: p2,
                player1_rating,
                player2_rating,
                ..
            }) = event
            {
                *p1 = self.player1.clone();
                *p2 = self.player2.clone();
                *player1_rating = player1;
                *player2_rating = player2;
            }
        }
        Ok(())
    }

    /// Mark a player as disconnected.
    ///
    /// When both are gone the duel is abandoned and `BothPlayersDisconnected`
    /// is returned; the aggregate has already changed and must still be saved.
    pub fn handle_disconnect(&mut self, player_id: UserId, at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::GameNotActive);
        }
        let player = self.player_mut(player_id)?;
        *player = player.with_connected(false);

        self.events.push(
            DuelEvent::PlayerDisconnected {
                game_id: self.id,
                player_id,
                occurred_at: at,
            }
            .into(),
        );

        if !self.player1.connected && !self.player2.connected {
            self.status = self.status.transition(DuelStatus::Abandoned)?;
            self.finished_at = Some(at);
            self.events.push(
                DuelEvent::GameAbandoned {
                    game_id: self.id,
                    occurred_at: at,
                }
                .into(),
            );
            return Err(DomainError::BothPlayersDisconnected);
        }
        Ok(())
    }

    pub fn handle_reconnect(&mut self, player_id: UserId, at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::GameNotActive);
        }
        let player = self.player_mut(player_id)?;
        *player = player.with_connected(true);

        self.events.push(
            DuelEvent::PlayerReconnected {
                game_id: self.id,
                player_id,
                occurred_at: at,
            }
            .into(),
        );
        Ok(())
    }

    fn push_round_started(&mut self, at: DateTime<Utc>) {
        if let Some(question_id) = self.current_question_id() {
            self.events.push(
                DuelEvent::RoundStarted {
                    game_id: self.id,
                    round: self.current_round,
                    question_id,
                    occurred_at: at,
                }
                .into(),
            );
        }
    }
}

/// Stored shape of a duel, checked before it becomes a `DuelGame`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDuelGame {
    id: DuelGameId,
    player1: DuelPlayer,
    player2: DuelPlayer,
    question_ids: Vec<QuestionId>,
    current_round: usize,
    status: DuelStatus,
    round_answers: Vec<Vec<RoundAnswer>>,
    winner_id: Option<UserId>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl TryFrom<StoredDuelGame> for DuelGame {
    type Error = DomainError;

    fn try_from(stored: StoredDuelGame) -> Result<Self, Self::Error> {
        if stored.question_ids.len() != QUESTIONS_PER_DUEL || stored.round_answers.len() != QUESTIONS_PER_DUEL {
            return Err(DomainError::validation(format!(
                "A stored duel needs {} questions and rounds",
                QUESTIONS_PER_DUEL
            )));
        }
        let round_ok = match stored.status {
            DuelStatus::WaitingStart => stored.current_round == 0,
            DuelStatus::InProgress => (1..=QUESTIONS_PER_DUEL).contains(&stored.current_round),
            DuelStatus::Finished => stored.current_round == QUESTIONS_PER_DUEL,
            DuelStatus::Abandoned => stored.current_round <= QUESTIONS_PER_DUEL,
        };
        if !round_ok {
            return Err(DomainError::validation(format!(
                "Round {} is impossible for a {:?} duel",
                stored.current_round, stored.status
            )));
        }
        if stored.round_answers.iter().any(|answers| answers.len() > 2) {
            return Err(DomainError::validation("A duel round holds at most two answers"));
        }

        Ok(Self {
            id: stored.id,
            player1: stored.player1,
            player2: stored.player2,
            question_ids: stored.question_ids,
            current_round: stored.current_round,
            status: stored.status,
            round_answers: stored.round_answers,
            winner_id: stored.winner_id,
            created_at: stored.created_at,
            started_at: stored.started_at,
            finished_at: stored.finished_at,
            events: Vec::new(),
        })
    }
}

impl EventSource for DuelGame {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::question::fixtures::{correct_id, question, wrong_id};
    use crate::rating::Mmr;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000)
    }

    fn player(name: &str, mmr: u32, games: u32) -> DuelPlayer {
        DuelPlayer::new(UserId::new(), name, EloRating::new(Mmr::new(mmr).unwrap(), games))
    }

    fn started(p1: DuelPlayer, p2: DuelPlayer) -> (DuelGame, Vec<Question>) {
        let questions: Vec<Question> = (0..QUESTIONS_PER_DUEL).map(|_| question(100)).collect();
        let mut game = DuelGame::new(p1, p2, questions.iter().map(Question::id).collect(), now()).unwrap();
        game.start(now()).unwrap();
        (game, questions)
    }

    #[test]
    fn speed_bonus_brackets() {
        assert_eq!(speed_bonus(500), 50);
        assert_eq!(speed_bonus(3000), 50);
        assert_eq!(speed_bonus(3001), 25);
        assert_eq!(speed_bonus(5000), 25);
        assert_eq!(speed_bonus(7000), 10);
        assert_eq!(speed_bonus(7001), 0);
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn create_requires_seven_questions_and_two_players() {
            let p = player("a", 1000, 0);
            let ids: Vec<QuestionId> = (0..6).map(|_| QuestionId::new()).collect();
            assert!(DuelGame::new(p.clone(), player("b", 1000, 0), ids, now()).is_err());
            let seven: Vec<QuestionId> = (0..7).map(|_| QuestionId::new()).collect();
            assert!(DuelGame::new(p.clone(), p, seven, now()).is_err());
        }

        #[test]
        fn start_opens_round_one() {
            let (mut game, qs) = started(player("a", 1000, 0), player("b", 1000, 0));
            assert_eq!(game.current_round(), 1);
            assert_eq!(game.current_question_id(), Some(qs[0].id()));
            let types: Vec<_> = game.take_events().iter().map(DomainEvent::event_type).collect();
            assert_eq!(
                types,
                vec!["duel.game_created", "duel.game_started", "duel.round_started"]
            );
            assert_eq!(game.start(now()).unwrap_err(), DomainError::GameNotActive);
        }

        #[test]
        fn status_table() {
            assert!(DuelStatus::WaitingStart.can_transition_to(DuelStatus::Abandoned));
            assert!(!DuelStatus::WaitingStart.can_transition_to(DuelStatus::Finished));
            assert!(!DuelStatus::Finished.can_transition_to(DuelStatus::Abandoned));
            assert!(DuelStatus::Abandoned.is_terminal());
        }
    }

    mod answering {
        use super::*;

        #[test]
        fn rejections_in_order() {
            let (mut game, qs) = started(player("a", 1000, 0), player("b", 1000, 0));
            let p1 = game.player1().user_id();
            let stranger = UserId::new();
            assert_eq!(
                game.submit_answer(stranger, correct_id(&qs[0]), 100, &qs[0], now()).unwrap_err(),
                DomainError::PlayerNotInGame(stranger)
            );
            assert_eq!(
                game.submit_answer(p1, correct_id(&qs[0]), 499, &qs[0], now()).unwrap_err(),
                DomainError::AnswerTooFast {
                    time_taken_ms: 499,
                    min_ms: 500
                }
            );
            game.submit_answer(p1, correct_id(&qs[0]), 500, &qs[0], now()).unwrap();
            assert_eq!(
                game.submit_answer(p1, correct_id(&qs[0]), 900, &qs[0], now()).unwrap_err(),
                DomainError::PlayerAlreadyAnswered(p1)
            );
        }

        #[test]
        fn round_completes_when_both_answer() {
            let (mut game, qs) = started(player("a", 1000, 0), player("b", 1000, 0));
            let (p1, p2) = (game.player1().user_id(), game.player2().user_id());

            let first = game.submit_answer(p1, correct_id(&qs[0]), 2500, &qs[0], now()).unwrap();
            assert_eq!(first.points_earned, 150);
            assert!(!first.both_answered);
            assert_eq!(game.round_answers(1).len(), 1);

            let second = game.submit_answer(p2, wrong_id(&qs[0]), 1200, &qs[0], now()).unwrap();
            assert!(second.both_answered);
            assert_eq!(second.round_number, 1);
            assert_eq!((second.player_score, second.opponent_score), (0, 150));
            assert_eq!(game.current_round(), 2);
        }

        #[test]
        fn seventh_round_finishes_and_rates() {
            let (mut game, qs) = started(player("a", 1000, 30), player("b", 1200, 30));
            let (p1, p2) = (game.player1().user_id(), game.player2().user_id());
            let mut last = None;
            for q in &qs {
                game.submit_answer(p1, correct_id(q), 1000, q, now()).unwrap();
                last = Some(game.submit_answer(p2, wrong_id(q), 1000, q, now()).unwrap());
            }
            let last = last.unwrap();
            assert!(last.is_game_finished);
            assert_eq!(last.winner_id, Some(p1));
            assert_eq!(game.status(), DuelStatus::Finished);
            assert_eq!(game.player1().score(), 7 * 150);
            assert_eq!(game.player1().elo().rating().value(), 1012);
            assert_eq!(game.player2().elo().rating().value(), 1188);
            assert_eq!(game.outcome_for(p2), Some(MatchOutcome::Loss));
            assert!(game
                .take_events()
                .iter()
                .any(|e| e.event_type() == "duel.game_finished"));
        }

        #[test]
        fn settled_ratings_replace_snapshots_and_event() {
            let (mut game, qs) = started(player("a", 1000, 5), player("b", 1000, 0));
            let (p1, p2) = (game.player1().user_id(), game.player2().user_id());
            for q in &qs {
                game.submit_answer(p1, correct_id(q), 1000, q, now()).unwrap();
                game.submit_answer(p2, wrong_id(q), 1000, q, now()).unwrap();
            }
            assert_eq!(game.player2().elo().rating().value(), 984);

            let held = EloRating::new(Mmr::new(1000).unwrap(), 1);
            game.record_settled_ratings(game.player1().elo(), held).unwrap();

            assert_eq!(game.player2().elo(), held);
            let finished = game
                .take_events()
                .into_iter()
                .find_map(|e| match e {
                    DomainEvent::Duel(DuelEvent::GameFinished {
                        player2, player2_rating, ..
                    }) => Some((player2, player2_rating)),
                    _ => None,
                })
                .unwrap();
            assert_eq!(finished.0.elo(), held);
            assert_eq!(finished.1, held);
        }

        #[test]
        fn settled_ratings_need_a_finished_duel() {
            let (mut game, _) = started(player("a", 1000, 0), player("b", 1000, 0));
            assert_eq!(
                game.record_settled_ratings(EloRating::default(), EloRating::default())
                    .unwrap_err(),
                DomainError::GameNotActive
            );
        }

        #[test]
        fn draw_has_no_winner() {
            let (mut game, qs) = started(player("a", 1000, 0), player("b", 1000, 0));
            let (p1, p2) = (game.player1().user_id(), game.player2().user_id());
            for q in &qs {
                game.submit_answer(p1, wrong_id(q), 1000, q, now()).unwrap();
                game.submit_answer(p2, wrong_id(q), 1000, q, now()).unwrap();
            }
            assert_eq!(game.winner_id(), None);
            assert_eq!(game.outcome_for(p1), Some(MatchOutcome::Draw));
            assert_eq!(game.player1().elo().rating().value(), 1000);
        }
    }

    mod stored {
        use super::*;

        #[test]
        fn finished_duel_round_trips() {
            let (mut game, qs) = started(player("a", 1000, 0), player("b", 1000, 0));
            let (p1, p2) = (game.player1().user_id(), game.player2().user_id());
            for q in &qs {
                game.submit_answer(p1, correct_id(q), 1000, q, now()).unwrap();
                game.submit_answer(p2, wrong_id(q), 2000, q, now()).unwrap();
            }
            game.take_events();

            let back: DuelGame = serde_json::from_str(&serde_json::to_string(&game).unwrap()).unwrap();
            assert_eq!(back, game);
            assert_eq!(back.round_answers(7).len(), 2);
        }

        #[test]
        fn running_duel_keeps_its_open_round() {
            let (mut game, qs) = started(player("a", 1000, 0), player("b", 1000, 0));
            game.submit_answer(game.player1().user_id(), correct_id(&qs[0]), 900, &qs[0], now())
                .unwrap();
            game.take_events();

            let back: DuelGame = serde_json::from_str(&serde_json::to_string(&game).unwrap()).unwrap();
            assert_eq!(back.current_question_id(), Some(qs[0].id()));
            assert_eq!(back.round_answers(1).len(), 1);
        }

        #[test]
        fn running_duel_without_a_round_is_rejected() {
            let (game, _) = started(player("a", 1000, 0), player("b", 1000, 0));
            let mut value = serde_json::to_value(&game).unwrap();
            value["currentRound"] = serde_json::json!(0);
            assert!(serde_json::from_value::<DuelGame>(value).is_err());

            let mut value = serde_json::to_value(&game).unwrap();
            value["currentRound"] = serde_json::json!(8);
            assert!(serde_json::from_value::<DuelGame>(value).is_err());
        }

        #[test]
        fn short_question_list_is_rejected() {
            let (game, _) = started(player("a", 1000, 0), player("b", 1000, 0));
            let mut value = serde_json::to_value(&game).unwrap();
            value["questionIds"].as_array_mut().unwrap().pop();
            assert!(serde_json::from_value::<DuelGame>(value).is_err());
        }
    }

    mod connection {
        use super::*;

        #[test]
        fn both_disconnected_abandons() {
            let (mut game, _) = started(player("a", 1000, 0), player("b", 1000, 0));
            let (p1, p2) = (game.player1().user_id(), game.player2().user_id());
            game.handle_disconnect(p1, now()).unwrap();
            assert!(!game.player1().is_connected());
            assert_eq!(
                game.handle_disconnect(p2, now()).unwrap_err(),
                DomainError::BothPlayersDisconnected
            );
            assert_eq!(game.status(), DuelStatus::Abandoned);
            assert_eq!(game.handle_reconnect(p1, now()).unwrap_err(), DomainError::GameNotActive);
        }

        #[test]
        fn reconnect_restores_flag() {
            let (mut game, _) = started(player("a", 1000, 0), player("b", 1000, 0));
            let p1 = game.player1().user_id();
            game.handle_disconnect(p1, now()).unwrap();
            game.handle_reconnect(p1, now()).unwrap();
            assert!(game.player1().is_connected());
            assert_eq!(game.status(), DuelStatus::InProgress);
        }
    }
}
