//! Playing a party game.

use std::sync::Arc;

use quizsprint_domain::content::Question;
use quizsprint_domain::events::PartyAnswerOutcome;
use quizsprint_domain::modes::party::{PartyGame, PartyPlayer, RoomStatus};
use quizsprint_domain::{AnswerId, DomainError, EventSource, PartyGameId, PartyRoomId, QuestionId, UserId};

use super::{load_room, PartyError};
use crate::infrastructure::ports::{ClockPort, EventBus, PartyGameRepo, PartyRoomRepo, QuestionRepo, RandomPort, RepoError};
use crate::use_cases::content::QuestionSelector;
use crate::use_cases::publish;

#[derive(Debug, Clone)]
pub struct PartyGameStarted {
    pub game_id: PartyGameId,
    pub room_id: PartyRoomId,
    pub total_questions: usize,
    pub first_question: Question,
    pub players: Vec<PartyPlayer>,
}

pub struct StartPartyGame {
    rooms: Arc<dyn PartyRoomRepo>,
    games: Arc<dyn PartyGameRepo>,
    selector: Arc<QuestionSelector>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl StartPartyGame {
    pub fn new(
        rooms: Arc<dyn PartyRoomRepo>,
        games: Arc<dyn PartyGameRepo>,
        selector: Arc<QuestionSelector>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            rooms,
            games,
            selector,
            events,
            clock,
            random,
        }
    }

    /// Host only. Every other player must be ready.
    pub async fn execute(&self, room_id: PartyRoomId, requester_id: UserId) -> Result<PartyGameStarted, PartyError> {
        let mut room = load_room(self.rooms.as_ref(), room_id).await?;
        room.can_start_game(requester_id)?;

        let settings = room.settings();
        let seed = i64::from(self.random.gen_range(0, i32::MAX));
        let questions = self
            .selector
            .draw_from_categories(settings.categories(), settings.difficulty(), settings.questions_count(), seed)
            .await?;
        let first_question = questions
            .first()
            .cloned()
            .ok_or(DomainError::validation("Party game needs at least one question"))?;

        let now = self.clock.now();
        room.start_game(requester_id)?;
        let mut game = PartyGame::new(
            room.id(),
            questions.iter().map(Question::id).collect(),
            room.players(),
            now,
        )?;

        self.rooms.save(&room).await?;
        self.games.save(&game).await?;
        let mut events = room.take_events();
        events.extend(game.take_events());
        publish(self.events.as_ref(), events).await;

        tracing::info!(
            %room_id,
            game_id = %game.id(),
            players = game.players().len(),
            questions = game.question_ids().len(),
            "Party game started"
        );
        Ok(PartyGameStarted {
            game_id: game.id(),
            room_id,
            total_questions: game.question_ids().len(),
            first_question,
            players: game.players().to_vec(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PartyAnswerInput {
    pub game_id: PartyGameId,
    pub player_id: UserId,
    /// Question the client believes is open
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
    pub time_taken_ms: u32,
}

#[derive(Debug, Clone)]
pub struct PartyAnswerResult {
    pub outcome: PartyAnswerOutcome,
    /// Opened when this answer completed the question
    pub next_question: Option<Question>,
    /// Final standings, best first, once the game is over
    pub standings: Option<Vec<PartyPlayer>>,
}

pub struct SubmitPartyAnswer {
    games: Arc<dyn PartyGameRepo>,
    rooms: Arc<dyn PartyRoomRepo>,
    questions: Arc<dyn QuestionRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl SubmitPartyAnswer {
    pub fn new(
        games: Arc<dyn PartyGameRepo>,
        rooms: Arc<dyn PartyRoomRepo>,
        questions: Arc<dyn QuestionRepo>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            games,
            rooms,
            questions,
            events,
            clock,
        }
    }

    pub async fn execute(&self, input: PartyAnswerInput) -> Result<PartyAnswerResult, PartyError> {
        let mut game = self
            .games
            .get(input.game_id)
            .await?
            .ok_or(PartyError::GameNotFound(input.game_id))?;

        let open = game.current_question_id().ok_or(DomainError::GameNotActive)?;
        if open != input.question_id {
            return Err(DomainError::QuestionNotInQuiz(input.question_id).into());
        }
        let question = self.load_question(open).await?;

        let now = self.clock.now();
        let outcome = game.submit_answer(input.player_id, input.answer_id, input.time_taken_ms, &question, now)?;
        tracing::debug!(
            game_id = %game.id(),
            player_id = %input.player_id,
            correct = outcome.is_correct,
            position = outcome.position,
            points = outcome.points_earned,
            "Party answer recorded"
        );

        self.games.save(&game).await?;
        let mut events = game.take_events();

        let mut standings = None;
        if outcome.is_game_finished {
            let mut room = load_room(self.rooms.as_ref(), game.room_id()).await?;
            if room.status() != RoomStatus::Closed {
                room.close(now)?;
                self.rooms.save(&room).await?;
                events.extend(room.take_events());
            }
            standings = Some(game.standings().into_iter().cloned().collect());
            tracing::info!(
                game_id = %game.id(),
                room_id = %game.room_id(),
                winner_id = ?outcome.winner_id,
                "Party game finished"
            );
        }
        publish(self.events.as_ref(), events).await;

        let next_question = match (outcome.all_answered, game.current_question_id()) {
            (true, Some(next)) if !outcome.is_game_finished => Some(self.load_question(next).await?),
            _ => None,
        };

        Ok(PartyAnswerResult {
            outcome,
            next_question,
            standings,
        })
    }

    async fn load_question(&self, id: QuestionId) -> Result<Question, PartyError> {
        self.questions
            .get(id)
            .await?
            .ok_or_else(|| RepoError::not_found("Question", id).into())
    }
}
