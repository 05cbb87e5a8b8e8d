//! Party room use cases.
//!
//! A host opens a lobby under a short code, friends join and ready up, and the
//! host starts a game for everyone in the room. Finishing the game closes the
//! room.

use std::sync::Arc;

use quizsprint_domain::modes::party::{PartyGame, PartyRoom};
use quizsprint_domain::{DomainError, PartyGameId, PartyRoomId};

use crate::infrastructure::ports::{PartyGameRepo, PartyRoomRepo, RepoError};
use crate::use_cases::content::ContentError;

mod game;
mod lobby;

pub use game::{PartyAnswerInput, PartyAnswerResult, PartyGameStarted, StartPartyGame, SubmitPartyAnswer};
pub use lobby::{CreateRoom, JoinRoom, KickPlayer, LeaveRoom, SetReady, MAX_CODE_ATTEMPTS};

/// Container for party use cases.
pub struct PartyUseCases {
    pub create_room: Arc<CreateRoom>,
    pub join_room: Arc<JoinRoom>,
    pub leave_room: Arc<LeaveRoom>,
    pub set_ready: Arc<SetReady>,
    pub kick_player: Arc<KickPlayer>,
    pub start_game: Arc<StartPartyGame>,
    pub submit_answer: Arc<SubmitPartyAnswer>,
    pub room_state: Arc<GetRoomState>,
}

impl PartyUseCases {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        create_room: Arc<CreateRoom>,
        join_room: Arc<JoinRoom>,
        leave_room: Arc<LeaveRoom>,
        set_ready: Arc<SetReady>,
        kick_player: Arc<KickPlayer>,
        start_game: Arc<StartPartyGame>,
        submit_answer: Arc<SubmitPartyAnswer>,
        room_state: Arc<GetRoomState>,
    ) -> Self {
        Self {
            create_room,
            join_room,
            leave_room,
            set_ready,
            kick_player,
            start_game,
            submit_answer,
            room_state,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),
    #[error("Party game not found: {0}")]
    GameNotFound(PartyGameId),
    #[error("No free room code after {0} attempts")]
    CodeSpaceExhausted(u32),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

async fn load_room(rooms: &dyn PartyRoomRepo, room_id: PartyRoomId) -> Result<PartyRoom, PartyError> {
    rooms
        .get(room_id)
        .await?
        .ok_or_else(|| PartyError::RoomNotFound(room_id.to_string()))
}

/// A room and the game most recently played in it.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub room: PartyRoom,
    pub game: Option<PartyGame>,
}

pub struct GetRoomState {
    rooms: Arc<dyn PartyRoomRepo>,
    games: Arc<dyn PartyGameRepo>,
}

impl GetRoomState {
    pub fn new(rooms: Arc<dyn PartyRoomRepo>, games: Arc<dyn PartyGameRepo>) -> Self {
        Self { rooms, games }
    }

    pub async fn execute(&self, room_id: PartyRoomId) -> Result<RoomState, PartyError> {
        let room = load_room(self.rooms.as_ref(), room_id).await?;
        let game = self.games.find_by_room(room_id).await?;
        Ok(RoomState { room, game })
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::infrastructure::ports::{MockPartyGameRepo, MockPartyRoomRepo};

    #[tokio::test]
    async fn unknown_room_is_not_found() {
        let id = PartyRoomId::new();
        let mut rooms = MockPartyRoomRepo::new();
        rooms.expect_get().with(eq(id)).returning(|_| Ok(None));
        let games = MockPartyGameRepo::new();

        let err = GetRoomState::new(Arc::new(rooms), Arc::new(games))
            .execute(id)
            .await
            .unwrap_err();
        assert!(matches!(err, PartyError::RoomNotFound(s) if s == id.to_string()));
    }
}
