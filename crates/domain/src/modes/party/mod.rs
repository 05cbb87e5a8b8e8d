//! Party mode: a lobby that turns into a multiplayer game

mod game;
mod room;
mod settings;

pub use game::{
    position_bonus, speed_bonus, PartyAnswer, PartyGame, PartyGameStatus, PartyPlayer,
    BASE_POINTS_CORRECT,
};
pub use room::{PartyRoom, RoomPlayer, RoomStatus, ROOM_TTL_MINUTES};
pub use settings::{
    RoomCode, RoomSettings, MAX_PLAYERS, MAX_QUESTIONS, MAX_SECONDS_PER_QUESTION, MIN_PLAYERS,
    MIN_QUESTIONS, MIN_SECONDS_PER_QUESTION,
};
