//! Party room and party game events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AnswerId, PartyGameId, PartyRoomId, QuestionId, UserId};
use crate::modes::party::{PartyPlayer, RoomCode, RoomSettings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartyEvent {
    // Room lifecycle
    RoomCreated {
        room_id: PartyRoomId,
        room_code: RoomCode,
        host_id: UserId,
        settings: RoomSettings,
        occurred_at: DateTime<Utc>,
    },
    PlayerJoined {
        room_id: PartyRoomId,
        player_id: UserId,
        username: String,
        occurred_at: DateTime<Utc>,
    },
    PlayerLeft {
        room_id: PartyRoomId,
        player_id: UserId,
        kicked: bool,
        occurred_at: DateTime<Utc>,
    },
    PlayerReady {
        room_id: PartyRoomId,
        player_id: UserId,
        is_ready: bool,
        occurred_at: DateTime<Utc>,
    },
    HostChanged {
        room_id: PartyRoomId,
        old_host_id: UserId,
        new_host_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    RoomClosed {
        room_id: PartyRoomId,
        occurred_at: DateTime<Utc>,
    },

    // Game
    GameStarted {
        game_id: PartyGameId,
        room_id: PartyRoomId,
        player_ids: Vec<UserId>,
        question_ids: Vec<QuestionId>,
        occurred_at: DateTime<Utc>,
    },
    QuestionStarted {
        game_id: PartyGameId,
        question_id: QuestionId,
        question_number: usize,
        occurred_at: DateTime<Utc>,
    },
    PlayerAnswered {
        game_id: PartyGameId,
        player_id: UserId,
        question_id: QuestionId,
        answer_id: AnswerId,
        is_correct: bool,
        time_taken_ms: u32,
        points_earned: u32,
        position: usize,
        occurred_at: DateTime<Utc>,
    },
    QuestionCompleted {
        game_id: PartyGameId,
        question_id: QuestionId,
        question_number: usize,
        occurred_at: DateTime<Utc>,
    },
    GameFinished {
        game_id: PartyGameId,
        room_id: PartyRoomId,
        winner_id: Option<UserId>,
        players: Vec<PartyPlayer>,
        occurred_at: DateTime<Utc>,
    },
}

impl PartyEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RoomCreated { .. } => "party.room_created",
            Self::PlayerJoined { .. } => "party.player_joined",
            Self::PlayerLeft { .. } => "party.player_left",
            Self::PlayerReady { .. } => "party.player_ready",
            Self::HostChanged { .. } => "party.host_changed",
            Self::RoomClosed { .. } => "party.room_closed",
            Self::GameStarted { .. } => "party.game_started",
            Self::QuestionStarted { .. } => "party.question_started",
            Self::PlayerAnswered { .. } => "party.player_answered",
            Self::QuestionCompleted { .. } => "party.question_completed",
            Self::GameFinished { .. } => "party.game_finished",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::RoomCreated { occurred_at, .. }
            | Self::PlayerJoined { occurred_at, .. }
            | Self::PlayerLeft { occurred_at, .. }
            | Self::PlayerReady { occurred_at, .. }
            | Self::HostChanged { occurred_at, .. }
            | Self::RoomClosed { occurred_at, .. }
            | Self::GameStarted { occurred_at, .. }
            | Self::QuestionStarted { occurred_at, .. }
            | Self::PlayerAnswered { occurred_at, .. }
            | Self::QuestionCompleted { occurred_at, .. }
            | Self::GameFinished { occurred_at, .. } => *occurred_at,
        }
    }
}

/// Result of a party answer submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyAnswerOutcome {
    pub is_correct: bool,
    pub points_earned: u32,
    /// 1-based arrival order for the current question
    pub position: usize,
    pub player_score: u32,
    pub question_number: usize,
    /// Every player has answered the current question
    pub all_answered: bool,
    pub is_game_finished: bool,
    pub winner_id: Option<UserId>,
}
