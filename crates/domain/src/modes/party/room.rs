//! Party room aggregate - the lobby players gather in before a game

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{DomainEvent, EventSource, PartyEvent};
use crate::ids::{PartyRoomId, UserId};
use crate::modes::Lifecycle;

use super::settings::{RoomCode, RoomSettings, MIN_PLAYERS};

/// Rooms close on their own one hour after creation
pub const ROOM_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomStatus {
    Lobby,
    Playing,
    Closed,
}

impl Lifecycle for RoomStatus {
    fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Lobby, Self::Playing) | (Self::Lobby, Self::Closed) | (Self::Playing, Self::Closed)
        )
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A player sitting in the lobby (immutable value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlayer {
    user_id: UserId,
    username: String,
    is_host: bool,
    is_ready: bool,
    joined_at: DateTime<Utc>,
}

impl RoomPlayer {
    pub fn new(user_id: UserId, username: impl Into<String>, is_host: bool, joined_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            username: username.into(),
            is_host,
            is_ready: false,
            joined_at,
        }
    }

    #[must_use]
    pub fn with_ready(&self, ready: bool) -> Self {
        Self {
            is_ready: ready,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_host(&self, host: bool) -> Self {
        Self {
            is_host: host,
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
    pub fn is_host(&self) -> bool {
        self.is_host
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    #[inline]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}

/// A party lobby
///
/// # Invariants
///
/// - Settings are valid
/// - The first player is the host; removing the host promotes the next player
/// - An empty room is closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRoom {
    id: PartyRoomId,
    code: RoomCode,
    name: String,
    host_id: UserId,
    settings: RoomSettings,
    players: Vec<RoomPlayer>,
    status: RoomStatus,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl PartyRoom {
    /// Open a room with the host as its first player. The code is chosen by the
    /// caller, which is responsible for uniqueness.
    pub fn new(
        host_id: UserId,
        host_name: impl Into<String>,
        name: impl Into<String>,
        settings: RoomSettings,
        code: RoomCode,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if host_id.is_nil() {
            return Err(DomainError::invalid_id("host id must not be nil"));
        }
        settings.validate()?;

        let mut room = Self {
            id: PartyRoomId::new(),
            code,
            name: name.into(),
            host_id,
            settings,
            players: vec![RoomPlayer::new(host_id, host_name, true, created_at)],
            status: RoomStatus::Lobby,
            created_at,
            expires_at: created_at + Duration::minutes(ROOM_TTL_MINUTES),
            events: Vec::new(),
        };

        room.events.push(
            PartyEvent::RoomCreated {
                room_id: room.id,
                room_code: room.code.clone(),
                host_id,
                settings: room.settings.clone(),
                occurred_at: created_at,
            }
            .into(),
        );
        Ok(room)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> PartyRoomId {
        self.id
    }

    #[inline]
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn host_id(&self) -> UserId {
        self.host_id
    }

    #[inline]
    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    #[inline]
    pub fn players(&self) -> &[RoomPlayer] {
        &self.players
    }

    #[inline]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn status(&self) -> RoomStatus {
        self.status
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn has_player(&self, player_id: UserId) -> bool {
        self.position_of(player_id).is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    fn position_of(&self, player_id: UserId) -> Option<usize> {
        self.players.iter().position(|p| p.user_id == player_id)
    }

    fn ensure_lobby(&self) -> Result<(), DomainError> {
        match self.status {
            RoomStatus::Lobby => Ok(()),
            RoomStatus::Playing => Err(DomainError::RoomAlreadyStarted),
            RoomStatus::Closed => Err(DomainError::RoomClosed),
        }
    }

    // =========================================================================
    // Lobby commands
    // =========================================================================

    pub fn join_player(
        &mut self,
        player_id: UserId,
        username: impl Into<String>,
        joined_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_lobby()?;
        if self.has_player(player_id) {
            return Err(DomainError::PlayerAlreadyInRoom(player_id));
        }
        if self.players.len() >= self.settings.max_players() {
            return Err(DomainError::RoomFull {
                max: self.settings.max_players(),
            });
        }

        let player = RoomPlayer::new(player_id, username, false, joined_at);
        self.events.push(
            PartyEvent::PlayerJoined {
                room_id: self.id,
                player_id,
                username: player.username.clone(),
                occurred_at: joined_at,
            }
            .into(),
        );
        self.players.push(player);
        Ok(())
    }

    /// Remove a player. Hostship passes to the next player; an empty room closes.
    pub fn remove_player(&mut self, player_id: UserId, left_at: DateTime<Utc>) -> Result<(), DomainError> {
        // The running game waits for every seated player's answer.
        if self.status == RoomStatus::Playing {
            return Err(DomainError::RoomAlreadyStarted);
        }
        self.remove(player_id, false, left_at)
    }

    /// Host-only removal of another player.
    pub fn kick_player(
        &mut self,
        requester_id: UserId,
        target_id: UserId,
        kicked_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if requester_id != self.host_id {
            return Err(DomainError::OnlyHostAllowed);
        }
        if target_id == self.host_id {
            return Err(DomainError::CannotKickHost);
        }
        self.ensure_lobby()?;
        self.remove(target_id, true, kicked_at)
    }

    fn remove(&mut self, player_id: UserId, kicked: bool, at: DateTime<Utc>) -> Result<(), DomainError> {
        let index = self
            .position_of(player_id)
            .ok_or(DomainError::PlayerNotFound(player_id))?;
        let removed = self.players.remove(index);

        self.events.push(
            PartyEvent::PlayerLeft {
                room_id: self.id,
                player_id,
                kicked,
                occurred_at: at,
            }
            .into(),
        );

        if removed.is_host {
            if let Some(next) = self.players.first() {
                let old_host_id = self.host_id;
                let promoted = next.with_host(true);
                self.host_id = promoted.user_id;
                self.players[0] = promoted;
                self.events.push(
                    PartyEvent::HostChanged {
                        room_id: self.id,
                        old_host_id,
                        new_host_id: self.host_id,
                        occurred_at: at,
                    }
                    .into(),
                );
            }
        }

        if self.players.is_empty() {
            self.close(at)?;
        }
        Ok(())
    }

    pub fn set_player_ready(
        &mut self,
        player_id: UserId,
        ready: bool,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_lobby()?;
        let index = self
            .position_of(player_id)
            .ok_or(DomainError::PlayerNotFound(player_id))?;
        self.players[index] = self.players[index].with_ready(ready);
        self.events.push(
            PartyEvent::PlayerReady {
                room_id: self.id,
                player_id,
                is_ready: ready,
                occurred_at: at,
            }
            .into(),
        );
        Ok(())
    }

    /// Host only, at least two players, every non-host ready.
    pub fn can_start_game(&self, requester_id: UserId) -> Result<(), DomainError> {
        if requester_id != self.host_id {
            return Err(DomainError::OnlyHostAllowed);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(DomainError::NotEnoughPlayers {
                required: MIN_PLAYERS,
                actual: self.players.len(),
            });
        }
        if self.players.iter().any(|p| !p.is_host && !p.is_ready) {
            return Err(DomainError::NotAllPlayersReady);
        }
        Ok(())
    }

    /// Move the lobby to Playing. The game aggregate is created by the caller.
    pub fn start_game(&mut self, requester_id: UserId) -> Result<(), DomainError> {
        self.ensure_lobby()?;
        self.can_start_game(requester_id)?;
        self.status = self.status.transition(RoomStatus::Playing)?;
        Ok(())
    }

    pub fn close(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.status = self.status.transition(RoomStatus::Closed)?;
        self.events.push(
            PartyEvent::RoomClosed {
                room_id: self.id,
                occurred_at: at,
            }
            .into(),
        );
        Ok(())
    }
}

impl EventSource for PartyRoom {
    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}
