//! Lobby commands: create, join, leave, ready and kick.

use std::sync::Arc;

use quizsprint_domain::modes::party::{PartyRoom, RoomCode, RoomSettings, RoomStatus};
use quizsprint_domain::{DomainError, EventSource, PartyRoomId, UserId};

use super::{load_room, PartyError};
use crate::infrastructure::clock::rng_fn;
use crate::infrastructure::ports::{ClockPort, EventBus, PartyRoomRepo, RandomPort, RepoError};
use crate::use_cases::publish;

/// Codes drawn before giving up on finding a free one.
pub const MAX_CODE_ATTEMPTS: u32 = 5;

pub struct CreateRoom {
    rooms: Arc<dyn PartyRoomRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl CreateRoom {
    pub fn new(
        rooms: Arc<dyn PartyRoomRepo>,
        events: Arc<dyn EventBus>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            rooms,
            events,
            clock,
            random,
        }
    }

    pub async fn execute(
        &self,
        host_id: UserId,
        host_name: &str,
        room_name: &str,
        settings: RoomSettings,
    ) -> Result<PartyRoom, PartyError> {
        if self.rooms.find_active_by_player(host_id).await?.is_some() {
            return Err(DomainError::PlayerAlreadyInRoom(host_id).into());
        }
        settings.validate()?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = {
                let mut rng = rng_fn(self.random.as_ref());
                RoomCode::generate(&mut rng)
            };
            if self.rooms.find_by_code(&code).await?.is_some() {
                tracing::debug!(%code, attempt, "Room code taken, drawing another");
                continue;
            }

            let mut room = PartyRoom::new(host_id, host_name, room_name, settings.clone(), code, self.clock.now())?;
            match self.rooms.save(&room).await {
                Ok(()) => {
                    publish(self.events.as_ref(), room.take_events()).await;
                    tracing::info!(room_id = %room.id(), code = %room.code(), %host_id, "Party room created");
                    return Ok(room);
                }
                Err(RepoError::ConstraintViolation(_)) => {
                    tracing::debug!(code = %room.code(), attempt, "Room code claimed concurrently");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(%host_id, attempts = MAX_CODE_ATTEMPTS, "No free room code");
        Err(PartyError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }
}

pub struct JoinRoom {
    rooms: Arc<dyn PartyRoomRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl JoinRoom {
    pub fn new(rooms: Arc<dyn PartyRoomRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self { rooms, events, clock }
    }

    /// Join by the code shown in the host's lobby. Case and surrounding
    /// whitespace are ignored.
    pub async fn execute(&self, code: &str, player_id: UserId, username: &str) -> Result<PartyRoom, PartyError> {
        let code: RoomCode = code.parse()?;
        let mut room = self
            .rooms
            .find_by_code(&code)
            .await?
            .ok_or_else(|| PartyError::RoomNotFound(code.to_string()))?;

        let now = self.clock.now();
        if room.is_expired(now) && room.status() == RoomStatus::Lobby {
            room.close(now)?;
            self.rooms.save(&room).await?;
            publish(self.events.as_ref(), room.take_events()).await;
            tracing::info!(room_id = %room.id(), %code, "Expired party room closed");
            return Err(DomainError::RoomClosed.into());
        }

        if let Some(other) = self.rooms.find_active_by_player(player_id).await? {
            if other.id() != room.id() {
                return Err(DomainError::PlayerAlreadyInRoom(player_id).into());
            }
        }

        room.join_player(player_id, username, now)?;
        self.rooms.save(&room).await?;
        publish(self.events.as_ref(), room.take_events()).await;

        tracing::info!(room_id = %room.id(), %player_id, players = room.player_count(), "Player joined party room");
        Ok(room)
    }
}

pub struct LeaveRoom {
    rooms: Arc<dyn PartyRoomRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl LeaveRoom {
    pub fn new(rooms: Arc<dyn PartyRoomRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self { rooms, events, clock }
    }

    /// Leave the room. The next player becomes host; the last one out closes it.
    /// Seats are fixed while a game is running.
    pub async fn execute(&self, room_id: PartyRoomId, player_id: UserId) -> Result<PartyRoom, PartyError> {
        let mut room = load_room(self.rooms.as_ref(), room_id).await?;
        room.remove_player(player_id, self.clock.now())?;
        self.rooms.save(&room).await?;
        publish(self.events.as_ref(), room.take_events()).await;

        tracing::info!(%room_id, %player_id, status = ?room.status(), "Player left party room");
        Ok(room)
    }
}

pub struct SetReady {
    rooms: Arc<dyn PartyRoomRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl SetReady {
    pub fn new(rooms: Arc<dyn PartyRoomRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self { rooms, events, clock }
    }

    pub async fn execute(&self, room_id: PartyRoomId, player_id: UserId, ready: bool) -> Result<PartyRoom, PartyError> {
        let mut room = load_room(self.rooms.as_ref(), room_id).await?;
        room.set_player_ready(player_id, ready, self.clock.now())?;
        self.rooms.save(&room).await?;
        publish(self.events.as_ref(), room.take_events()).await;
        tracing::debug!(%room_id, %player_id, ready, "Ready state changed");
        Ok(room)
    }
}

pub struct KickPlayer {
    rooms: Arc<dyn PartyRoomRepo>,
    events: Arc<dyn EventBus>,
    clock: Arc<dyn ClockPort>,
}

impl KickPlayer {
    pub fn new(rooms: Arc<dyn PartyRoomRepo>, events: Arc<dyn EventBus>, clock: Arc<dyn ClockPort>) -> Self {
        Self { rooms, events, clock }
    }

    pub async fn execute(
        &self,
        room_id: PartyRoomId,
        requester_id: UserId,
        target_id: UserId,
    ) -> Result<PartyRoom, PartyError> {
        let mut room = load_room(self.rooms.as_ref(), room_id).await?;
        room.kick_player(requester_id, target_id, self.clock.now())?;
        self.rooms.save(&room).await?;
        publish(self.events.as_ref(), room.take_events()).await;
        tracing::info!(%room_id, %target_id, "Player kicked from party room");
        Ok(room)
    }
}
