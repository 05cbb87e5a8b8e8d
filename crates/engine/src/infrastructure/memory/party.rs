//! In-memory party storage. Open rooms are indexed by code.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;

use quizsprint_domain::modes::party::{PartyGame, PartyRoom, RoomCode, RoomStatus};
use quizsprint_domain::{PartyGameId, PartyRoomId, UserId};

use super::stored;
use crate::infrastructure::ports::{PartyGameRepo, PartyRoomRepo, RepoError};

#[derive(Default)]
pub struct InMemoryPartyRooms {
    rooms: RwLock<HashMap<PartyRoomId, PartyRoom>>,
    open_codes: DashMap<RoomCode, PartyRoomId>,
}

impl InMemoryPartyRooms {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartyRoomRepo for InMemoryPartyRooms {
    async fn get(&self, id: PartyRoomId) -> Result<Option<PartyRoom>, RepoError> {
        Ok(self.rooms.read().await.get(&id).cloned())
    }

    async fn save(&self, room: &PartyRoom) -> Result<(), RepoError> {
        let mut rooms = self.rooms.write().await;
        let code = room.code().clone();
        if room.status() == RoomStatus::Closed {
            self.open_codes.remove_if(&code, |_, id| *id == room.id());
        } else {
            if let Some(owner) = self.open_codes.get(&code) {
                if *owner != room.id() {
                    return Err(RepoError::constraint(format!("room code {code} is in use")));
                }
            }
            self.open_codes.insert(code, room.id());
        }
        rooms.insert(room.id(), stored(room));
        Ok(())
    }

    async fn delete(&self, id: PartyRoomId) -> Result<(), RepoError> {
        if let Some(room) = self.rooms.write().await.remove(&id) {
            self.open_codes.remove_if(room.code(), |_, owner| *owner == id);
        }
        Ok(())
    }

    async fn find_by_code(&self, code: &RoomCode) -> Result<Option<PartyRoom>, RepoError> {
        let Some(id) = self.open_codes.get(code).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.rooms.read().await.get(&id).cloned())
    }

    async fn find_active_by_player(&self, player_id: UserId) -> Result<Option<PartyRoom>, RepoError> {
        Ok(self
            .rooms
            .read()
            .await
            .values()
            .filter(|r| r.status() != RoomStatus::Closed && r.has_player(player_id))
            .max_by_key(|r| r.created_at())
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryPartyGames {
    games: RwLock<HashMap<PartyGameId, PartyGame>>,
}

impl InMemoryPartyGames {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartyGameRepo for InMemoryPartyGames {
    async fn get(&self, id: PartyGameId) -> Result<Option<PartyGame>, RepoError> {
        Ok(self.games.read().await.get(&id).cloned())
    }

    async fn save(&self, game: &PartyGame) -> Result<(), RepoError> {
        self.games.write().await.insert(game.id(), stored(game));
        Ok(())
    }

    async fn delete(&self, id: PartyGameId) -> Result<(), RepoError> {
        self.games.write().await.remove(&id);
        Ok(())
    }

    async fn find_by_room(&self, room_id: PartyRoomId) -> Result<Option<PartyGame>, RepoError> {
        Ok(self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.room_id() == room_id)
            .max_by_key(|g| g.started_at())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use quizsprint_domain::modes::party::RoomSettings;

    use super::*;
    use crate::test_fixtures::now;

    fn room(code: &str) -> PartyRoom {
        PartyRoom::new(
            UserId::new(),
            "host",
            "Friday quiz",
            RoomSettings::default(),
            code.parse().unwrap(),
            now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn code_is_unique_among_open_rooms() {
        let repo = InMemoryPartyRooms::new();
        repo.save(&room("ABC-123")).await.unwrap();

        let err = repo.save(&room("ABC-123")).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn closing_a_room_frees_its_code() {
        let repo = InMemoryPartyRooms::new();
        let mut first = room("ABC-123");
        repo.save(&first).await.unwrap();
        first.close(now()).unwrap();
        repo.save(&first).await.unwrap();

        let code: RoomCode = "ABC-123".parse().unwrap();
        assert!(repo.find_by_code(&code).await.unwrap().is_none());

        let second = room("ABC-123");
        repo.save(&second).await.unwrap();
        assert_eq!(repo.find_by_code(&code).await.unwrap().map(|r| r.id()), Some(second.id()));
    }

    #[tokio::test]
    async fn saved_rooms_carry_no_pending_events() {
        let repo = InMemoryPartyRooms::new();
        let room = room("XYZ-999");
        repo.save(&room).await.unwrap();

        let mut loaded = repo.get(room.id()).await.unwrap().unwrap();
        use quizsprint_domain::EventSource;
        assert!(loaded.take_events().is_empty());
    }
}
