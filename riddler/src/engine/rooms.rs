//! Multiplayer rooms: create, join, fetch, list

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::db::schemas::{RoomDoc, RoomPlayer, RoomStatus, UserDoc, DEFAULT_MAX_PLAYERS};
use crate::db::ContentStore;
use crate::types::{Result, RiddlerError};

/// Rooms listed in the lobby
pub const LOBBY_LIMIT: usize = 20;

const MIN_PLAYERS: i32 = 2;
const MAX_PLAYERS: i32 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct RoomCreated {
    pub room_id: String,
    pub room_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomJoined {
    pub message: String,
    pub room_id: String,
    pub players: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomDetail {
    pub room_id: String,
    pub name: String,
    pub host: String,
    pub players: Vec<RoomPlayer>,
    pub max_players: i32,
    pub status: RoomStatus,
    pub current_riddle: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub room_id: String,
    pub name: String,
    pub host: String,
    pub players: usize,
    pub max_players: i32,
}

#[derive(Clone)]
pub struct Rooms {
    store: Arc<dyn ContentStore>,
}

impl Rooms {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        host: &UserDoc,
        name: &str,
        max_players: Option<i32>,
    ) -> Result<RoomCreated> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RiddlerError::BadRequest("room_name is required".into()));
        }
        let max_players = max_players.unwrap_or(DEFAULT_MAX_PLAYERS);
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(RiddlerError::BadRequest(format!(
                "max_players must be between {} and {}",
                MIN_PLAYERS, MAX_PLAYERS
            )));
        }

        let room = RoomDoc::new(name.to_string(), host.id.clone(), host.username.clone(), max_players);
        let room_id = room.id.clone();
        self.store.insert_room(room).await?;
        info!(room_id = %room_id, host = %host.username, "Room created");

        Ok(RoomCreated {
            room_id,
            room_name: name.to_string(),
            message: "Room created! Share room ID with friends.".into(),
        })
    }

    pub async fn join(&self, user: &UserDoc, room_id: &str) -> Result<RoomJoined> {
        let room = self.find(room_id).await?;
        if room.is_full() {
            return Err(RiddlerError::RoomFull);
        }
        if room.has_player(&user.id) {
            return Err(RiddlerError::AlreadyJoined);
        }

        let seat = RoomPlayer::new(user.id.clone(), user.username.clone());
        if !self.store.join_room(room_id, seat).await? {
            // Lost a race; report whichever condition now holds
            let room = self.find(room_id).await?;
            return Err(if room.has_player(&user.id) {
                RiddlerError::AlreadyJoined
            } else {
                RiddlerError::RoomFull
            });
        }

        Ok(RoomJoined {
            message: format!("Joined room: {}", room.name),
            room_id: room.id,
            players: room.players.len() + 1,
        })
    }

    pub async fn get(&self, room_id: &str) -> Result<RoomDetail> {
        let room = self.find(room_id).await?;
        Ok(RoomDetail {
            room_id: room.id,
            name: room.name,
            host: room.host,
            players: room.players,
            max_players: room.max_players,
            status: room.status,
            current_riddle: room.current_riddle,
        })
    }

    pub async fn lobby(&self) -> Result<Vec<RoomSummary>> {
        let rooms = self.store.open_rooms(LOBBY_LIMIT).await?;
        Ok(rooms
            .into_iter()
            .map(|room| RoomSummary {
                players: room.players.len(),
                room_id: room.id,
                name: room.name,
                host: room.host,
                max_players: room.max_players,
            })
            .collect())
    }

    async fn find(&self, room_id: &str) -> Result<RoomDoc> {
        self.store
            .room_by_id(room_id)
            .await?
            .ok_or_else(|| RiddlerError::NotFound("Room".into()))
    }
}
