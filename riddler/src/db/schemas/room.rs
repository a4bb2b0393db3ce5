//! Multiplayer room document schema

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for rooms
pub const ROOM_COLLECTION: &str = "multiplayer_rooms";

/// Default seat count for a new room
pub const DEFAULT_MAX_PLAYERS: i32 = 5;

/// Room lifecycle
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Waiting,
    Active,
    Finished,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }

    /// Rooms that still show up in the lobby
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Waiting | Self::Active)
    }
}

/// Seat in a room
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RoomPlayer {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub answered: bool,
}

impl RoomPlayer {
    pub fn new(user_id: String, username: String) -> Self {
        Self {
            user_id,
            username,
            score: 0,
            answered: false,
        }
    }
}

/// Room document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RoomDoc {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    /// Host username
    pub host: String,

    pub host_id: String,

    #[serde(default)]
    pub players: Vec<RoomPlayer>,

    #[serde(default = "default_max_players")]
    pub max_players: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_riddle: Option<String>,

    #[serde(default)]
    pub status: RoomStatus,
}

fn default_max_players() -> i32 {
    DEFAULT_MAX_PLAYERS
}

impl RoomDoc {
    /// New waiting room with the host in the first seat
    pub fn new(name: String, host_id: String, host: String, max_players: i32) -> Self {
        Self {
            id: bson::oid::ObjectId::new().to_hex(),
            metadata: Metadata::new(),
            name,
            players: vec![RoomPlayer::new(host_id.clone(), host.clone())],
            host,
            host_id,
            max_players,
            current_riddle: None,
            status: RoomStatus::Waiting,
        }
    }

    pub fn has_player(&self, user_id: &str) -> bool {
        self.players.iter().any(|p| p.user_id == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players.max(0) as usize
    }
}

impl IntoIndexes for RoomDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "status": 1 },
            Some(
                IndexOptions::builder()
                    .name("status_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for RoomDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
