//! Database schemas for Riddler
//!
//! MongoDB document structures for riddles, users, daily challenges and rooms.

mod daily_challenge;
mod metadata;
mod riddle;
mod room;
mod user;

pub use daily_challenge::{DailyChallengeDoc, DAILY_CHALLENGE_COLLECTION};
pub use metadata::Metadata;
pub use riddle::{
    Difficulty, RiddleDoc, RIDDLE_COLLECTION, SOURCE_GENERATED, SOURCE_TRANSLATED,
};
pub use room::{RoomDoc, RoomPlayer, RoomStatus, DEFAULT_MAX_PLAYERS, ROOM_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
