//! User document schema
//!
//! Credentials plus the per-player game state: counters, the seen set and the
//! open attempt channels.

use std::collections::HashMap;

use bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::riddle::default_language;
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserDoc {
    /// Hex ObjectId string
    #[serde(rename = "_id")]
    pub id: String,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    pub username: String,

    /// Unique login email
    pub email: String,

    /// Argon2 password hash (legacy rows store a SHA-256 digest as `password`)
    #[serde(alias = "password")]
    pub password_hash: String,

    /// Preferred riddle language
    #[serde(default = "default_language")]
    pub language: String,

    /// Submissions judged (right or wrong)
    #[serde(default)]
    pub solved: i64,

    #[serde(default)]
    pub correct: i64,

    #[serde(default)]
    pub streak: i64,

    #[serde(default)]
    pub points: i64,

    /// Riddle ids already delivered to this user
    #[serde(default)]
    pub seen_riddles: Vec<String>,

    /// Riddle id -> guesses used (0, 1, 2)
    #[serde(default)]
    pub current_riddle_attempts: HashMap<String, i32>,

    /// Daily challenge dates (YYYY-MM-DD) already credited
    #[serde(default)]
    pub daily_challenges_completed: Vec<String>,

    /// Daily challenge dates answered wrong; the answer was disclosed
    #[serde(default)]
    pub daily_challenges_missed: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime>,
}

impl UserDoc {
    /// Create a new user with zeroed game state
    pub fn new(username: String, email: String, password_hash: String, language: String) -> Self {
        Self {
            id: bson::oid::ObjectId::new().to_hex(),
            metadata: Metadata::new(),
            username,
            email,
            password_hash,
            language,
            ..Default::default()
        }
    }

    /// Guesses used on a riddle; absent means none
    pub fn attempts_on(&self, riddle_id: &str) -> i32 {
        self.current_riddle_attempts
            .get(riddle_id)
            .copied()
            .unwrap_or(0)
    }

    /// Whether the daily challenge for `date` was already answered, right or wrong
    pub fn has_answered_daily(&self, date: &str) -> bool {
        self.daily_challenges_completed
            .iter()
            .chain(&self.daily_challenges_missed)
            .any(|d| d == date)
    }

    pub fn has_seen(&self, riddle_id: &str) -> bool {
        self.seen_riddles.iter().any(|id| id == riddle_id)
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
            // Leaderboard ordering
            (
                doc! { "points": -1 },
                Some(
                    IndexOptions::builder()
                        .name("points_desc_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_user_document() {
        let doc = doc! {
            "_id": "u1",
            "username": "ada",
            "email": "ada@example.com",
            "password_hash": "$argon2id$...",
        };

        let user: UserDoc = bson::from_document(doc).unwrap();
        assert_eq!(user.language, "en");
        assert_eq!(user.points, 0);
        assert!(user.seen_riddles.is_empty());
        assert_eq!(user.attempts_on("r1"), 0);
        assert!(user.last_active.is_none());
    }

    #[test]
    fn test_new_user_has_id() {
        let user = UserDoc::new("ada".into(), "ada@example.com".into(), "h".into(), "en".into());
        assert_eq!(user.id.len(), 24);
        assert!(user.metadata.created_at.is_some());
    }
}
