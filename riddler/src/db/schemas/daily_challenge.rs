//! Daily challenge document schema

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{Metadata, RiddleDoc};

/// Collection name for daily challenges
pub const DAILY_CHALLENGE_COLLECTION: &str = "daily_challenges";

/// One riddle per UTC date
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DailyChallengeDoc {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub metadata: Metadata,

    /// UTC date, YYYY-MM-DD
    pub date: String,

    pub riddle_id: String,

    /// Embedded copy of the riddle at creation time
    pub riddle: RiddleDoc,

    /// Usernames that completed the challenge
    #[serde(default)]
    pub participants: Vec<String>,
}

impl DailyChallengeDoc {
    pub fn new(date: String, riddle: RiddleDoc) -> Self {
        Self {
            id: bson::oid::ObjectId::new().to_hex(),
            metadata: Metadata::new(),
            date,
            riddle_id: riddle.id.clone(),
            riddle,
            participants: Vec::new(),
        }
    }
}

impl IntoIndexes for DailyChallengeDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "date": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("date_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for DailyChallengeDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
