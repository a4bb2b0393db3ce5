//! Riddle document schema
//!
//! One row per riddle per language. English rows are the corpus of record for
//! deduplication; translated rows carry their own hash and language tag.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for riddles
pub const RIDDLE_COLLECTION: &str = "riddles";

/// Source tag for riddles produced by the generation provider
pub const SOURCE_GENERATED: &str = "generated";

/// Source tag for translated copies
pub const SOURCE_TRANSLATED: &str = "translated";

/// Riddle difficulty as reported by the generator
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    /// Any label the generator invented
    #[serde(other)]
    Unrated,
}

impl Difficulty {
    /// Parse a generator label, case-insensitively
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Unrated => "unrated",
        }
    }
}

/// Riddle document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RiddleDoc {
    /// Hex ObjectId string
    #[serde(rename = "_id")]
    pub id: String,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Question text, trimmed
    pub question: String,

    /// Normalized (trimmed, lowercase) answer
    pub answer: String,

    /// SHA-256 over normalized question + answer; absent on legacy rows
    /// until the startup backfill runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub hints: Vec<String>,

    /// Where the riddle came from (generated, translated)
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub shares: i64,

    #[serde(default)]
    pub likes: i64,
}

fn default_category() -> String {
    "general".to_string()
}

pub(crate) fn default_language() -> String {
    "en".to_string()
}

impl RiddleDoc {
    /// Create a new riddle with zeroed counters and no hints
    pub fn new(
        question: String,
        answer: String,
        content_hash: String,
        category: String,
        difficulty: Difficulty,
        language: String,
        source: &str,
    ) -> Self {
        Self {
            id: bson::oid::ObjectId::new().to_hex(),
            metadata: Metadata::new(),
            question,
            answer,
            content_hash: Some(content_hash),
            category,
            difficulty,
            language,
            hints: Vec::new(),
            source: source.to_string(),
            shares: 0,
            likes: 0,
        }
    }
}

impl IntoIndexes for RiddleDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Corpus-wide deduplication; sparse so legacy rows without a hash
            // do not collide with each other before the backfill
            (
                doc! { "content_hash": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name("content_hash_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "language": 1, "answer": 1 },
                Some(
                    IndexOptions::builder()
                        .name("language_answer_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "language": 1, "category": 1 },
                Some(
                    IndexOptions::builder()
                        .name("language_category_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for RiddleDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_document_defaults() {
        let doc = doc! {
            "_id": "abc",
            "question": "What has keys but opens no locks?",
            "answer": "piano",
            "difficulty": "tricky",
        };

        let riddle: RiddleDoc = bson::from_document(doc).unwrap();
        assert_eq!(riddle.category, "general");
        assert_eq!(riddle.language, "en");
        assert_eq!(riddle.difficulty, Difficulty::Unrated);
        assert_eq!(riddle.content_hash, None);
        assert_eq!(riddle.shares, 0);
        assert!(riddle.hints.is_empty());
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse(" Hard "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("fiendish"), None);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }
}
