//! Corpus-level views: categories, sharing, likes and service status

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::db::schemas::{Difficulty, RiddleDoc};
use crate::db::{ContentStore, RiddleCounter};
use crate::engine::prompts::CATEGORIES;
use crate::types::{Result, RiddlerError};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub name: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SharedRiddle {
    pub id: String,
    pub question: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub shares: i64,
    pub likes: i64,
}

impl From<RiddleDoc> for SharedRiddle {
    fn from(riddle: RiddleDoc) -> Self {
        Self {
            id: riddle.id,
            question: riddle.question,
            category: riddle.category,
            difficulty: riddle.difficulty,
            shares: riddle.shares,
            likes: riddle.likes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareReceipt {
    pub message: String,
    pub share_url: String,
    pub riddle: SharedRiddle,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeReceipt {
    pub message: String,
    pub likes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rules {
    pub attempts: &'static str,
    pub correct: &'static str,
    pub wrong: &'static str,
    pub daily_challenge: &'static str,
    pub ranks: &'static str,
}

pub const RULES: Rules = Rules {
    attempts: "2 per riddle",
    correct: "+10 to +20 points (+5 bonus first try)",
    wrong: "-5 points after 2 attempts",
    daily_challenge: "+50 bonus points",
    ranks: "500, 1000, 1500, 2000+",
};

#[derive(Debug, Clone, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub riddles: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub riddles_by_language: Vec<LanguageCount>,
    pub unique_english_answers: u64,
    pub users: u64,
    pub active_rooms: u64,
    pub rules: Rules,
}

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn ContentStore>,
    share_base_url: String,
}

impl Catalog {
    pub fn new(store: Arc<dyn ContentStore>, share_base_url: impl Into<String>) -> Self {
        Self {
            store,
            share_base_url: share_base_url.into(),
        }
    }

    pub fn share_url(&self, riddle_id: &str) -> String {
        format!("{}/{}", self.share_base_url.trim_end_matches('/'), riddle_id)
    }

    /// Known categories with their English riddle counts
    pub async fn categories(&self) -> Result<Vec<CategoryCount>> {
        let mut counts = Vec::with_capacity(CATEGORIES.len());
        for &name in CATEGORIES {
            let count = self.store.count_riddles(Some("en"), Some(name)).await?;
            counts.push(CategoryCount { name, count });
        }
        Ok(counts)
    }

    pub async fn share(&self, riddle_id: &str) -> Result<ShareReceipt> {
        let riddle = self
            .store
            .bump_riddle_counter(riddle_id, RiddleCounter::Shares)
            .await?
            .ok_or_else(|| RiddlerError::NotFound("Riddle".into()))?;
        info!(riddle_id, shares = riddle.shares, "Riddle shared");

        Ok(ShareReceipt {
            message: "Riddle shared!".into(),
            share_url: self.share_url(riddle_id),
            riddle: riddle.into(),
        })
    }

    pub async fn like(&self, riddle_id: &str) -> Result<LikeReceipt> {
        let riddle = self
            .store
            .bump_riddle_counter(riddle_id, RiddleCounter::Likes)
            .await?
            .ok_or_else(|| RiddlerError::NotFound("Riddle".into()))?;

        Ok(LikeReceipt {
            message: "Riddle liked!".into(),
            likes: riddle.likes,
        })
    }

    /// Public view of a shared riddle
    pub async fn shared(&self, riddle_id: &str) -> Result<SharedRiddle> {
        self.store
            .riddle_by_id(riddle_id)
            .await?
            .map(SharedRiddle::from)
            .ok_or_else(|| RiddlerError::NotFound("Riddle".into()))
    }

    pub async fn status(&self) -> Result<ServiceStatus> {
        let riddles_by_language = self
            .store
            .riddle_counts_by_language()
            .await?
            .into_iter()
            .map(|(language, riddles)| LanguageCount { language, riddles })
            .collect();

        Ok(ServiceStatus {
            service: "riddler",
            version: env!("CARGO_PKG_VERSION"),
            status: "running",
            riddles_by_language,
            unique_english_answers: self.store.count_distinct_answers("en").await?,
            users: self.store.count_users().await?,
            active_rooms: self.store.count_open_rooms().await?,
            rules: RULES,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::engine::text::content_hash;

    async fn seeded() -> (Catalog, String) {
        let store = Arc::new(MemoryStore::new());
        let riddle = RiddleDoc::new(
            "I point north".into(),
            "compass".into(),
            content_hash("I point north", "compass"),
            "objects".into(),
            Difficulty::Easy,
            "en".into(),
            "generated",
        );
        let id = riddle.id.clone();
        store.insert_riddle(riddle).await.unwrap();
        (Catalog::new(store, "https://riddles.example/r/"), id)
    }

    #[tokio::test]
    async fn test_share_and_like_counters() {
        let (catalog, id) = seeded().await;

        let receipt = catalog.share(&id).await.unwrap();
        assert_eq!(receipt.share_url, format!("https://riddles.example/r/{}", id));
        assert_eq!(receipt.riddle.shares, 1);

        assert_eq!(catalog.like(&id).await.unwrap().likes, 1);
        assert_eq!(catalog.shared(&id).await.unwrap().shares, 1);
        assert!(matches!(
            catalog.share("missing").await.unwrap_err(),
            RiddlerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_categories_and_status() {
        let (catalog, _) = seeded().await;

        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories.len(), 6);
        let objects = categories.iter().find(|c| c.name == "objects").unwrap();
        assert_eq!(objects.count, 1);

        let status = catalog.status().await.unwrap();
        assert_eq!(status.riddles_by_language.len(), 1);
        assert_eq!(status.unique_english_answers, 1);
        assert_eq!(status.users, 0);
    }
}
