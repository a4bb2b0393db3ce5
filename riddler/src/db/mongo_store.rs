//! MongoDB-backed [`ContentStore`]

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::options::ReturnDocument;
use tracing::{info, warn};

use crate::db::mongo::{is_duplicate_key, MongoClient, MongoCollection};
use crate::db::schemas::{
    DailyChallengeDoc, RiddleDoc, RoomDoc, RoomPlayer, UserDoc, DAILY_CHALLENGE_COLLECTION,
    RIDDLE_COLLECTION, ROOM_COLLECTION, USER_COLLECTION,
};
use crate::db::store::{AttemptOutcome, ContentStore, RiddleCounter, StreakChange};
use crate::engine::text::content_hash;
use crate::types::{Result, RiddlerError};

/// Typed handles to the four collections
#[derive(Clone)]
pub struct MongoStore {
    riddles: MongoCollection<RiddleDoc>,
    users: MongoCollection<UserDoc>,
    challenges: MongoCollection<DailyChallengeDoc>,
    rooms: MongoCollection<RoomDoc>,
}

impl MongoStore {
    /// Open every collection, creating indexes as needed
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            riddles: client.collection(RIDDLE_COLLECTION).await?,
            users: client.collection(USER_COLLECTION).await?,
            challenges: client.collection(DAILY_CHALLENGE_COLLECTION).await?,
            rooms: client.collection(ROOM_COLLECTION).await?,
        })
    }
}

fn attempts_key(riddle_id: &str) -> String {
    format!("current_riddle_attempts.{}", riddle_id)
}

fn riddle_filter(language: Option<&str>, category: Option<&str>) -> Document {
    let mut filter = Document::new();
    if let Some(language) = language {
        filter.insert("language", language);
    }
    if let Some(category) = category {
        filter.insert("category", category);
    }
    filter
}

#[async_trait]
impl ContentStore for MongoStore {
    // =========================================================================
    // Riddles
    // =========================================================================

    async fn insert_riddle(&self, riddle: RiddleDoc) -> Result<bool> {
        self.riddles.insert_one(riddle).await
    }

    async fn riddle_by_id(&self, id: &str) -> Result<Option<RiddleDoc>> {
        self.riddles.find_one(doc! { "_id": id }).await
    }

    async fn riddle_by_hash(&self, hash: &str) -> Result<Option<RiddleDoc>> {
        self.riddles.find_one(doc! { "content_hash": hash }).await
    }

    async fn unseen_riddles(
        &self,
        language: &str,
        category: Option<&str>,
        seen: &[String],
    ) -> Result<Vec<RiddleDoc>> {
        let mut filter = riddle_filter(Some(language), category);
        filter.insert("_id", doc! { "$nin": seen.to_vec() });
        self.riddles.find_many(filter, None, None).await
    }

    async fn riddles_in_language(&self, language: &str) -> Result<Vec<RiddleDoc>> {
        self.riddles
            .find_many(doc! { "language": language }, None, None)
            .await
    }

    async fn recent_answers(&self, language: &str, limit: usize) -> Result<Vec<String>> {
        let pipeline = vec![
            doc! { "$match": { "language": language } },
            doc! { "$group": {
                "_id": "$answer",
                "latest": { "$max": "$metadata.created_at" },
            } },
            doc! { "$sort": { "latest": -1 } },
            doc! { "$limit": limit as i64 },
        ];

        let rows: Vec<Document> = self
            .riddles
            .inner()
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.get_str("_id").ok().map(str::to_string))
            .collect())
    }

    async fn answer_or_hash_exists(
        &self,
        language: &str,
        answer: &str,
        hash: &str,
    ) -> Result<bool> {
        let filter = doc! {
            "language": language,
            "$or": [ { "answer": answer }, { "content_hash": hash } ],
        };
        Ok(self.riddles.find_one(filter).await?.is_some())
    }

    async fn count_riddles(&self, language: Option<&str>, category: Option<&str>) -> Result<u64> {
        self.riddles.count(riddle_filter(language, category)).await
    }

    async fn riddle_counts_by_language(&self) -> Result<Vec<(String, u64)>> {
        let mut languages: Vec<String> = self
            .riddles
            .distinct("language", doc! {})
            .await?
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect();
        languages.sort();

        let mut counts = Vec::with_capacity(languages.len());
        for language in languages {
            let count = self.riddles.count(doc! { "language": language.as_str() }).await?;
            counts.push((language, count));
        }
        Ok(counts)
    }

    async fn count_distinct_answers(&self, language: &str) -> Result<u64> {
        let answers = self
            .riddles
            .distinct("answer", doc! { "language": language })
            .await?;
        Ok(answers.len() as u64)
    }

    async fn bump_riddle_counter(
        &self,
        id: &str,
        counter: RiddleCounter,
    ) -> Result<Option<RiddleDoc>> {
        let mut inc = Document::new();
        inc.insert(counter.field(), 1_i64);

        let riddle = self
            .riddles
            .inner()
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": inc })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(riddle)
    }

    async fn backfill_content_hashes(&self) -> Result<u64> {
        let legacy = self
            .riddles
            .find_many(doc! { "content_hash": { "$exists": false } }, None, None)
            .await?;

        let mut updated = 0;
        for riddle in legacy {
            let hash = content_hash(&riddle.question, &riddle.answer);
            match self
                .riddles
                .inner()
                .update_one(
                    doc! { "_id": riddle.id.as_str() },
                    doc! { "$set": { "content_hash": hash.as_str() } },
                )
                .await
            {
                Ok(_) => updated += 1,
                Err(e) if is_duplicate_key(&e) => {
                    warn!(riddle_id = %riddle.id, "Legacy riddle duplicates existing content, left unhashed");
                }
                Err(e) => return Err(e.into()),
            }
        }

        if updated > 0 {
            info!("Backfilled content hash on {} riddles", updated);
        }
        Ok(updated)
    }

    // =========================================================================
    // Users
    // =========================================================================

    async fn insert_user(&self, user: UserDoc) -> Result<bool> {
        self.users.insert_one(user).await
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "_id": id }).await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "email": email }).await
    }

    async fn mark_delivered(&self, user_id: &str, riddle_id: &str) -> Result<()> {
        let mut set = Document::new();
        set.insert(attempts_key(riddle_id), 0);

        self.users
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$addToSet": { "seen_riddles": riddle_id },
                    "$set": set,
                },
            )
            .await?;
        Ok(())
    }

    async fn clear_seen(&self, user_id: &str) -> Result<()> {
        self.users
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "seen_riddles": [] } },
            )
            .await?;
        Ok(())
    }

    async fn reset_history(&self, user_id: &str) -> Result<()> {
        self.users
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "seen_riddles": [], "current_riddle_attempts": {} } },
            )
            .await?;
        Ok(())
    }

    async fn apply_attempt(&self, user_id: &str, outcome: &AttemptOutcome) -> Result<bool> {
        let key = attempts_key(&outcome.riddle_id);

        let mut current = Document::new();
        current.insert(key.as_str(), outcome.expected_attempts);
        let mut guards = vec![Bson::Document(current)];
        if outcome.expected_attempts == 0 {
            let mut absent = Document::new();
            absent.insert(key.as_str(), doc! { "$exists": false });
            guards.push(Bson::Document(absent));
        }
        let filter = doc! { "_id": user_id, "$or": guards };

        let mut inc = doc! {
            "solved": 1_i64,
            "correct": if outcome.correct { 1_i64 } else { 0_i64 },
            "points": outcome.points_delta,
        };
        let mut set = doc! {
            "last_active": bson::DateTime::from_chrono(outcome.at),
        };
        set.insert(key, outcome.new_attempts);
        match outcome.streak {
            StreakChange::Keep => {}
            StreakChange::Increment => {
                inc.insert("streak", 1_i64);
            }
            StreakChange::Reset => {
                set.insert("streak", 1_i64);
            }
        }

        let result = self
            .users
            .update_one(filter, doc! { "$inc": inc, "$set": set })
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn complete_daily(
        &self,
        user_id: &str,
        date: &str,
        bonus: i64,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = self
            .users
            .update_one(
                doc! {
                    "_id": user_id,
                    "daily_challenges_completed": { "$ne": date },
                    "daily_challenges_missed": { "$ne": date },
                },
                doc! {
                    "$inc": { "points": bonus, "correct": 1_i64, "solved": 1_i64 },
                    "$addToSet": { "daily_challenges_completed": date },
                    "$set": { "last_active": bson::DateTime::from_chrono(at) },
                },
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn record_daily_miss(
        &self,
        user_id: &str,
        date: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = self
            .users
            .update_one(
                doc! {
                    "_id": user_id,
                    "daily_challenges_completed": { "$ne": date },
                    "daily_challenges_missed": { "$ne": date },
                },
                doc! {
                    "$inc": { "solved": 1_i64 },
                    "$addToSet": { "daily_challenges_missed": date },
                    "$set": { "last_active": bson::DateTime::from_chrono(at) },
                },
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<UserDoc>> {
        // ObjectId hex sorts by creation time, which keeps ties in store order
        self.users
            .find_many(
                doc! {},
                Some(doc! { "points": -1, "_id": 1 }),
                Some(limit as i64),
            )
            .await
    }

    async fn count_users_above(&self, points: i64) -> Result<u64> {
        self.users.count(doc! { "points": { "$gt": points } }).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.users.count(doc! {}).await
    }

    // =========================================================================
    // Daily challenges
    // =========================================================================

    async fn challenge_for(&self, date: &str) -> Result<Option<DailyChallengeDoc>> {
        self.challenges.find_one(doc! { "date": date }).await
    }

    async fn insert_challenge(&self, challenge: DailyChallengeDoc) -> Result<bool> {
        self.challenges.insert_one(challenge).await
    }

    async fn add_participant(&self, date: &str, username: &str) -> Result<()> {
        self.challenges
            .update_one(
                doc! { "date": date },
                doc! { "$addToSet": { "participants": username } },
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Rooms
    // =========================================================================

    async fn insert_room(&self, room: RoomDoc) -> Result<()> {
        if self.rooms.insert_one(room).await? {
            Ok(())
        } else {
            Err(RiddlerError::Conflict("Room id collision".into()))
        }
    }

    async fn room_by_id(&self, id: &str) -> Result<Option<RoomDoc>> {
        self.rooms.find_one(doc! { "_id": id }).await
    }

    async fn join_room(&self, room_id: &str, player: RoomPlayer) -> Result<bool> {
        let filter = doc! {
            "_id": room_id,
            "players.user_id": { "$ne": player.user_id.as_str() },
            "$expr": { "$lt": [ { "$size": "$players" }, "$max_players" ] },
        };
        let seat = bson::to_bson(&player)?;

        let result = self
            .rooms
            .update_one(filter, doc! { "$push": { "players": seat } })
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn open_rooms(&self, limit: usize) -> Result<Vec<RoomDoc>> {
        self.rooms
            .find_many(
                doc! { "status": { "$in": ["waiting", "active"] } },
                Some(doc! { "metadata.created_at": -1 }),
                Some(limit as i64),
            )
            .await
    }

    async fn count_open_rooms(&self) -> Result<u64> {
        self.rooms
            .count(doc! { "status": { "$in": ["waiting", "active"] } })
            .await
    }
}
