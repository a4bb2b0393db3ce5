//! Content store seam
//!
//! The engine talks to persistence only through [`ContentStore`]. Every
//! method is one domain-level read or one conditional write, so the Mongo
//! implementation maps each onto a single driver call and the in-memory
//! implementation can reproduce the same outcomes under a lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::schemas::{DailyChallengeDoc, RiddleDoc, RoomDoc, RoomPlayer, UserDoc};
use crate::types::Result;

/// Popularity counters on a riddle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiddleCounter {
    Shares,
    Likes,
}

impl RiddleCounter {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Shares => "shares",
            Self::Likes => "likes",
        }
    }
}

/// How a submission moves the streak counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    Keep,
    Increment,
    Reset,
}

/// A judged submission, applied as one conditional update.
///
/// The update only lands while the stored counter for `riddle_id` still
/// equals `expected_attempts`.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub riddle_id: String,
    pub expected_attempts: i32,
    pub new_attempts: i32,
    pub correct: bool,
    pub points_delta: i64,
    pub streak: StreakChange,
    pub at: DateTime<Utc>,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    // ---- riddles ----

    /// Insert a riddle; `false` when its content hash already exists
    async fn insert_riddle(&self, riddle: RiddleDoc) -> Result<bool>;

    async fn riddle_by_id(&self, id: &str) -> Result<Option<RiddleDoc>>;

    async fn riddle_by_hash(&self, hash: &str) -> Result<Option<RiddleDoc>>;

    /// Riddles in a language (optionally a category) whose id is not in `seen`
    async fn unseen_riddles(
        &self,
        language: &str,
        category: Option<&str>,
        seen: &[String],
    ) -> Result<Vec<RiddleDoc>>;

    async fn riddles_in_language(&self, language: &str) -> Result<Vec<RiddleDoc>>;

    /// Distinct answers, newest riddle first, at most `limit`
    async fn recent_answers(&self, language: &str, limit: usize) -> Result<Vec<String>>;

    /// True when a riddle in `language` already uses this answer or hash
    async fn answer_or_hash_exists(&self, language: &str, answer: &str, hash: &str)
        -> Result<bool>;

    async fn count_riddles(&self, language: Option<&str>, category: Option<&str>) -> Result<u64>;

    /// Riddle count per language tag, sorted by language
    async fn riddle_counts_by_language(&self) -> Result<Vec<(String, u64)>>;

    async fn count_distinct_answers(&self, language: &str) -> Result<u64>;

    /// Increment a counter and return the updated riddle
    async fn bump_riddle_counter(
        &self,
        id: &str,
        counter: RiddleCounter,
    ) -> Result<Option<RiddleDoc>>;

    /// Compute `content_hash` for rows that lack one; returns rows updated
    async fn backfill_content_hashes(&self) -> Result<u64>;

    // ---- users ----

    /// Insert a user; `false` when the email is taken
    async fn insert_user(&self, user: UserDoc) -> Result<bool>;

    async fn user_by_id(&self, id: &str) -> Result<Option<UserDoc>>;

    async fn user_by_email(&self, email: &str) -> Result<Option<UserDoc>>;

    /// Add to the seen set and open a fresh attempt channel
    async fn mark_delivered(&self, user_id: &str, riddle_id: &str) -> Result<()>;

    async fn clear_seen(&self, user_id: &str) -> Result<()>;

    /// Clear both the seen set and the attempt map
    async fn reset_history(&self, user_id: &str) -> Result<()>;

    /// Apply a judged submission; `false` when the counter moved underneath
    async fn apply_attempt(&self, user_id: &str, outcome: &AttemptOutcome) -> Result<bool>;

    /// Credit a daily challenge once per date; `false` when already answered
    async fn complete_daily(
        &self,
        user_id: &str,
        date: &str,
        bonus: i64,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Record a wrong daily answer once per date; `false` when already answered
    async fn record_daily_miss(&self, user_id: &str, date: &str, at: DateTime<Utc>)
        -> Result<bool>;

    /// Users by points descending; ties keep store order
    async fn top_users(&self, limit: usize) -> Result<Vec<UserDoc>>;

    async fn count_users_above(&self, points: i64) -> Result<u64>;

    async fn count_users(&self) -> Result<u64>;

    // ---- daily challenges ----

    async fn challenge_for(&self, date: &str) -> Result<Option<DailyChallengeDoc>>;

    /// Insert a challenge; `false` when the date already has one
    async fn insert_challenge(&self, challenge: DailyChallengeDoc) -> Result<bool>;

    async fn add_participant(&self, date: &str, username: &str) -> Result<()>;

    // ---- rooms ----

    async fn insert_room(&self, room: RoomDoc) -> Result<()>;

    async fn room_by_id(&self, id: &str) -> Result<Option<RoomDoc>>;

    /// Take a seat; `false` when the room is full or already has this player
    async fn join_room(&self, room_id: &str, player: RoomPlayer) -> Result<bool>;

    /// Waiting or active rooms, at most `limit`
    async fn open_rooms(&self, limit: usize) -> Result<Vec<RoomDoc>>;

    async fn count_open_rooms(&self) -> Result<u64>;
}
