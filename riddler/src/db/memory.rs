//! In-memory [`ContentStore`]
//!
//! Used in dev mode when MongoDB is unreachable, and by tests. Rows keep
//! insertion order, and the same uniqueness rules as the Mongo indexes are
//! enforced (riddle content hash, user email, challenge date).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::db::mongo::MutMetadata;
use crate::db::schemas::{DailyChallengeDoc, RiddleDoc, RoomDoc, RoomPlayer, UserDoc};
use crate::db::store::{AttemptOutcome, ContentStore, RiddleCounter, StreakChange};
use crate::engine::text::content_hash;
use crate::types::{Result, RiddlerError};

#[derive(Default)]
struct Tables {
    riddles: Vec<RiddleDoc>,
    users: Vec<UserDoc>,
    challenges: Vec<DailyChallengeDoc>,
    rooms: Vec<RoomDoc>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn stamp<T: MutMetadata>(item: &mut T) {
    let now = bson::DateTime::now();
    let metadata = item.mut_metadata();
    metadata.created_at.get_or_insert(now);
    metadata.updated_at = Some(now);
}

fn touch<T: MutMetadata>(item: &mut T) {
    item.mut_metadata().updated_at = Some(bson::DateTime::now());
}

fn user_mut<'a>(tables: &'a mut Tables, user_id: &str) -> Option<&'a mut UserDoc> {
    tables.users.iter_mut().find(|u| u.id == user_id)
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_riddle(&self, mut riddle: RiddleDoc) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if let Some(hash) = &riddle.content_hash {
            if tables
                .riddles
                .iter()
                .any(|r| r.content_hash.as_ref() == Some(hash))
            {
                return Ok(false);
            }
        }
        stamp(&mut riddle);
        tables.riddles.push(riddle);
        Ok(true)
    }

    async fn riddle_by_id(&self, id: &str) -> Result<Option<RiddleDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.riddles.iter().find(|r| r.id == id).cloned())
    }

    async fn riddle_by_hash(&self, hash: &str) -> Result<Option<RiddleDoc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .riddles
            .iter()
            .find(|r| r.content_hash.as_deref() == Some(hash))
            .cloned())
    }

    async fn unseen_riddles(
        &self,
        language: &str,
        category: Option<&str>,
        seen: &[String],
    ) -> Result<Vec<RiddleDoc>> {
        let seen: HashSet<&str> = seen.iter().map(String::as_str).collect();
        let tables = self.tables.read().await;
        Ok(tables
            .riddles
            .iter()
            .filter(|r| r.language == language)
            .filter(|r| category.map_or(true, |c| r.category == c))
            .filter(|r| !seen.contains(r.id.as_str()))
            .cloned()
            .collect())
    }

    async fn riddles_in_language(&self, language: &str) -> Result<Vec<RiddleDoc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .riddles
            .iter()
            .filter(|r| r.language == language)
            .cloned()
            .collect())
    }

    async fn recent_answers(&self, language: &str, limit: usize) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        let mut answers: Vec<String> = Vec::new();
        for riddle in tables.riddles.iter().rev().filter(|r| r.language == language) {
            if answers.len() >= limit {
                break;
            }
            if !answers.contains(&riddle.answer) {
                answers.push(riddle.answer.clone());
            }
        }
        Ok(answers)
    }

    async fn answer_or_hash_exists(
        &self,
        language: &str,
        answer: &str,
        hash: &str,
    ) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.riddles.iter().any(|r| {
            r.language == language
                && (r.answer == answer || r.content_hash.as_deref() == Some(hash))
        }))
    }

    async fn count_riddles(&self, language: Option<&str>, category: Option<&str>) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .riddles
            .iter()
            .filter(|r| language.map_or(true, |l| r.language == l))
            .filter(|r| category.map_or(true, |c| r.category == c))
            .count() as u64)
    }

    async fn riddle_counts_by_language(&self) -> Result<Vec<(String, u64)>> {
        let tables = self.tables.read().await;
        let mut counts: Vec<(String, u64)> = Vec::new();
        for riddle in &tables.riddles {
            match counts.iter_mut().find(|(l, _)| *l == riddle.language) {
                Some((_, n)) => *n += 1,
                None => counts.push((riddle.language.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(counts)
    }

    async fn count_distinct_answers(&self, language: &str) -> Result<u64> {
        let tables = self.tables.read().await;
        let answers: HashSet<&str> = tables
            .riddles
            .iter()
            .filter(|r| r.language == language)
            .map(|r| r.answer.as_str())
            .collect();
        Ok(answers.len() as u64)
    }

    async fn bump_riddle_counter(
        &self,
        id: &str,
        counter: RiddleCounter,
    ) -> Result<Option<RiddleDoc>> {
        let mut tables = self.tables.write().await;
        let Some(riddle) = tables.riddles.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        match counter {
            RiddleCounter::Shares => riddle.shares += 1,
            RiddleCounter::Likes => riddle.likes += 1,
        }
        touch(riddle);
        Ok(Some(riddle.clone()))
    }

    async fn backfill_content_hashes(&self) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut known: HashSet<String> = tables
            .riddles
            .iter()
            .filter_map(|r| r.content_hash.clone())
            .collect();

        let mut updated = 0;
        for riddle in tables.riddles.iter_mut().filter(|r| r.content_hash.is_none()) {
            let hash = content_hash(&riddle.question, &riddle.answer);
            if known.insert(hash.clone()) {
                riddle.content_hash = Some(hash);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn insert_user(&self, mut user: UserDoc) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        stamp(&mut user);
        tables.users.push(user);
        Ok(true)
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<UserDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn mark_delivered(&self, user_id: &str, riddle_id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = user_mut(&mut tables, user_id) {
            if !user.has_seen(riddle_id) {
                user.seen_riddles.push(riddle_id.to_string());
            }
            user.current_riddle_attempts.insert(riddle_id.to_string(), 0);
            touch(user);
        }
        Ok(())
    }

    async fn clear_seen(&self, user_id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = user_mut(&mut tables, user_id) {
            user.seen_riddles.clear();
            touch(user);
        }
        Ok(())
    }

    async fn reset_history(&self, user_id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = user_mut(&mut tables, user_id) {
            user.seen_riddles.clear();
            user.current_riddle_attempts.clear();
            touch(user);
        }
        Ok(())
    }

    async fn apply_attempt(&self, user_id: &str, outcome: &AttemptOutcome) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = user_mut(&mut tables, user_id) else {
            return Ok(false);
        };
        if user.attempts_on(&outcome.riddle_id) != outcome.expected_attempts {
            return Ok(false);
        }

        user.solved += 1;
        if outcome.correct {
            user.correct += 1;
        }
        user.points += outcome.points_delta;
        match outcome.streak {
            StreakChange::Keep => {}
            StreakChange::Increment => user.streak += 1,
            StreakChange::Reset => user.streak = 1,
        }
        user.current_riddle_attempts
            .insert(outcome.riddle_id.clone(), outcome.new_attempts);
        user.last_active = Some(bson::DateTime::from_chrono(outcome.at));
        touch(user);
        Ok(true)
    }

    async fn complete_daily(
        &self,
        user_id: &str,
        date: &str,
        bonus: i64,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = user_mut(&mut tables, user_id) else {
            return Ok(false);
        };
        if user.has_answered_daily(date) {
            return Ok(false);
        }

        user.points += bonus;
        user.correct += 1;
        user.solved += 1;
        user.daily_challenges_completed.push(date.to_string());
        user.last_active = Some(bson::DateTime::from_chrono(at));
        touch(user);
        Ok(true)
    }

    async fn record_daily_miss(
        &self,
        user_id: &str,
        date: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = user_mut(&mut tables, user_id) else {
            return Ok(false);
        };
        if user.has_answered_daily(date) {
            return Ok(false);
        }

        user.solved += 1;
        user.daily_challenges_missed.push(date.to_string());
        user.last_active = Some(bson::DateTime::from_chrono(at));
        touch(user);
        Ok(true)
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<UserDoc>> {
        let tables = self.tables.read().await;
        let mut users = tables.users.clone();
        // sort_by is stable, so equal scores keep insertion order
        users.sort_by(|a, b| b.points.cmp(&a.points));
        users.truncate(limit);
        Ok(users)
    }

    async fn count_users_above(&self, points: i64) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().filter(|u| u.points > points).count() as u64)
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn challenge_for(&self, date: &str) -> Result<Option<DailyChallengeDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.challenges.iter().find(|c| c.date == date).cloned())
    }

    async fn insert_challenge(&self, mut challenge: DailyChallengeDoc) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.challenges.iter().any(|c| c.date == challenge.date) {
            return Ok(false);
        }
        stamp(&mut challenge);
        tables.challenges.push(challenge);
        Ok(true)
    }

    async fn add_participant(&self, date: &str, username: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(challenge) = tables.challenges.iter_mut().find(|c| c.date == date) {
            if !challenge.participants.iter().any(|p| p == username) {
                challenge.participants.push(username.to_string());
            }
            touch(challenge);
        }
        Ok(())
    }

    async fn insert_room(&self, mut room: RoomDoc) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.rooms.iter().any(|r| r.id == room.id) {
            return Err(RiddlerError::Conflict("Room id collision".into()));
        }
        stamp(&mut room);
        tables.rooms.push(room);
        Ok(())
    }

    async fn room_by_id(&self, id: &str) -> Result<Option<RoomDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn join_room(&self, room_id: &str, player: RoomPlayer) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(room) = tables.rooms.iter_mut().find(|r| r.id == room_id) else {
            return Ok(false);
        };
        if room.has_player(&player.user_id) || room.is_full() {
            return Ok(false);
        }
        room.players.push(player);
        touch(room);
        Ok(true)
    }

    async fn open_rooms(&self, limit: usize) -> Result<Vec<RoomDoc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rooms
            .iter()
            .rev()
            .filter(|r| r.status.is_open())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_open_rooms(&self) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.rooms.iter().filter(|r| r.status.is_open()).count() as u64)
    }
}
