//! Riddle delivery and answer submission
//!
//! Delivery records the riddle in the user's seen set and opens a fresh
//! attempt channel. Submission judges a guess and applies the result with a
//! compare-and-swap on the attempt counter, so two racing submits for the
//! same riddle cannot both be scored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::db::schemas::{Difficulty, RiddleDoc, UserDoc};
use crate::db::{AttemptOutcome, ContentStore, StreakChange};
use crate::engine::freshness::{FreshnessEngine, ServedFrom};
use crate::engine::scoring::{self, Rank, FINAL_MISS_PENALTY, MAX_ATTEMPTS};
use crate::engine::text::judge;
use crate::types::{Result, RiddlerError};

/// Compare-and-swap retries before a submission gives up
const MAX_SUBMIT_RETRIES: usize = 3;

/// Riddle as shown to a player; never carries the answer
#[derive(Debug, Clone, Serialize)]
pub struct RiddleView {
    pub id: String,
    pub question: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub language: String,
    pub hints: Vec<String>,
    pub shares: i64,
    pub likes: i64,
    pub attempts_left: i32,
}

impl RiddleView {
    pub fn new(riddle: &RiddleDoc, attempts_left: i32) -> Self {
        Self {
            id: riddle.id.clone(),
            question: riddle.question.clone(),
            category: riddle.category.clone(),
            difficulty: riddle.difficulty,
            language: riddle.language.clone(),
            hints: riddle.hints.clone(),
            shares: riddle.shares,
            likes: riddle.likes,
            attempts_left,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStats {
    pub solved: i64,
    pub correct: i64,
    pub streak: i64,
    pub points: i64,
}

impl From<&UserDoc> for PlayerStats {
    fn from(user: &UserDoc) -> Self {
        Self {
            solved: user.solved,
            correct: user.correct,
            streak: user.streak,
            points: user.points,
        }
    }
}

/// Result of one judged submission
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub correct: bool,
    /// Disclosed only when the channel closes on a miss
    pub answer: Option<String>,
    pub message: String,
    pub points_change: i64,
    pub attempts_left: i32,
    pub skip_to_next: bool,
    pub max_attempts_reached: bool,
    pub stats: PlayerStats,
    pub rank: Rank,
}

/// Counters as they will read once `outcome` lands
fn project(user: &UserDoc, outcome: &AttemptOutcome) -> PlayerStats {
    let streak = match outcome.streak {
        StreakChange::Keep => user.streak,
        StreakChange::Increment => user.streak + 1,
        StreakChange::Reset => 1,
    };
    PlayerStats {
        solved: user.solved + 1,
        correct: user.correct + i64::from(outcome.correct),
        streak,
        points: user.points + outcome.points_delta,
    }
}

#[derive(Clone)]
pub struct Delivery {
    store: Arc<dyn ContentStore>,
    freshness: FreshnessEngine,
    strict_answers: bool,
}

impl Delivery {
    pub fn new(store: Arc<dyn ContentStore>, freshness: FreshnessEngine, strict_answers: bool) -> Self {
        Self {
            store,
            freshness,
            strict_answers,
        }
    }

    /// Serve a riddle the user has not seen and open its attempt channel
    pub async fn deliver(
        &self,
        user: &UserDoc,
        language: &str,
        category: Option<&str>,
    ) -> Result<RiddleView> {
        let obtained = self
            .freshness
            .obtain(language, category, &user.seen_riddles)
            .await?;

        if obtained.served_from == ServedFrom::Exhausted {
            info!(user_id = %user.id, "Seen set exhausted, resetting");
            self.store.clear_seen(&user.id).await?;
        }

        self.store.mark_delivered(&user.id, &obtained.riddle.id).await?;
        debug!(
            user_id = %user.id,
            riddle_id = %obtained.riddle.id,
            served_from = ?obtained.served_from,
            "Delivered riddle"
        );

        Ok(RiddleView::new(&obtained.riddle, MAX_ATTEMPTS))
    }

    pub async fn submit(&self, user_id: &str, riddle_id: &str, answer: &str) -> Result<Verdict> {
        self.submit_at(user_id, riddle_id, answer, Utc::now()).await
    }

    /// Judge a guess as of `now`
    pub async fn submit_at(
        &self,
        user_id: &str,
        riddle_id: &str,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<Verdict> {
        let riddle = self
            .store
            .riddle_by_id(riddle_id)
            .await?
            .ok_or_else(|| RiddlerError::NotFound("Riddle".into()))?;

        let correct = judge(answer, &riddle.answer, self.strict_answers);

        for _ in 0..MAX_SUBMIT_RETRIES {
            let user = self
                .store
                .user_by_id(user_id)
                .await?
                .ok_or_else(|| RiddlerError::Unauthorized("User not found".into()))?;

            let used = user.attempts_on(riddle_id);
            if used >= MAX_ATTEMPTS {
                return Err(RiddlerError::AttemptsExhausted {
                    answer: riddle.answer.clone(),
                });
            }

            let attempt = used + 1;
            let outcome = if correct {
                AttemptOutcome {
                    riddle_id: riddle_id.to_string(),
                    expected_attempts: used,
                    // A correct answer closes the channel
                    new_attempts: MAX_ATTEMPTS,
                    correct: true,
                    points_delta: scoring::correct_points(riddle.difficulty, attempt),
                    streak: scoring::streak_change(
                        user.last_active.map(|t| t.to_chrono()),
                        now,
                    ),
                    at: now,
                }
            } else {
                AttemptOutcome {
                    riddle_id: riddle_id.to_string(),
                    expected_attempts: used,
                    new_attempts: attempt,
                    correct: false,
                    points_delta: if attempt >= MAX_ATTEMPTS {
                        -FINAL_MISS_PENALTY
                    } else {
                        0
                    },
                    streak: StreakChange::Keep,
                    at: now,
                }
            };

            if !self.store.apply_attempt(user_id, &outcome).await? {
                debug!(user_id, riddle_id, "Attempt counter moved, retrying");
                continue;
            }

            let stats = project(&user, &outcome);
            let closed = outcome.new_attempts >= MAX_ATTEMPTS;
            let message = if correct {
                format!("🎉 Correct! +{} points", outcome.points_delta)
            } else if closed {
                format!(
                    "❌ Wrong! -{} points. Answer was: {}",
                    FINAL_MISS_PENALTY, riddle.answer
                )
            } else {
                "❌ Wrong! 1 attempt left. Try again!".to_string()
            };

            info!(user_id, riddle_id, attempt, correct, points = outcome.points_delta, "Answer judged");

            return Ok(Verdict {
                correct,
                answer: (closed && !correct).then(|| riddle.answer.clone()),
                message,
                points_change: outcome.points_delta,
                attempts_left: MAX_ATTEMPTS - outcome.new_attempts,
                skip_to_next: closed,
                max_attempts_reached: closed && !correct,
                rank: scoring::rank_for(stats.points),
                stats,
            });
        }

        Err(RiddlerError::Conflict(
            "Concurrent submissions for this riddle".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::db::schemas::{DailyChallengeDoc, RoomDoc, RoomPlayer};
    use crate::db::{MemoryStore, RiddleCounter};
    use crate::engine::generator::Generator;
    use crate::engine::text::content_hash;
    use riddler_agent::{MockBackend, MockTranslator};

    async fn setup(difficulty: Difficulty) -> (Arc<MemoryStore>, Delivery, String, String) {
        let store = Arc::new(MemoryStore::new());
        let riddle = RiddleDoc::new(
            "I have a face and two hands".into(),
            "shadow".into(),
            content_hash("I have a face and two hands", "shadow"),
            "general".into(),
            difficulty,
            "en".into(),
            "generated",
        );
        let riddle_id = riddle.id.clone();
        store.insert_riddle(riddle).await.unwrap();

        let user = UserDoc::new("ada".into(), "ada@x.io".into(), "h".into(), "en".into());
        let user_id = user.id.clone();
        store.insert_user(user).await.unwrap();

        let generator = Generator::new(store.clone(), Arc::new(MockBackend::new("mock")));
        let freshness =
            FreshnessEngine::new(store.clone(), generator, Arc::new(MockTranslator::new()));
        let delivery = Delivery::new(store.clone(), freshness, false);
        (store, delivery, user_id, riddle_id)
    }

    #[tokio::test]
    async fn test_first_try_bonus() {
        let (_, delivery, user_id, riddle_id) = setup(Difficulty::Medium).await;

        let verdict = delivery.submit(&user_id, &riddle_id, "a shadow").await.unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.points_change, 20);
        assert_eq!(verdict.attempts_left, 0);
        assert_eq!(verdict.stats.streak, 1);
        assert!(verdict.skip_to_next);
        assert!(!verdict.max_attempts_reached);
        assert!(verdict.answer.is_none());

        // Channel is closed after a correct answer
        let err = delivery.submit(&user_id, &riddle_id, "shadow").await.unwrap_err();
        assert!(matches!(err, RiddlerError::AttemptsExhausted { .. }));
    }

    #[tokio::test]
    async fn test_second_try_and_penalty() {
        let (store, delivery, user_id, riddle_id) = setup(Difficulty::Medium).await;

        let first = delivery.submit(&user_id, &riddle_id, "light").await.unwrap();
        assert!(!first.correct);
        assert_eq!(first.points_change, 0);
        assert_eq!(first.attempts_left, 1);
        assert!(first.answer.is_none());

        let second = delivery.submit(&user_id, &riddle_id, "dark").await.unwrap();
        assert_eq!(second.points_change, -5);
        assert!(second.max_attempts_reached);
        assert_eq!(second.answer.as_deref(), Some("shadow"));

        let user = store.user_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.points, -5);
        assert_eq!(user.solved, 2);
        assert_eq!(user.correct, 0);
    }

    #[tokio::test]
    async fn test_unknown_riddle() {
        let (_, delivery, user_id, _) = setup(Difficulty::Easy).await;
        let err = delivery.submit(&user_id, "missing", "x").await.unwrap_err();
        assert!(matches!(err, RiddlerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deliver_opens_channel() {
        let (store, delivery, user_id, riddle_id) = setup(Difficulty::Hard).await;
        let user = store.user_by_id(&user_id).await.unwrap().unwrap();

        let view = delivery.deliver(&user, "en", None).await.unwrap();
        assert_eq!(view.id, riddle_id);
        assert_eq!(view.attempts_left, 2);

        let user = store.user_by_id(&user_id).await.unwrap().unwrap();
        assert!(user.has_seen(&riddle_id));
        assert_eq!(user.current_riddle_attempts.get(&riddle_id), Some(&0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_misses_are_each_scored_once() {
        let (store, delivery, user_id, riddle_id) = setup(Difficulty::Medium).await;

        let a = tokio::spawn({
            let (delivery, user_id, riddle_id) =
                (delivery.clone(), user_id.clone(), riddle_id.clone());
            async move { delivery.submit(&user_id, &riddle_id, "light").await }
        });
        let b = tokio::spawn({
            let (delivery, user_id, riddle_id) =
                (delivery.clone(), user_id.clone(), riddle_id.clone());
            async move { delivery.submit(&user_id, &riddle_id, "dark").await }
        });
        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        let mut left = [a.attempts_left, b.attempts_left];
        left.sort();
        assert_eq!(left, [0, 1]);
        assert_eq!(a.points_change + b.points_change, -5);

        let user = store.user_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.attempts_on(&riddle_id), 2);
        assert_eq!(user.solved, 2);
        assert_eq!(user.points, -5);

        let err = delivery.submit(&user_id, &riddle_id, "shadow").await.unwrap_err();
        assert!(matches!(err, RiddlerError::AttemptsExhausted { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_correct_answers_score_once() {
        let (store, delivery, user_id, riddle_id) = setup(Difficulty::Medium).await;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let (delivery, user_id, riddle_id) =
                    (delivery.clone(), user_id.clone(), riddle_id.clone());
                tokio::spawn(async move { delivery.submit(&user_id, &riddle_id, "shadow").await })
            })
            .collect();

        let mut scored = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(verdict) => {
                    assert!(verdict.correct);
                    scored += 1;
                }
                Err(e) => assert!(matches!(e, RiddlerError::AttemptsExhausted { .. })),
            }
        }
        assert_eq!(scored, 1);

        let user = store.user_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.points, 20);
        assert_eq!(user.correct, 1);
        assert_eq!(user.attempts_on(&riddle_id), 2);
    }

    /// Delegates to a [`MemoryStore`] but reports the first `lost_races`
    /// attempt updates as lost to a concurrent writer
    struct ContendedStore {
        inner: MemoryStore,
        lost_races: usize,
        apply_calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentStore for ContendedStore {
        async fn insert_riddle(&self, riddle: RiddleDoc) -> Result<bool> {
            self.inner.insert_riddle(riddle).await
        }
        async fn riddle_by_id(&self, id: &str) -> Result<Option<RiddleDoc>> {
            self.inner.riddle_by_id(id).await
        }
        async fn riddle_by_hash(&self, hash: &str) -> Result<Option<RiddleDoc>> {
            self.inner.riddle_by_hash(hash).await
        }
        async fn unseen_riddles(
            &self,
            language: &str,
            category: Option<&str>,
            seen: &[String],
        ) -> Result<Vec<RiddleDoc>> {
            self.inner.unseen_riddles(language, category, seen).await
        }
        async fn riddles_in_language(&self, language: &str) -> Result<Vec<RiddleDoc>> {
            self.inner.riddles_in_language(language).await
        }
        async fn recent_answers(&self, language: &str, limit: usize) -> Result<Vec<String>> {
            self.inner.recent_answers(language, limit).await
        }
        async fn answer_or_hash_exists(
            &self,
            language: &str,
            answer: &str,
            hash: &str,
        ) -> Result<bool> {
            self.inner.answer_or_hash_exists(language, answer, hash).await
        }
        async fn count_riddles(
            &self,
            language: Option<&str>,
            category: Option<&str>,
        ) -> Result<u64> {
            self.inner.count_riddles(language, category).await
        }
        async fn riddle_counts_by_language(&self) -> Result<Vec<(String, u64)>> {
            self.inner.riddle_counts_by_language().await
        }
        async fn count_distinct_answers(&self, language: &str) -> Result<u64> {
            self.inner.count_distinct_answers(language).await
        }
        async fn bump_riddle_counter(
            &self,
            id: &str,
            counter: RiddleCounter,
        ) -> Result<Option<RiddleDoc>> {
            self.inner.bump_riddle_counter(id, counter).await
        }
        async fn backfill_content_hashes(&self) -> Result<u64> {
            self.inner.backfill_content_hashes().await
        }
        async fn insert_user(&self, user: UserDoc) -> Result<bool> {
            self.inner.insert_user(user).await
        }
        async fn user_by_id(&self, id: &str) -> Result<Option<UserDoc>> {
            self.inner.user_by_id(id).await
        }
        async fn user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
            self.inner.user_by_email(email).await
        }
        async fn mark_delivered(&self, user_id: &str, riddle_id: &str) -> Result<()> {
            self.inner.mark_delivered(user_id, riddle_id).await
        }
        async fn clear_seen(&self, user_id: &str) -> Result<()> {
            self.inner.clear_seen(user_id).await
        }
        async fn reset_history(&self, user_id: &str) -> Result<()> {
            self.inner.reset_history(user_id).await
        }
        async fn apply_attempt(&self, user_id: &str, outcome: &AttemptOutcome) -> Result<bool> {
            let call = self.apply_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.lost_races {
                return Ok(false);
            }
            self.inner.apply_attempt(user_id, outcome).await
        }
        async fn complete_daily(
            &self,
            user_id: &str,
            date: &str,
            bonus: i64,
            at: DateTime<Utc>,
        ) -> Result<bool> {
            self.inner.complete_daily(user_id, date, bonus, at).await
        }
        async fn record_daily_miss(
            &self,
            user_id: &str,
            date: &str,
            at: DateTime<Utc>,
        ) -> Result<bool> {
            self.inner.record_daily_miss(user_id, date, at).await
        }
        async fn top_users(&self, limit: usize) -> Result<Vec<UserDoc>> {
            self.inner.top_users(limit).await
        }
        async fn count_users_above(&self, points: i64) -> Result<u64> {
            self.inner.count_users_above(points).await
        }
        async fn count_users(&self) -> Result<u64> {
            self.inner.count_users().await
        }
        async fn challenge_for(&self, date: &str) -> Result<Option<DailyChallengeDoc>> {
            self.inner.challenge_for(date).await
        }
        async fn insert_challenge(&self, challenge: DailyChallengeDoc) -> Result<bool> {
            self.inner.insert_challenge(challenge).await
        }
        async fn add_participant(&self, date: &str, username: &str) -> Result<()> {
            self.inner.add_participant(date, username).await
        }
        async fn insert_room(&self, room: RoomDoc) -> Result<()> {
            self.inner.insert_room(room).await
        }
        async fn room_by_id(&self, id: &str) -> Result<Option<RoomDoc>> {
            self.inner.room_by_id(id).await
        }
        async fn join_room(&self, room_id: &str, player: RoomPlayer) -> Result<bool> {
            self.inner.join_room(room_id, player).await
        }
        async fn open_rooms(&self, limit: usize) -> Result<Vec<RoomDoc>> {
            self.inner.open_rooms(limit).await
        }
        async fn count_open_rooms(&self) -> Result<u64> {
            self.inner.count_open_rooms().await
        }
    }

    async fn contended(lost_races: usize) -> (Arc<ContendedStore>, Delivery, String, String) {
        let store = Arc::new(ContendedStore {
            inner: MemoryStore::new(),
            lost_races,
            apply_calls: AtomicUsize::new(0),
        });
        let riddle = RiddleDoc::new(
            "I follow you all day".into(),
            "shadow".into(),
            content_hash("I follow you all day", "shadow"),
            "general".into(),
            Difficulty::Medium,
            "en".into(),
            "generated",
        );
        let riddle_id = riddle.id.clone();
        store.insert_riddle(riddle).await.unwrap();
        let user = UserDoc::new("ada".into(), "ada@x.io".into(), "h".into(), "en".into());
        let user_id = user.id.clone();
        store.insert_user(user).await.unwrap();

        let generator = Generator::new(store.clone(), Arc::new(MockBackend::new("mock")));
        let freshness =
            FreshnessEngine::new(store.clone(), generator, Arc::new(MockTranslator::new()));
        let delivery = Delivery::new(store.clone(), freshness, false);
        (store, delivery, user_id, riddle_id)
    }

    #[tokio::test]
    async fn test_lost_race_is_retried() {
        let (store, delivery, user_id, riddle_id) = contended(MAX_SUBMIT_RETRIES - 1).await;

        let verdict = delivery.submit(&user_id, &riddle_id, "shadow").await.unwrap();
        assert!(verdict.correct);
        assert_eq!(store.apply_calls.load(Ordering::SeqCst), MAX_SUBMIT_RETRIES);

        let user = store.user_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.points, 20);
        assert_eq!(user.solved, 1);
    }

    #[tokio::test]
    async fn test_persistent_contention_is_a_conflict() {
        let (store, delivery, user_id, riddle_id) = contended(usize::MAX).await;

        let err = delivery.submit(&user_id, &riddle_id, "shadow").await.unwrap_err();
        assert!(matches!(err, RiddlerError::Conflict(_)));
        assert_eq!(store.apply_calls.load(Ordering::SeqCst), MAX_SUBMIT_RETRIES);

        let user = store.user_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.points, 0);
        assert_eq!(user.solved, 0);
        assert_eq!(user.attempts_on(&riddle_id), 0);
    }
}
