//! Daily challenge: one riddle per UTC date

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::db::schemas::{DailyChallengeDoc, Difficulty, UserDoc};
use crate::db::ContentStore;
use crate::engine::generator::Generator;
use crate::engine::scoring::DAILY_BONUS;
use crate::engine::text::judge_exact;
use crate::types::{Result, RiddlerError};

/// Category every daily riddle is generated in
const DAILY_CATEGORY: &str = "logic";

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRiddle {
    pub id: String,
    pub question: String,
    pub difficulty: Difficulty,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyView {
    pub challenge_id: String,
    pub date: String,
    pub riddle: DailyRiddle,
    pub participants: usize,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyVerdict {
    pub correct: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

#[derive(Clone)]
pub struct DailyChallenges {
    store: Arc<dyn ContentStore>,
    generator: Generator,
}

impl DailyChallenges {
    pub fn new(store: Arc<dyn ContentStore>, generator: Generator) -> Self {
        Self { store, generator }
    }

    /// The challenge for `date`, generating it on first request
    pub async fn for_date(&self, date: NaiveDate) -> Result<DailyChallengeDoc> {
        let key = date_key(date);
        if let Some(challenge) = self.store.challenge_for(&key).await? {
            return Ok(challenge);
        }

        let riddle = self
            .generator
            .generate(DAILY_CATEGORY)
            .await?
            .ok_or_else(|| RiddlerError::ServiceUnavailable("Daily challenge not available".into()))?;

        let challenge = DailyChallengeDoc::new(key.clone(), riddle);
        if self.store.insert_challenge(challenge.clone()).await? {
            info!(date = %key, riddle_id = %challenge.riddle_id, "Created daily challenge");
            return Ok(challenge);
        }

        // Another request created the date first
        self.store
            .challenge_for(&key)
            .await?
            .ok_or_else(|| RiddlerError::Internal(format!("daily challenge for {} vanished", key)))
    }

    pub async fn view_at(&self, user: &UserDoc, now: DateTime<Utc>) -> Result<DailyView> {
        let challenge = self.for_date(now.date_naive()).await?;
        let completed = user
            .daily_challenges_completed
            .iter()
            .any(|d| *d == challenge.date);

        Ok(DailyView {
            challenge_id: challenge.id,
            date: challenge.date,
            riddle: DailyRiddle {
                id: challenge.riddle.id,
                question: challenge.riddle.question,
                difficulty: challenge.riddle.difficulty,
                category: challenge.riddle.category,
            },
            participants: challenge.participants.len(),
            completed,
        })
    }

    /// Judge a daily answer; exact match only
    pub async fn submit_at(
        &self,
        user: &UserDoc,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<DailyVerdict> {
        let key = date_key(now.date_naive());
        let challenge = self
            .store
            .challenge_for(&key)
            .await?
            .ok_or_else(|| RiddlerError::NotFound("Daily challenge".into()))?;

        // One answer per date: a miss discloses the answer
        if user.has_answered_daily(&key) {
            return Err(RiddlerError::AlreadyCompleted);
        }

        if !judge_exact(answer, &challenge.riddle.answer) {
            if !self.store.record_daily_miss(&user.id, &key, now).await? {
                return Err(RiddlerError::AlreadyCompleted);
            }
            return Ok(DailyVerdict {
                correct: false,
                message: format!("❌ Wrong! Answer: {}", challenge.riddle.answer),
                bonus_points: None,
                answer: Some(challenge.riddle.answer),
            });
        }

        if !self
            .store
            .complete_daily(&user.id, &key, DAILY_BONUS, now)
            .await?
        {
            return Err(RiddlerError::AlreadyCompleted);
        }
        self.store.add_participant(&key, &user.username).await?;
        info!(user_id = %user.id, date = %key, "Daily challenge completed");

        Ok(DailyVerdict {
            correct: true,
            message: format!("🎉 Daily Challenge Complete! +{} points", DAILY_BONUS),
            bonus_points: Some(DAILY_BONUS),
            answer: None,
        })
    }
}
