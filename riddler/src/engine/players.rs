//! Player-facing aggregates: leaderboard, profile, achievements

use std::sync::Arc;

use serde::Serialize;

use crate::db::schemas::UserDoc;
use crate::db::ContentStore;
use crate::engine::scoring::{self, Achievements};
use crate::types::Result;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;
pub const MAX_LEADERBOARD_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub points: i64,
    pub correct: i64,
    pub streak: i64,
    pub accuracy: f64,
    pub rank_title: &'static str,
    pub rank_icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub language: String,
    pub total_solved: i64,
    pub correct_answers: i64,
    pub accuracy: f64,
    pub current_streak: i64,
    pub points: i64,
    /// 1 + players with strictly more points
    pub rank: u64,
    pub unique_riddles_seen: usize,
    pub daily_challenges_completed: usize,
    pub achievement_rank: &'static str,
    pub achievement_title: &'static str,
    pub achievement_icon: &'static str,
}

#[derive(Clone)]
pub struct Players {
    store: Arc<dyn ContentStore>,
}

impl Players {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Top players by points; `limit` is clamped to 1..=100
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
            .clamp(1, MAX_LEADERBOARD_SIZE);

        let users = self.store.top_users(limit).await?;
        Ok(users
            .into_iter()
            .enumerate()
            .map(|(i, user)| {
                let rank = scoring::rank_for(user.points);
                LeaderboardEntry {
                    rank: i + 1,
                    accuracy: scoring::accuracy(user.correct, user.solved),
                    username: user.username,
                    points: user.points,
                    correct: user.correct,
                    streak: user.streak,
                    rank_title: rank.rank,
                    rank_icon: rank.icon,
                }
            })
            .collect())
    }

    pub async fn profile(&self, user: &UserDoc) -> Result<Profile> {
        let above = self.store.count_users_above(user.points).await?;
        let rank = scoring::rank_for(user.points);

        Ok(Profile {
            username: user.username.clone(),
            email: user.email.clone(),
            language: user.language.clone(),
            total_solved: user.solved,
            correct_answers: user.correct,
            accuracy: scoring::accuracy(user.correct, user.solved),
            current_streak: user.streak,
            points: user.points,
            rank: above + 1,
            unique_riddles_seen: user.seen_riddles.len(),
            daily_challenges_completed: user.daily_challenges_completed.len(),
            achievement_rank: rank.rank,
            achievement_title: rank.title,
            achievement_icon: rank.icon,
        })
    }

    pub fn achievements(&self, user: &UserDoc) -> Achievements {
        scoring::achievements(user.points)
    }

    /// Forget every seen riddle and open attempt channel
    pub async fn reset_history(&self, user: &UserDoc) -> Result<()> {
        self.store.reset_history(&user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AttemptOutcome, MemoryStore, StreakChange};
    use chrono::Utc;

    async fn player(store: &MemoryStore, name: &str, points: i64) -> UserDoc {
        let user = UserDoc::new(name.into(), format!("{}@x.io", name), "h".into(), "en".into());
        store.insert_user(user.clone()).await.unwrap();
        if points != 0 {
            let outcome = AttemptOutcome {
                riddle_id: format!("seed-{}", name),
                expected_attempts: 0,
                new_attempts: 2,
                correct: points > 0,
                points_delta: points,
                streak: StreakChange::Keep,
                at: Utc::now(),
            };
            store.apply_attempt(&user.id, &outcome).await.unwrap();
        }
        store.user_by_id(&user.id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_leaderboard_orders_and_keeps_ties() {
        let store = Arc::new(MemoryStore::new());
        player(&store, "ada", 15).await;
        player(&store, "bob", 40).await;
        player(&store, "cy", 15).await;

        let board = Players::new(store).leaderboard(None).await.unwrap();
        let names: Vec<&str> = board.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "ada", "cy"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].accuracy, 100.0);
    }

    #[tokio::test]
    async fn test_profile_rank() {
        let store = Arc::new(MemoryStore::new());
        player(&store, "ada", 600).await;
        player(&store, "bob", 600).await;
        let cy = player(&store, "cy", 20).await;

        let profile = Players::new(store).profile(&cy).await.unwrap();
        assert_eq!(profile.rank, 3);
        assert_eq!(profile.achievement_title, "Riddle Newbie");
        assert_eq!(profile.total_solved, 1);
    }
}
