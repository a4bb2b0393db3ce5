//! Points, streaks and the rank ladder

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::schemas::Difficulty;
use crate::db::StreakChange;

/// Guesses allowed per delivered riddle
pub const MAX_ATTEMPTS: i32 = 2;

/// Extra points for a correct first guess
pub const FIRST_TRY_BONUS: i64 = 5;

/// Points lost when the second guess is also wrong
pub const FINAL_MISS_PENALTY: i64 = 5;

/// Flat reward for completing the daily challenge
pub const DAILY_BONUS: i64 = 50;

pub fn difficulty_points(difficulty: Difficulty) -> i64 {
    match difficulty {
        Difficulty::Easy | Difficulty::Unrated => 10,
        Difficulty::Medium => 15,
        Difficulty::Hard => 20,
    }
}

/// Points for a correct answer on the given attempt (1-based)
pub fn correct_points(difficulty: Difficulty, attempt: i32) -> i64 {
    let bonus = if attempt == 1 { FIRST_TRY_BONUS } else { 0 };
    difficulty_points(difficulty) + bonus
}

/// Streak movement for a correct answer at `now`, by UTC calendar day
pub fn streak_change(last_active: Option<DateTime<Utc>>, now: DateTime<Utc>) -> StreakChange {
    let Some(last) = last_active else {
        return StreakChange::Reset;
    };

    match (now.date_naive() - last.date_naive()).num_days() {
        1 => StreakChange::Increment,
        days if days > 1 => StreakChange::Reset,
        _ => StreakChange::Keep,
    }
}

/// Percentage of judged submissions that were correct, one decimal
pub fn accuracy(correct: i64, solved: i64) -> f64 {
    if solved <= 0 {
        return 0.0;
    }
    round1(correct as f64 / solved as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One rung of the rank ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub points: i64,
    pub rank: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
}

pub const RANKS: [Rank; 5] = [
    Rank {
        points: 0,
        rank: "🥉 Beginner",
        title: "Riddle Newbie",
        icon: "🥉",
    },
    Rank {
        points: 500,
        rank: "🥈 Bronze Master",
        title: "Bronze Solver",
        icon: "🥈",
    },
    Rank {
        points: 1000,
        rank: "🥇 Silver Expert",
        title: "Silver Genius",
        icon: "🥇",
    },
    Rank {
        points: 1500,
        rank: "💎 Gold Champion",
        title: "Gold Mastermind",
        icon: "💎",
    },
    Rank {
        points: 2000,
        rank: "👑 Platinum Legend",
        title: "Platinum Wizard",
        icon: "👑",
    },
];

/// Highest rank reached; the first rung for zero or negative points
pub fn rank_for(points: i64) -> Rank {
    RANKS
        .iter()
        .rev()
        .find(|r| points >= r.points)
        .copied()
        .unwrap_or(RANKS[0])
}

#[derive(Debug, Clone, Serialize)]
pub struct Achievements {
    pub current_rank: Rank,
    pub next_rank: Option<Rank>,
    pub points_to_next: i64,
    pub unlocked_achievements: Vec<Rank>,
    pub total_achievements: usize,
    pub progress_percent: f64,
}

pub fn achievements(points: i64) -> Achievements {
    let next_rank = RANKS.iter().find(|r| points < r.points).copied();
    let unlocked: Vec<Rank> = RANKS.iter().filter(|r| points >= r.points).copied().collect();
    let progress = round1(unlocked.len() as f64 / RANKS.len() as f64 * 100.0);

    Achievements {
        current_rank: rank_for(points),
        points_to_next: next_rank.map_or(0, |r| r.points - points),
        next_rank,
        unlocked_achievements: unlocked,
        total_achievements: RANKS.len(),
        progress_percent: progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_points_by_attempt() {
        assert_eq!(correct_points(Difficulty::Medium, 1), 20);
        assert_eq!(correct_points(Difficulty::Medium, 2), 15);
        assert_eq!(correct_points(Difficulty::Unrated, 1), 15);
        assert_eq!(correct_points(Difficulty::Hard, 2), 20);
    }

    #[test]
    fn test_streak_by_calendar_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 30, 0).unwrap();

        assert_eq!(streak_change(None, now), StreakChange::Reset);
        // 23:50 yesterday is still "yesterday"
        let late_yesterday = now - Duration::minutes(40);
        assert_eq!(streak_change(Some(late_yesterday), now), StreakChange::Increment);
        assert_eq!(streak_change(Some(now), now), StreakChange::Keep);
        assert_eq!(
            streak_change(Some(now - Duration::days(3)), now),
            StreakChange::Reset
        );
    }

    #[test]
    fn test_rank_ladder() {
        assert_eq!(rank_for(-20).title, "Riddle Newbie");
        assert_eq!(rank_for(999).rank, "🥈 Bronze Master");
        assert_eq!(rank_for(5000).icon, "👑");

        let report = achievements(1200);
        assert_eq!(report.current_rank.points, 1000);
        assert_eq!(report.next_rank.map(|r| r.points), Some(1500));
        assert_eq!(report.points_to_next, 300);
        assert_eq!(report.unlocked_achievements.len(), 3);
        assert_eq!(report.progress_percent, 60.0);

        let top = achievements(2500);
        assert!(top.next_rank.is_none());
        assert_eq!(top.points_to_next, 0);
    }

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(2, 3), 66.7);
        assert_eq!(accuracy(1, 1), 100.0);
    }
}
