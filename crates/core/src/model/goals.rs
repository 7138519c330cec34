use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::summary::SessionSummary;
use crate::time::Clock;

pub const ACCURACY_GOAL_PCT: u64 = 80;
pub const SPEED_GOAL_MS: u64 = 3_000;
pub const WEEKLY_SESSIONS_GOAL: u64 = 7;
pub const STREAK_GOAL: u64 = 10;

pub const PERFECT_DAY_PCT: u64 = 90;
pub const DAILY_PROBLEMS: u64 = 20;
pub const HOT_STREAK: u64 = 5;

/// Sessions counted by the weekly goal started within this many days of now.
pub const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalCategory {
    Accuracy,
    Speed,
    Sessions,
    Streak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One standing goal and how far today's (or this week's) play got towards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: GoalCategory,
    pub target: u64,
    pub current: u64,
    pub completed: bool,
}

/// A challenge that resets every calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeProgress {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub target: u64,
    pub current: u64,
    pub completed: bool,
}

/// Goal and daily-challenge progress derived from stored history.
///
/// "Today" is the UTC calendar day of the clock's now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsReport {
    pub day: NaiveDate,
    pub goals: Vec<GoalProgress>,
    pub challenges: Vec<ChallengeProgress>,
}

/// Best and summed figures over one window of sessions.
#[derive(Debug, Default)]
struct WindowTotals {
    sessions: u64,
    best_accuracy: Option<u64>,
    best_avg_time_ms: Option<u64>,
    best_streak: Option<u64>,
    attempted: u64,
}

impl WindowTotals {
    fn collect<'a>(summaries: impl Iterator<Item = &'a SessionSummary>) -> Self {
        let mut window = Self::default();
        for summary in summaries {
            let totals = summary.totals();
            window.sessions += 1;
            window.attempted += u64::from(totals.attempted);
            let accuracy = Some(u64::from(totals.accuracy_pct));
            window.best_accuracy = window.best_accuracy.max(accuracy);
            window.best_streak = window.best_streak.max(Some(u64::from(totals.max_streak)));
            // A session without answers has no speed to speak of.
            if totals.attempted > 0 {
                let avg = totals.avg_time_ms;
                window.best_avg_time_ms =
                    Some(window.best_avg_time_ms.map_or(avg, |best| best.min(avg)));
            }
        }
        window
    }
}

fn at_least(best: Option<u64>, target: u64) -> (u64, bool) {
    (best.unwrap_or(0), best.is_some_and(|value| value >= target))
}

fn at_most(best: Option<u64>, target: u64) -> (u64, bool) {
    (best.unwrap_or(0), best.is_some_and(|value| value <= target))
}

impl GoalsReport {
    #[must_use]
    pub fn evaluate(summaries: &[SessionSummary], clock: &Clock) -> Self {
        Self::at(summaries, clock.now())
    }

    #[must_use]
    pub fn at(summaries: &[SessionSummary], now: DateTime<Utc>) -> Self {
        let day = now.date_naive();
        let week_start = now - Duration::days(WEEK_DAYS);

        let today = WindowTotals::collect(
            summaries
                .iter()
                .filter(|s| s.started_at().date_naive() == day),
        );
        let week = WindowTotals::collect(
            summaries
                .iter()
                .filter(|s| s.started_at() >= week_start),
        );

        let goal = |id, title, description, category, target, progress: (u64, bool)| {
            GoalProgress {
                id,
                title,
                description,
                category,
                target,
                current: progress.0,
                completed: progress.1,
            }
        };
        let goals = vec![
            goal(
                "accuracy-80",
                "Accuracy Master",
                "Reach 80% accuracy in a session today",
                GoalCategory::Accuracy,
                ACCURACY_GOAL_PCT,
                at_least(today.best_accuracy, ACCURACY_GOAL_PCT),
            ),
            goal(
                "speed-3s",
                "Speed Demon",
                "Average 3 seconds or less per problem in a session today",
                GoalCategory::Speed,
                SPEED_GOAL_MS,
                at_most(today.best_avg_time_ms, SPEED_GOAL_MS),
            ),
            goal(
                "sessions-7",
                "Weekly Warrior",
                "Complete 7 sessions in the last 7 days",
                GoalCategory::Sessions,
                WEEKLY_SESSIONS_GOAL,
                (week.sessions, week.sessions >= WEEKLY_SESSIONS_GOAL),
            ),
            goal(
                "streak-10",
                "Streak Master",
                "Get 10 correct answers in a row today",
                GoalCategory::Streak,
                STREAK_GOAL,
                at_least(today.best_streak, STREAK_GOAL),
            ),
        ];

        let challenge = |id, title, description, difficulty, target, progress: (u64, bool)| {
            ChallengeProgress {
                id,
                title,
                description,
                difficulty,
                target,
                current: progress.0,
                completed: progress.1,
            }
        };
        let challenges = vec![
            challenge(
                "daily-accuracy",
                "Perfect Day",
                "Reach 90% accuracy in one session",
                Difficulty::Medium,
                PERFECT_DAY_PCT,
                at_least(today.best_accuracy, PERFECT_DAY_PCT),
            ),
            challenge(
                "daily-speed",
                "Lightning Fast",
                "Answer 20 problems today",
                Difficulty::Hard,
                DAILY_PROBLEMS,
                (today.attempted, today.attempted >= DAILY_PROBLEMS),
            ),
            challenge(
                "daily-streak",
                "Hot Streak",
                "Get 5 correct answers in a row",
                Difficulty::Easy,
                HOT_STREAK,
                at_least(today.best_streak, HOT_STREAK),
            ),
        ];

        Self {
            day,
            goals,
            challenges,
        }
    }

    #[must_use]
    pub fn goal(&self, id: &str) -> Option<&GoalProgress> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    #[must_use]
    pub fn challenge(&self, id: &str) -> Option<&ChallengeProgress> {
        self.challenges.iter().find(|challenge| challenge.id == id)
    }
}
