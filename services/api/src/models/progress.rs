//! Progress model and the streak state machine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate progress record, one per user
///
/// `version` is the optimistic concurrency token: zero means the record has
/// not been stored yet, otherwise it is the version read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub user_id: Uuid,
    pub total_lessons_completed: i64,
    pub total_courses_completed: i64,
    pub total_challenges_completed: i64,
    pub total_time_spent_seconds: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_activity_date: Option<DateTime<Utc>>,
    /// Challenge days already completed, as `YYYY-MM-DD`. Never holds duplicates.
    pub daily_challenges_completed: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl Progress {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            total_lessons_completed: 0,
            total_courses_completed: 0,
            total_challenges_completed: 0,
            total_time_spent_seconds: 0,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            daily_challenges_completed: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Count a lesson completion and advance the streak
    ///
    /// A completion the day after the last activity extends the streak, a
    /// longer gap restarts it at one, and further completions on the same
    /// day leave it as it is.
    pub fn record_lesson(&mut self, now: DateTime<Utc>) {
        self.total_lessons_completed += 1;

        let today = now.date_naive();
        match self.last_activity_date.map(|last| last.date_naive()) {
            None => self.current_streak = 1,
            Some(last) => {
                let gap = (today - last).num_days();
                if gap == 1 {
                    self.current_streak += 1;
                } else if gap > 1 {
                    self.current_streak = 1;
                }
            }
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_activity_date = Some(now);
        self.updated_at = now;
    }

    pub fn has_completed_challenge(&self, date_key: &str) -> bool {
        self.daily_challenges_completed
            .iter()
            .any(|completed| completed == date_key)
    }

    /// Mark the challenge of `date_key` as done; false if it already was
    pub fn record_challenge(&mut self, date_key: &str, now: DateTime<Utc>) -> bool {
        if self.has_completed_challenge(date_key) {
            return false;
        }

        self.daily_challenges_completed.push(date_key.to_string());
        self.total_challenges_completed += 1;
        self.updated_at = now;
        true
    }
}

/// Key under which a calendar day's challenge completion is stored
pub fn challenge_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Read-only aggregate returned by the progress endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub total_lessons_completed: i64,
    pub total_courses_completed: i64,
    pub total_challenges_completed: i64,
    pub total_time_spent_seconds: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
}

impl From<&Progress> for ProgressSnapshot {
    fn from(progress: &Progress) -> Self {
        Self {
            total_lessons_completed: progress.total_lessons_completed,
            total_courses_completed: progress.total_courses_completed,
            total_challenges_completed: progress.total_challenges_completed,
            total_time_spent_seconds: progress.total_time_spent_seconds,
            current_streak: progress.current_streak,
            longest_streak: progress.longest_streak,
        }
    }
}

/// Result of completing a lesson
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LessonCompletion {
    pub message: String,
    pub coins_earned: i64,
    pub total_coins: i64,
    pub current_streak: i64,
    pub new_badges: Vec<String>,
}

/// Result of completing the daily challenge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeCompletion {
    pub message: String,
    pub coins_earned: i64,
    pub total_coins: i64,
    pub new_badges: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn first_lesson_starts_streak() {
        let mut progress = Progress::new(Uuid::new_v4(), day(0));
        progress.record_lesson(day(0));

        assert_eq!(progress.total_lessons_completed, 1);
        assert_eq!(progress.current_streak, 1);
        assert_eq!(progress.longest_streak, 1);
        assert_eq!(progress.last_activity_date, Some(day(0)));
    }

    #[test]
    fn same_day_lessons_keep_streak() {
        let mut progress = Progress::new(Uuid::new_v4(), day(0));
        progress.record_lesson(day(0));
        progress.record_lesson(day(0) + Duration::hours(5));

        assert_eq!(progress.total_lessons_completed, 2);
        assert_eq!(progress.current_streak, 1);
    }

    #[test]
    fn consecutive_days_extend_and_gap_resets() {
        let mut progress = Progress::new(Uuid::new_v4(), day(0));
        for n in 0..3 {
            progress.record_lesson(day(n));
        }
        assert_eq!(progress.current_streak, 3);
        assert_eq!(progress.longest_streak, 3);

        progress.record_lesson(day(4));
        assert_eq!(progress.current_streak, 1);
        assert_eq!(progress.longest_streak, 3);
    }

    #[test]
    fn streak_follows_calendar_days_not_elapsed_hours() {
        let late = Utc.with_ymd_and_hms(2025, 3, 1, 23, 50, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2025, 3, 2, 0, 10, 0).unwrap();

        let mut progress = Progress::new(Uuid::new_v4(), late);
        progress.record_lesson(late);
        progress.record_lesson(early);

        assert_eq!(progress.current_streak, 2);
    }

    #[test]
    fn challenge_dates_are_recorded_once() {
        let mut progress = Progress::new(Uuid::new_v4(), day(0));
        let key = challenge_date_key(day(0).date_naive());
        assert_eq!(key, "2025-03-01");

        assert!(progress.record_challenge(&key, day(0)));
        assert!(!progress.record_challenge(&key, day(0)));

        assert_eq!(progress.total_challenges_completed, 1);
        assert_eq!(progress.daily_challenges_completed, vec![key]);
    }

    #[test]
    fn snapshot_of_missing_progress_is_zeroed() {
        let snapshot = ProgressSnapshot::default();
        assert_eq!(snapshot.total_lessons_completed, 0);
        assert_eq!(snapshot.current_streak, 0);
        assert_eq!(snapshot.longest_streak, 0);
    }
}
