//! Lesson and daily challenge completion

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    BadgeEvaluator, DailyChallengeSelector, RewardLedger, achievements::Standing,
};
use crate::{
    error::{ApiError, ApiResult},
    models::{
        ChallengeCompletion, LessonCompletion, Progress, ProgressSnapshot, User,
        progress::challenge_date_key,
    },
    repositories::ProgressRepository,
};

/// Coins granted for a lesson when the caller does not say otherwise
pub const DEFAULT_LESSON_COINS: i64 = 10;

/// Conditional writes attempted before giving up on a contended record
pub const MAX_SAVE_ATTEMPTS: usize = 5;

/// Per-user progress state machine
///
/// Records are read, changed and written back with a version check. A lost
/// race reloads the record and applies the change again.
#[derive(Clone)]
pub struct ProgressTracker {
    progress: Arc<dyn ProgressRepository>,
    ledger: RewardLedger,
    selector: DailyChallengeSelector,
    badges: BadgeEvaluator,
}

impl ProgressTracker {
    pub fn new(
        progress: Arc<dyn ProgressRepository>,
        ledger: RewardLedger,
        selector: DailyChallengeSelector,
        badges: BadgeEvaluator,
    ) -> Self {
        Self {
            progress,
            ledger,
            selector,
            badges,
        }
    }

    /// Aggregate counters; zeroed when the user has no record yet
    pub async fn get_progress(&self, user_id: Uuid) -> ApiResult<ProgressSnapshot> {
        Ok(self
            .progress
            .find_progress(user_id)
            .await?
            .map(|progress| ProgressSnapshot::from(&progress))
            .unwrap_or_default())
    }

    /// Award the lesson coins, then count the lesson and advance the streak
    pub async fn complete_lesson(
        &self,
        user: &User,
        lesson_id: &str,
        coins_earned: Option<i64>,
        now: DateTime<Utc>,
    ) -> ApiResult<LessonCompletion> {
        let coins_earned = coins_earned.unwrap_or(DEFAULT_LESSON_COINS);
        let total_coins = self.ledger.award(user.id, coins_earned, now).await?;

        let progress = self
            .update(user.id, now, |progress| {
                progress.record_lesson(now);
                Ok(())
            })
            .await?;

        info!(
            username = %user.username,
            lesson_id,
            current_streak = progress.current_streak,
            "Lesson completed"
        );

        let new_badges = self
            .badges
            .evaluate(user.id, Standing::new(&progress, total_coins), lesson_id, now)
            .await?;

        Ok(LessonCompletion {
            message: "Lesson completed!".to_string(),
            coins_earned,
            total_coins,
            current_streak: progress.current_streak,
            new_badges,
        })
    }

    /// Complete today's challenge at most once per calendar day
    ///
    /// The day is written to the progress record before any coins move, so
    /// a concurrent duplicate sees it on retry and is rejected.
    pub async fn complete_daily_challenge(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> ApiResult<ChallengeCompletion> {
        let today = now.date_naive();
        let challenge = self.selector.select(today).await?;
        let date_key = challenge_date_key(today);

        let progress = self
            .update(user.id, now, |progress| {
                if progress.record_challenge(&date_key, now) {
                    Ok(())
                } else {
                    Err(ApiError::AlreadyCompleted)
                }
            })
            .await?;

        let coins_earned = challenge.coins_reward.max(0);
        let total_coins = if coins_earned > 0 {
            self.ledger.award(user.id, coins_earned, now).await?
        } else {
            self.ledger.balance(user.id).await?
        };

        info!(
            username = %user.username,
            challenge_id = %challenge.lesson_id,
            date = %date_key,
            "Daily challenge completed"
        );

        let new_badges = self
            .badges
            .evaluate(
                user.id,
                Standing::new(&progress, total_coins),
                &challenge.lesson_id,
                now,
            )
            .await?;

        Ok(ChallengeCompletion {
            message: "Challenge completed!".to_string(),
            coins_earned,
            total_coins,
            new_badges,
        })
    }

    /// Load or create the record, apply `change` and write it back conditionally
    async fn update<F>(&self, user_id: Uuid, now: DateTime<Utc>, change: F) -> ApiResult<Progress>
    where
        F: Fn(&mut Progress) -> ApiResult<()>,
    {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let mut progress = self
                .progress
                .find_progress(user_id)
                .await?
                .unwrap_or_else(|| Progress::new(user_id, now));

            change(&mut progress)?;

            if self.progress.save_progress(&progress).await? {
                return Ok(progress);
            }
            warn!(user_id = %user_id, attempt, "Progress write lost a race, retrying");
        }

        Err(ApiError::ConcurrentUpdate)
    }
}
