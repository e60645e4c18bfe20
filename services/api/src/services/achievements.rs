//! Badge evaluation and earned achievements

use chrono::{DateTime, Utc};
use common::error::DatabaseError;
use std::{collections::HashSet, sync::Arc};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{Achievement, BadgeDefinition, Progress},
    repositories::{AchievementRepository, ContentRepository},
};

/// Metrics a badge requirement can be checked against
#[derive(Debug, Clone, Copy)]
pub struct Standing {
    pub lessons_completed: i64,
    pub challenges_completed: i64,
    pub current_streak: i64,
    pub total_coins: i64,
}

impl Standing {
    pub fn new(progress: &Progress, total_coins: i64) -> Self {
        Self {
            lessons_completed: progress.total_lessons_completed,
            challenges_completed: progress.total_challenges_completed,
            current_streak: progress.current_streak,
            total_coins,
        }
    }

    /// Whether `badge` is earned. Requirement types without a tracked metric never are.
    fn meets(&self, badge: &BadgeDefinition) -> bool {
        let value = match badge.requirement_type.as_str() {
            "lessons_completed" => self.lessons_completed,
            "challenges_completed" => self.challenges_completed,
            "streak_days" => self.current_streak,
            "total_coins" => self.total_coins,
            _ => return false,
        };
        value >= badge.requirement_value
    }
}

/// Grants badges whose thresholds have been reached
#[derive(Clone)]
pub struct BadgeEvaluator {
    content: Arc<dyn ContentRepository>,
    achievements: Arc<dyn AchievementRepository>,
}

impl BadgeEvaluator {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        achievements: Arc<dyn AchievementRepository>,
    ) -> Self {
        Self {
            content,
            achievements,
        }
    }

    /// Record every newly met badge and return their ids
    pub async fn evaluate(
        &self,
        user_id: Uuid,
        standing: Standing,
        context: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<Vec<String>> {
        let earned: HashSet<String> = self
            .achievements
            .achievements_for_user(user_id)
            .await?
            .into_iter()
            .map(|achievement| achievement.achievement_id)
            .collect();

        let mut new_badges = Vec::new();
        for badge in self.content.list_badges().await? {
            if earned.contains(&badge.achievement_id) || !standing.meets(&badge) {
                continue;
            }

            let achievement =
                Achievement::new(user_id, &badge.achievement_id, Some(context.to_string()), now);
            match self.achievements.record_achievement(&achievement).await {
                Ok(()) => {
                    info!(user_id = %user_id, badge = %badge.achievement_id, "Badge earned");
                    new_badges.push(badge.achievement_id);
                }
                // A concurrent request recorded it first
                Err(DatabaseError::Conflict(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(new_badges)
    }

    /// Achievements of a user, newest first
    pub async fn list_earned(&self, user_id: Uuid) -> ApiResult<Vec<Achievement>> {
        Ok(self.achievements.achievements_for_user(user_id).await?)
    }
}
