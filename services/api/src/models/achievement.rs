//! Earned achievement records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A badge earned by a user. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: String,
    pub earned_at: DateTime<Utc>,
    /// What the user was doing when the badge was earned
    pub context: Option<String>,
}

impl Achievement {
    pub fn new(
        user_id: Uuid,
        achievement_id: impl Into<String>,
        context: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            achievement_id: achievement_id.into(),
            earned_at: now,
            context,
        }
    }
}
