//! API models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod achievement;
pub mod content;
pub mod progress;
pub mod user;

pub use achievement::Achievement;
pub use content::{
    BadgeDefinition, Course, DAILY_CHALLENGES_COURSE, DailyChallenge, Lesson, LessonSummary,
};
pub use progress::{ChallengeCompletion, LessonCompletion, Progress, ProgressSnapshot};
pub use user::{Role, UpdateProfile, User, UserView};

/// Request for account signup
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default = "default_language")]
    pub preferred_language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// Request for user login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session token plus the signed-in user
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

/// Wrapper used by the profile endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: UserView,
}

/// Query for manual coin grants
#[derive(Debug, Deserialize)]
pub struct AddCoinsQuery {
    pub amount: i64,
}

/// Response for manual coin grants
#[derive(Debug, Serialize, Deserialize)]
pub struct CoinsResponse {
    pub message: String,
    pub total_coins: i64,
}

/// Query for lesson completion
#[derive(Debug, Deserialize)]
pub struct CompleteLessonQuery {
    pub coins_earned: Option<i64>,
}

/// Query for the leaderboard
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// One leaderboard row. `rank` is positional within the returned page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub display_name: String,
    pub avatar: String,
    pub scratchy_coins: i64,
}
