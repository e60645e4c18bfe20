//! Operations behind the HTTP handlers
//!
//! Every operation takes the current instant explicitly so streaks and
//! challenge days can be exercised across dates in tests.

pub mod achievements;
pub mod auth;
pub mod challenges;
pub mod content;
pub mod leaderboard;
pub mod progress;
pub mod rewards;

pub use achievements::BadgeEvaluator;
pub use auth::{AuthService, Session};
pub use challenges::DailyChallengeSelector;
pub use content::Catalog;
pub use leaderboard::Leaderboard;
pub use progress::ProgressTracker;
pub use rewards::RewardLedger;
