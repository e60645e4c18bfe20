//! Lets Learn API service
//!
//! Accounts, curriculum content, progress tracking, daily challenges and
//! the coin economy, exposed over HTTP.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validation;

use crate::{
    jwt::JwtService,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::Repositories,
    services::{
        AuthService, BadgeEvaluator, Catalog, DailyChallengeSelector, Leaderboard,
        ProgressTracker, RewardLedger,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub ledger: RewardLedger,
    pub progress: ProgressTracker,
    pub challenges: DailyChallengeSelector,
    pub leaderboard: Leaderboard,
    pub catalog: Catalog,
    pub badges: BadgeEvaluator,
}

impl AppState {
    /// Wire every service onto the given repositories
    pub fn new(repos: Repositories, jwt_service: JwtService) -> Self {
        let rate_limiter = RateLimiter::new(RateLimiterConfig::default());
        let ledger = RewardLedger::new(repos.users.clone());
        let challenges = DailyChallengeSelector::new(repos.content.clone());
        let badges = BadgeEvaluator::new(repos.content.clone(), repos.achievements.clone());

        Self {
            auth: AuthService::new(repos.users.clone(), jwt_service, rate_limiter),
            progress: ProgressTracker::new(
                repos.progress.clone(),
                ledger.clone(),
                challenges.clone(),
                badges.clone(),
            ),
            leaderboard: Leaderboard::new(repos.users),
            catalog: Catalog::new(repos.content),
            ledger,
            challenges,
            badges,
        }
    }
}
