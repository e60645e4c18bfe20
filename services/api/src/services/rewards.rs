//! Coin balance mutations

use chrono::{DateTime, Utc};
use common::error::DatabaseError;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    repositories::UserRepository,
};

/// Adds coins to user balances
///
/// Only the running balance is stored. Each award is one atomic increment
/// in the store, so concurrent awards never overwrite each other.
#[derive(Clone)]
pub struct RewardLedger {
    users: Arc<dyn UserRepository>,
}

impl RewardLedger {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Add `amount` coins and return the new balance
    pub async fn award(&self, user_id: Uuid, amount: i64, now: DateTime<Utc>) -> ApiResult<i64> {
        if amount <= 0 {
            return Err(ApiError::InvalidArgument(
                "Amount must be positive".to_string(),
            ));
        }

        let balance = self
            .users
            .add_coins(user_id, amount, now)
            .await
            .map_err(|e| match e {
                DatabaseError::OutOfRange(_) => {
                    ApiError::InvalidArgument("Amount is too large".to_string())
                }
                other => other.into(),
            })?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = %user_id, amount, balance, "Awarded coins");
        Ok(balance)
    }

    /// Current stored balance
    pub async fn balance(&self, user_id: Uuid) -> ApiResult<i64> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .map(|user| user.scratchy_coins)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}
