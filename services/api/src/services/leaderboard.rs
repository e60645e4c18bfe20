//! Coin leaderboard

use std::sync::Arc;

use crate::{error::ApiResult, models::LeaderboardEntry, repositories::UserRepository};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Ranks users by coin balance
#[derive(Clone)]
pub struct Leaderboard {
    users: Arc<dyn UserRepository>,
}

impl Leaderboard {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Top users by balance. Ranks are positions within this page only.
    pub async fn top(&self, limit: Option<i64>) -> ApiResult<Vec<LeaderboardEntry>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let users = self.users.top_users_by_coins(limit).await?;

        Ok(users
            .into_iter()
            .enumerate()
            .map(|(position, user)| LeaderboardEntry {
                rank: position + 1,
                user_id: user.id.to_string(),
                display_name: user.display_name,
                avatar: user.avatar,
                scratchy_coins: user.scratchy_coins,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;
    use crate::services::test_support::student;

    async fn board_with(balances: &[i64]) -> Leaderboard {
        let store = Arc::new(MemoryStore::new());
        for (i, coins) in balances.iter().enumerate() {
            store
                .insert_user(&student(&format!("player_{}", i), *coins))
                .await
                .unwrap();
        }
        Leaderboard::new(store)
    }

    #[tokio::test]
    async fn top_orders_by_balance_and_ranks_from_one() {
        let board = board_with(&[50, 10, 30]).await;

        let entries = board.top(Some(2)).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].rank, entries[0].scratchy_coins), (1, 50));
        assert_eq!((entries[1].rank, entries[1].scratchy_coins), (2, 30));
        assert_eq!(entries[0].display_name, "player_0");
    }

    #[tokio::test]
    async fn limit_defaults_and_is_clamped() {
        let balances: Vec<i64> = (0..12).collect();
        let board = board_with(&balances).await;

        assert_eq!(board.top(None).await.unwrap().len(), 10);
        assert_eq!(board.top(Some(0)).await.unwrap().len(), 1);
        assert_eq!(board.top(Some(500)).await.unwrap().len(), 12);
    }
}
