//! Repositories for database operations
//!
//! Each collection is reached through a trait so the services can run on
//! PostgreSQL in production and on [`memory::MemoryStore`] in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Achievement, BadgeDefinition, Course, Lesson, Progress, User};

pub mod memory;
pub mod postgres;

/// Credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; `DatabaseError::Conflict` if the handle or email is taken
    async fn insert_user(&self, user: &User) -> DatabaseResult<()>;

    async fn find_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Persist display name, avatar, language and `updated_at`
    async fn update_user_profile(&self, user: &User) -> DatabaseResult<()>;

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> DatabaseResult<()>;

    /// Atomically add `amount` coins and return the new balance, `None` if the user is gone
    async fn add_coins(
        &self,
        id: Uuid,
        amount: i64,
        at: DateTime<Utc>,
    ) -> DatabaseResult<Option<i64>>;

    /// Users ordered by descending coin balance
    async fn top_users_by_coins(&self, limit: i64) -> DatabaseResult<Vec<User>>;
}

/// Progress records
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn find_progress(&self, user_id: Uuid) -> DatabaseResult<Option<Progress>>;

    /// Insert (version 0) or conditionally update (matching version) the record.
    ///
    /// Returns false when another writer got there first.
    async fn save_progress(&self, progress: &Progress) -> DatabaseResult<bool>;
}

/// Read-only reference content
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// All lessons ordered by course and position
    async fn list_lessons(&self) -> DatabaseResult<Vec<Lesson>>;

    /// Lessons of one course ordered by their `order` field
    async fn lessons_in_course(&self, course_id: &str) -> DatabaseResult<Vec<Lesson>>;

    async fn find_lesson(&self, lesson_id: &str) -> DatabaseResult<Option<Lesson>>;

    async fn list_courses(&self) -> DatabaseResult<Vec<Course>>;

    async fn list_badges(&self) -> DatabaseResult<Vec<BadgeDefinition>>;
}

/// Earned achievements
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Append an achievement; `DatabaseError::Conflict` if the user already has it
    async fn record_achievement(&self, achievement: &Achievement) -> DatabaseResult<()>;

    /// Achievements of a user, newest first
    async fn achievements_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Achievement>>;
}

/// Handles to every collection
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
}

impl Repositories {
    /// Serve every collection from one store
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + ProgressRepository
            + ContentRepository
            + AchievementRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            progress: store.clone(),
            content: store.clone(),
            achievements: store,
        }
    }
}
