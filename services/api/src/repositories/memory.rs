//! In-memory repositories for tests and local experiments
//!
//! Collections are plain vectors behind async locks, so listing order is
//! insertion order, the way a document store returns unsorted results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AchievementRepository, ContentRepository, ProgressRepository, UserRepository};
use crate::models::{Achievement, BadgeDefinition, Course, Lesson, Progress, User};

/// Store holding every collection in memory
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    progress: RwLock<Vec<Progress>>,
    lessons: RwLock<Vec<Lesson>>,
    courses: RwLock<Vec<Course>>,
    badges: RwLock<Vec<BadgeDefinition>>,
    achievements: RwLock<Vec<Achievement>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_lesson(&self, lesson: Lesson) {
        self.lessons.write().await.push(lesson);
    }

    pub async fn remove_lesson(&self, lesson_id: &str) {
        self.lessons
            .write()
            .await
            .retain(|lesson| lesson.lesson_id != lesson_id);
    }

    pub async fn insert_course(&self, course: Course) {
        self.courses.write().await.push(course);
    }

    pub async fn insert_badge(&self, badge: BadgeDefinition) {
        self.badges.write().await.push(badge);
    }

    /// Number of stored progress records
    pub async fn progress_count(&self) -> usize {
        self.progress.read().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> DatabaseResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::Conflict("username already exists".to_string()));
        }
        if user.email.is_some() && users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("email already exists".to_string()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn update_user_profile(&self, user: &User) -> DatabaseResult<()> {
        let mut users = self.users.write().await;
        if let Some(stored) = users.iter_mut().find(|u| u.id == user.id) {
            stored.display_name = user.display_name.clone();
            stored.avatar = user.avatar.clone();
            stored.preferred_language = user.preferred_language.clone();
            stored.updated_at = user.updated_at;
        }
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> DatabaseResult<()> {
        let mut users = self.users.write().await;
        if let Some(stored) = users.iter_mut().find(|u| u.id == id) {
            stored.last_login = Some(at);
        }
        Ok(())
    }

    async fn add_coins(
        &self,
        id: Uuid,
        amount: i64,
        at: DateTime<Utc>,
    ) -> DatabaseResult<Option<i64>> {
        let mut users = self.users.write().await;
        let Some(stored) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        let balance = stored
            .scratchy_coins
            .checked_add(amount)
            .ok_or_else(|| DatabaseError::OutOfRange("scratchy_coins".to_string()))?;
        stored.scratchy_coins = balance;
        stored.updated_at = at;
        Ok(Some(balance))
    }

    async fn top_users_by_coins(&self, limit: i64) -> DatabaseResult<Vec<User>> {
        let mut users = self.users.read().await.clone();
        // Stable sort keeps insertion order among equal balances
        users.sort_by(|a, b| b.scratchy_coins.cmp(&a.scratchy_coins));
        users.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(users)
    }
}

#[async_trait]
impl ProgressRepository for MemoryStore {
    async fn find_progress(&self, user_id: Uuid) -> DatabaseResult<Option<Progress>> {
        let progress = self.progress.read().await;
        Ok(progress.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn save_progress(&self, progress: &Progress) -> DatabaseResult<bool> {
        let mut records = self.progress.write().await;
        let position = records.iter().position(|p| p.user_id == progress.user_id);

        match position {
            None if progress.version == 0 => {
                let mut stored = progress.clone();
                stored.version = 1;
                records.push(stored);
                Ok(true)
            }
            Some(index) if progress.version != 0 && records[index].version == progress.version => {
                let mut stored = progress.clone();
                stored.version = progress.version + 1;
                records[index] = stored;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn list_lessons(&self) -> DatabaseResult<Vec<Lesson>> {
        let mut lessons = self.lessons.read().await.clone();
        lessons.sort_by(|a, b| (&a.course_id, a.order).cmp(&(&b.course_id, b.order)));
        Ok(lessons)
    }

    async fn lessons_in_course(&self, course_id: &str) -> DatabaseResult<Vec<Lesson>> {
        let mut lessons: Vec<Lesson> = self
            .lessons
            .read()
            .await
            .iter()
            .filter(|lesson| lesson.course_id == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|lesson| lesson.order);
        Ok(lessons)
    }

    async fn find_lesson(&self, lesson_id: &str) -> DatabaseResult<Option<Lesson>> {
        let lessons = self.lessons.read().await;
        Ok(lessons.iter().find(|l| l.lesson_id == lesson_id).cloned())
    }

    async fn list_courses(&self) -> DatabaseResult<Vec<Course>> {
        let mut courses = self.courses.read().await.clone();
        courses.sort_by_key(|course| course.order);
        Ok(courses)
    }

    async fn list_badges(&self) -> DatabaseResult<Vec<BadgeDefinition>> {
        Ok(self.badges.read().await.clone())
    }
}

#[async_trait]
impl AchievementRepository for MemoryStore {
    async fn record_achievement(&self, achievement: &Achievement) -> DatabaseResult<()> {
        let mut achievements = self.achievements.write().await;
        if achievements.iter().any(|a| {
            a.user_id == achievement.user_id && a.achievement_id == achievement.achievement_id
        }) {
            return Err(DatabaseError::Conflict("achievement already earned".to_string()));
        }
        achievements.push(achievement.clone());
        Ok(())
    }

    async fn achievements_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Achievement>> {
        let mut earned: Vec<Achievement> = self
            .achievements
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        earned.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Ok(earned)
    }
}
