//! PostgreSQL-backed repositories

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{debug, info};
use uuid::Uuid;

use super::{AchievementRepository, ContentRepository, ProgressRepository, UserRepository};
use crate::models::{Achievement, BadgeDefinition, Course, Lesson, Progress, Role, User};

const USER_COLUMNS: &str = "id, username, display_name, email, password_hash, avatar, role, \
    scratchy_coins, unlocked_skins, preferred_language, created_at, updated_at, last_login";

const PROGRESS_COLUMNS: &str = "user_id, total_lessons_completed, total_courses_completed, \
    total_challenges_completed, total_time_spent_seconds, current_streak, longest_streak, \
    last_activity_date, daily_challenges_completed, created_at, updated_at, version";

const LESSON_COLUMNS: &str = "lesson_id, course_id, title, title_ar, description, description_ar, \
    \"order\", difficulty, duration_minutes, content_blocks, scratch_blocks, has_puzzle, \
    has_activity, has_video, coins_reward, character_name, character_intro_joke, \
    character_intro_joke_ar, created_at, updated_at";

const COURSE_COLUMNS: &str = "course_id, title, title_ar, description, description_ar, difficulty, \
    estimated_hours, \"order\", thumbnail, color_theme, lesson_ids, total_lessons, \
    completion_coins, completion_badge, is_published, created_at, updated_at";

const INSERT_PROGRESS_SQL: &str = r#"
    INSERT INTO progress (user_id, total_lessons_completed, total_courses_completed,
                          total_challenges_completed, total_time_spent_seconds,
                          current_streak, longest_streak, last_activity_date,
                          daily_challenges_completed, created_at, updated_at, version)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 1)
    ON CONFLICT (user_id) DO NOTHING
"#;

const UPDATE_PROGRESS_SQL: &str = r#"
    UPDATE progress
    SET total_lessons_completed = $2, total_courses_completed = $3,
        total_challenges_completed = $4, total_time_spent_seconds = $5,
        current_streak = $6, longest_streak = $7, last_activity_date = $8,
        daily_challenges_completed = $9, created_at = $10, updated_at = $11,
        version = version + 1
    WHERE user_id = $1 AND version = $12
"#;

const BADGE_COLUMNS: &str = "achievement_id, title, title_ar, description, description_ar, icon, \
    category, requirement_type, requirement_value, coins_reward, funny_message, funny_message_ar";

/// Repository over a PostgreSQL pool, serving every collection
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        avatar: row.try_get("avatar")?,
        role,
        scratchy_coins: row.try_get("scratchy_coins")?,
        unlocked_skins: row.try_get("unlocked_skins")?,
        preferred_language: row.try_get("preferred_language")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login: row.try_get("last_login")?,
    })
}

fn progress_from_row(row: &PgRow) -> Result<Progress, sqlx::Error> {
    Ok(Progress {
        user_id: row.try_get("user_id")?,
        total_lessons_completed: row.try_get("total_lessons_completed")?,
        total_courses_completed: row.try_get("total_courses_completed")?,
        total_challenges_completed: row.try_get("total_challenges_completed")?,
        total_time_spent_seconds: row.try_get("total_time_spent_seconds")?,
        current_streak: row.try_get("current_streak")?,
        longest_streak: row.try_get("longest_streak")?,
        last_activity_date: row.try_get("last_activity_date")?,
        daily_challenges_completed: row.try_get("daily_challenges_completed")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version: row.try_get("version")?,
    })
}

fn lesson_from_row(row: &PgRow) -> Result<Lesson, sqlx::Error> {
    Ok(Lesson {
        lesson_id: row.try_get("lesson_id")?,
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        title_ar: row.try_get("title_ar")?,
        description: row.try_get("description")?,
        description_ar: row.try_get("description_ar")?,
        order: row.try_get("order")?,
        difficulty: row.try_get("difficulty")?,
        duration_minutes: row.try_get("duration_minutes")?,
        content_blocks: row.try_get("content_blocks")?,
        scratch_blocks: row.try_get("scratch_blocks")?,
        has_puzzle: row.try_get("has_puzzle")?,
        has_activity: row.try_get("has_activity")?,
        has_video: row.try_get("has_video")?,
        coins_reward: row.try_get("coins_reward")?,
        character_name: row.try_get("character_name")?,
        character_intro_joke: row.try_get("character_intro_joke")?,
        character_intro_joke_ar: row.try_get("character_intro_joke_ar")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn course_from_row(row: &PgRow) -> Result<Course, sqlx::Error> {
    Ok(Course {
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        title_ar: row.try_get("title_ar")?,
        description: row.try_get("description")?,
        description_ar: row.try_get("description_ar")?,
        difficulty: row.try_get("difficulty")?,
        estimated_hours: row.try_get("estimated_hours")?,
        order: row.try_get("order")?,
        thumbnail: row.try_get("thumbnail")?,
        color_theme: row.try_get("color_theme")?,
        lesson_ids: row.try_get("lesson_ids")?,
        total_lessons: row.try_get("total_lessons")?,
        completion_coins: row.try_get("completion_coins")?,
        completion_badge: row.try_get("completion_badge")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn badge_from_row(row: &PgRow) -> Result<BadgeDefinition, sqlx::Error> {
    Ok(BadgeDefinition {
        achievement_id: row.try_get("achievement_id")?,
        title: row.try_get("title")?,
        title_ar: row.try_get("title_ar")?,
        description: row.try_get("description")?,
        description_ar: row.try_get("description_ar")?,
        icon: row.try_get("icon")?,
        category: row.try_get("category")?,
        requirement_type: row.try_get("requirement_type")?,
        requirement_value: row.try_get("requirement_value")?,
        coins_reward: row.try_get("coins_reward")?,
        funny_message: row.try_get("funny_message")?,
        funny_message_ar: row.try_get("funny_message_ar")?,
    })
}

fn achievement_from_row(row: &PgRow) -> Result<Achievement, sqlx::Error> {
    Ok(Achievement {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        achievement_id: row.try_get("achievement_id")?,
        earned_at: row.try_get("earned_at")?,
        context: row.try_get("context")?,
    })
}

fn map_rows<T>(
    rows: &[PgRow],
    map: impl Fn(&PgRow) -> Result<T, sqlx::Error>,
) -> DatabaseResult<Vec<T>> {
    rows.iter()
        .map(|row| map(row).map_err(DatabaseError::Query))
        .collect()
}

impl PgStore {
    async fn find_user_where(&self, column: &str, value: &str) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: &User) -> DatabaseResult<()> {
        info!(username = %user.username, "Creating new user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, display_name, email, password_hash, avatar, role,
                               scratchy_coins, unlocked_skins, preferred_language,
                               created_at, updated_at, last_login)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.role.as_str())
        .bind(user.scratchy_coins)
        .bind(&user.unlocked_skins)
        .bind(&user.preferred_language)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        self.find_user_where("username", username).await
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        self.find_user_where("email", email).await
    }

    async fn update_user_profile(&self, user: &User) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET display_name = $2, avatar = $3, preferred_language = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.display_name)
        .bind(&user.avatar)
        .bind(&user.preferred_language)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> DatabaseResult<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn add_coins(
        &self,
        id: Uuid,
        amount: i64,
        at: DateTime<Utc>,
    ) -> DatabaseResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET scratchy_coins = scratchy_coins + $2, updated_at = $3
            WHERE id = $1
            RETURNING scratchy_coins
            "#,
        )
        .bind(id)
        .bind(amount)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn top_users_by_coins(&self, limit: i64) -> DatabaseResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY scratchy_coins DESC LIMIT $1",
            USER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        map_rows(&rows, user_from_row)
    }
}

#[async_trait]
impl ProgressRepository for PgStore {
    async fn find_progress(&self, user_id: Uuid) -> DatabaseResult<Option<Progress>> {
        let sql = format!("SELECT {} FROM progress WHERE user_id = $1", PROGRESS_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(progress_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn save_progress(&self, progress: &Progress) -> DatabaseResult<bool> {
        let is_new = progress.version == 0;
        let sql = if is_new {
            INSERT_PROGRESS_SQL
        } else {
            UPDATE_PROGRESS_SQL
        };

        let mut query = sqlx::query(sql)
            .bind(progress.user_id)
            .bind(progress.total_lessons_completed)
            .bind(progress.total_courses_completed)
            .bind(progress.total_challenges_completed)
            .bind(progress.total_time_spent_seconds)
            .bind(progress.current_streak)
            .bind(progress.longest_streak)
            .bind(progress.last_activity_date)
            .bind(&progress.daily_challenges_completed)
            .bind(progress.created_at)
            .bind(progress.updated_at);
        if !is_new {
            query = query.bind(progress.version);
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        let applied = result.rows_affected() == 1;
        if !applied {
            debug!(user_id = %progress.user_id, version = progress.version, "Progress write rejected");
        }
        Ok(applied)
    }
}

#[async_trait]
impl ContentRepository for PgStore {
    async fn list_lessons(&self) -> DatabaseResult<Vec<Lesson>> {
        let sql = format!(
            "SELECT {} FROM lessons ORDER BY course_id, \"order\", lesson_id",
            LESSON_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        map_rows(&rows, lesson_from_row)
    }

    async fn lessons_in_course(&self, course_id: &str) -> DatabaseResult<Vec<Lesson>> {
        let sql = format!(
            "SELECT {} FROM lessons WHERE course_id = $1 ORDER BY \"order\", lesson_id",
            LESSON_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        map_rows(&rows, lesson_from_row)
    }

    async fn find_lesson(&self, lesson_id: &str) -> DatabaseResult<Option<Lesson>> {
        let sql = format!("SELECT {} FROM lessons WHERE lesson_id = $1", LESSON_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(lesson_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(lesson_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn list_courses(&self) -> DatabaseResult<Vec<Course>> {
        let sql = format!(
            "SELECT {} FROM courses ORDER BY \"order\", course_id",
            COURSE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        map_rows(&rows, course_from_row)
    }

    async fn list_badges(&self) -> DatabaseResult<Vec<BadgeDefinition>> {
        let sql = format!(
            "SELECT {} FROM achievement_definitions ORDER BY achievement_id",
            BADGE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        map_rows(&rows, badge_from_row)
    }
}

#[async_trait]
impl AchievementRepository for PgStore {
    async fn record_achievement(&self, achievement: &Achievement) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO achievements (id, user_id, achievement_id, earned_at, context)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(achievement.id)
        .bind(achievement.user_id)
        .bind(&achievement.achievement_id)
        .bind(achievement.earned_at)
        .bind(&achievement.context)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn achievements_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Achievement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, achievement_id, earned_at, context
            FROM achievements
            WHERE user_id = $1
            ORDER BY earned_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        map_rows(&rows, achievement_from_row)
    }
}
