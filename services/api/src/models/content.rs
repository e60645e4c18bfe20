//! Lesson, course and badge reference content

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reserved course whose lessons form the daily challenge rotation
pub const DAILY_CHALLENGES_COURSE: &str = "daily_challenges";

/// Lesson record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub lesson_id: String,
    pub course_id: String,
    pub title: String,
    pub title_ar: String,
    pub description: String,
    pub description_ar: String,
    pub order: i32,
    pub difficulty: String,
    pub duration_minutes: i32,
    pub content_blocks: serde_json::Value,
    pub scratch_blocks: Vec<String>,
    pub has_puzzle: bool,
    pub has_activity: bool,
    pub has_video: bool,
    pub coins_reward: i64,
    pub character_name: String,
    pub character_intro_joke: Option<String>,
    pub character_intro_joke_ar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn is_daily_challenge(&self) -> bool {
        self.course_id == DAILY_CHALLENGES_COURSE
    }
}

/// Lesson as shown in the curriculum listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
    pub title_ar: String,
    pub description: String,
    pub description_ar: String,
    pub difficulty: String,
    pub duration_minutes: i32,
    pub coins_reward: i64,
    pub character_name: String,
    pub character_joke: Option<String>,
}

impl From<&Lesson> for LessonSummary {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.lesson_id.clone(),
            title: lesson.title.clone(),
            title_ar: lesson.title_ar.clone(),
            description: lesson.description.clone(),
            description_ar: lesson.description_ar.clone(),
            difficulty: lesson.difficulty.clone(),
            duration_minutes: lesson.duration_minutes,
            coins_reward: lesson.coins_reward,
            character_name: lesson.character_name.clone(),
            character_joke: lesson.character_intro_joke.clone(),
        }
    }
}

/// Challenge of the day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyChallenge {
    pub id: String,
    pub date: String,
    pub title: String,
    pub title_ar: String,
    pub description: String,
    pub description_ar: String,
    pub coins_reward: i64,
    pub joke_of_the_day: String,
    pub joke_of_the_day_ar: String,
    pub puzzle_type: String,
}

impl DailyChallenge {
    pub fn from_lesson(lesson: &Lesson, date: NaiveDate) -> Self {
        Self {
            id: lesson.lesson_id.clone(),
            date: date.format("%Y-%m-%d").to_string(),
            title: lesson.title.clone(),
            title_ar: lesson.title_ar.clone(),
            description: lesson.description.clone(),
            description_ar: lesson.description_ar.clone(),
            coins_reward: lesson.coins_reward,
            joke_of_the_day: lesson.character_intro_joke.clone().unwrap_or_default(),
            joke_of_the_day_ar: lesson.character_intro_joke_ar.clone().unwrap_or_default(),
            puzzle_type: "drag-drop".to_string(),
        }
    }
}

/// Course record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub course_id: String,
    pub title: String,
    pub title_ar: String,
    pub description: String,
    pub description_ar: String,
    pub difficulty: String,
    pub estimated_hours: f64,
    pub order: i32,
    pub thumbnail: Option<String>,
    pub color_theme: String,
    pub lesson_ids: Vec<String>,
    pub total_lessons: i32,
    pub completion_coins: i64,
    pub completion_badge: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Badge definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BadgeDefinition {
    #[serde(rename = "id")]
    pub achievement_id: String,
    pub title: String,
    pub title_ar: String,
    pub description: String,
    pub description_ar: String,
    pub icon: String,
    pub category: String,
    /// Metric the badge is earned on, e.g. `lessons_completed`
    pub requirement_type: String,
    pub requirement_value: i64,
    pub coins_reward: i64,
    pub funny_message: String,
    pub funny_message_ar: String,
}
