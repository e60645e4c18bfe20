//! Read-only curriculum content

use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    models::{BadgeDefinition, Course, Lesson, LessonSummary},
    repositories::ContentRepository,
};

/// Lessons, courses and badge definitions
#[derive(Clone)]
pub struct Catalog {
    content: Arc<dyn ContentRepository>,
}

impl Catalog {
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self { content }
    }

    /// Curriculum lessons; the daily challenge rotation is left out
    pub async fn list_lessons(&self) -> ApiResult<Vec<LessonSummary>> {
        Ok(self
            .content
            .list_lessons()
            .await?
            .iter()
            .filter(|lesson| !lesson.is_daily_challenge())
            .map(LessonSummary::from)
            .collect())
    }

    pub async fn get_lesson(&self, lesson_id: &str) -> ApiResult<Lesson> {
        self.content
            .find_lesson(lesson_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))
    }

    /// Published courses in display order
    pub async fn list_courses(&self) -> ApiResult<Vec<Course>> {
        let mut courses = self.content.list_courses().await?;
        courses.retain(|course| course.is_published);
        Ok(courses)
    }

    pub async fn list_badges(&self) -> ApiResult<Vec<BadgeDefinition>> {
        Ok(self.content.list_badges().await?)
    }
}
