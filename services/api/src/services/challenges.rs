//! Daily challenge rotation

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    models::{DAILY_CHALLENGES_COURSE, DailyChallenge, Lesson},
    repositories::ContentRepository,
};

/// Maps a calendar day onto the challenge rotation
///
/// The rotation is re-read on every call and nothing is pinned, so the
/// answer for a date only stays stable while the rotation does.
#[derive(Clone)]
pub struct DailyChallengeSelector {
    content: Arc<dyn ContentRepository>,
}

impl DailyChallengeSelector {
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self { content }
    }

    /// Challenge lesson for `date`: day of year modulo rotation length
    pub async fn select(&self, date: NaiveDate) -> ApiResult<Lesson> {
        let mut rotation = self.content.lessons_in_course(DAILY_CHALLENGES_COURSE).await?;
        if rotation.is_empty() {
            return Err(ApiError::NotFound(
                "No daily challenges available".to_string(),
            ));
        }

        let index = date.ordinal() as usize % rotation.len();
        Ok(rotation.swap_remove(index))
    }

    /// Public view of the challenge for `date`
    pub async fn challenge_for(&self, date: NaiveDate) -> ApiResult<DailyChallenge> {
        let lesson = self.select(date).await?;
        Ok(DailyChallenge::from_lesson(&lesson, date))
    }
}
