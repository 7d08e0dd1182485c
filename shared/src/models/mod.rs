use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A learner known by their Telegram account.
#[derive(Serialize, Deserialize, FromRow, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// Completion state of one lesson for one user, keyed by (user_id, lesson_id).
#[derive(Serialize, Deserialize, FromRow, Clone, Debug, PartialEq)]
pub struct LessonProgress {
    pub user_id: i64,
    pub lesson_id: String,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl LessonProgress {
    /// Builds the row an upsert leaves behind at `now`.
    /// `completed_at` is set only while the lesson is completed.
    pub fn at(user_id: i64, lesson_id: String, is_completed: bool, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            lesson_id,
            is_completed,
            completed_at: is_completed.then_some(now),
            updated_at: now,
        }
    }

    pub fn completed_at_iso(&self) -> Option<String> {
        self.completed_at
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

/// Display attributes as sent by the Telegram WebApp. Every field may be absent.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TelegramProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Display attributes ready to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl NewUser {
    /// Missing `first_name`, `last_name` and `username` are all stored as the
    /// empty string rather than NULL.
    pub fn from_profile(telegram_id: i64, profile: &TelegramProfile) -> Self {
        Self {
            telegram_id,
            first_name: profile.first_name.clone().unwrap_or_default(),
            last_name: profile.last_name.clone().unwrap_or_default(),
            username: profile.username.clone().unwrap_or_default(),
        }
    }
}

/// A validated request to record the completion state of a lesson.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordProgress {
    pub telegram_id: i64,
    pub lesson_id: String,
    pub is_completed: bool,
    pub profile: TelegramProfile,
}

impl RecordProgress {
    pub fn new_user(&self) -> NewUser {
        NewUser::from_profile(self.telegram_id, &self.profile)
    }
}

/// Outcome of [`crate::store::ProgressStore::record_progress`].
#[derive(Clone, Debug)]
pub struct RecordedProgress {
    pub user: User,
    pub user_created: bool,
    pub progress: LessonProgress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_completed_row_carries_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let row = LessonProgress::at(7, "lesson-1".into(), true, now);

        assert_eq!(row.completed_at, Some(now));
        assert_eq!(row.updated_at, now);
        assert_eq!(
            row.completed_at_iso().as_deref(),
            Some("2024-03-01T12:30:00.000000Z")
        );
    }

    #[test]
    fn test_incomplete_row_has_no_completion_time() {
        let now = Utc::now();
        let row = LessonProgress::at(7, "lesson-1".into(), false, now);

        assert!(row.completed_at.is_none());
        assert!(row.completed_at_iso().is_none());
        assert_eq!(row.updated_at, now);
    }

    #[test]
    fn test_new_user_defaults_missing_names_to_empty() {
        let profile = TelegramProfile {
            first_name: Some("Ada".into()),
            last_name: None,
            username: None,
        };

        let user = NewUser::from_profile(42, &profile);
        assert_eq!(user.telegram_id, 42);
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "");
        assert_eq!(user.username, "");
    }
}
