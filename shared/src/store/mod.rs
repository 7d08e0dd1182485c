use async_trait::async_trait;

use crate::error::Result;
use crate::models::{LessonProgress, RecordProgress, RecordedProgress, User};

// Expose the PostgreSQL store module
pub mod postgres;

/// ProgressStore trait defining the interface for lesson progress storage implementations
#[async_trait]
pub trait ProgressStore: Send + Sync + 'static {
    /// Looks up a user by their Telegram id
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>>;

    /// Gets every progress row of a user, in storage order
    async fn get_progress_for_user(&self, user_id: i64) -> Result<Vec<LessonProgress>>;

    /// Creates the user on first contact, then upserts the (user, lesson) row.
    /// Both writes are durable when this returns `Ok`.
    async fn record_progress(&self, command: RecordProgress) -> Result<RecordedProgress>;

    /// Gets the progress of a Telegram user. Unknown users have no progress.
    async fn get_progress_by_telegram_id(&self, telegram_id: i64) -> Result<Vec<LessonProgress>> {
        match self.find_user_by_telegram_id(telegram_id).await? {
            Some(user) => self.get_progress_for_user(user.id).await,
            None => Ok(Vec::new()),
        }
    }
}
