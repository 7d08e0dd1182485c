use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::models::{LessonProgress, RecordProgress, RecordedProgress, User};
use crate::store::ProgressStore;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    progress: Vec<LessonProgress>,
    next_user_id: i64,
}

/// MockProgressStore is a simple in-memory implementation of ProgressStore for testing.
///
/// Both tables sit behind one lock so `record_progress` is atomic, like the
/// transaction in the PostgreSQL store.
pub struct MockProgressStore {
    tables: Mutex<Tables>,
    fail: bool,
}

impl MockProgressStore {
    /// Create a new empty MockProgressStore
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_user_id: 1,
                ..Tables::default()
            }),
            fail: false,
        }
    }

    /// Create a MockProgressStore with existing users
    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.lock().unwrap();
            tables.next_user_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
            tables.users = users;
        }
        store
    }

    /// Create a store whose every call fails, to exercise datastore error paths
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn progress_count(&self) -> usize {
        self.tables.lock().unwrap().progress.len()
    }

    pub fn users(&self) -> Vec<User> {
        self.tables.lock().unwrap().users.clone()
    }

    pub fn progress_rows(&self) -> Vec<LessonProgress> {
        self.tables.lock().unwrap().progress.clone()
    }

    fn check_available(&self) -> Result<()> {
        if self.fail {
            return Err(StoreError::Unavailable(
                "mock store configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MockProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressStore for MockProgressStore {
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    async fn get_progress_for_user(&self, user_id: i64) -> Result<Vec<LessonProgress>> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn record_progress(&self, command: RecordProgress) -> Result<RecordedProgress> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();

        let existing = tables
            .users
            .iter()
            .find(|u| u.telegram_id == command.telegram_id)
            .cloned();

        let (user, user_created) = match existing {
            Some(user) => (user, false),
            None => {
                let new_user = command.new_user();
                let user = User {
                    id: tables.next_user_id,
                    telegram_id: new_user.telegram_id,
                    first_name: new_user.first_name,
                    last_name: new_user.last_name,
                    username: new_user.username,
                };
                tables.next_user_id += 1;
                tables.users.push(user.clone());
                (user, true)
            }
        };

        let row = LessonProgress::at(
            user.id,
            command.lesson_id,
            command.is_completed,
            Utc::now(),
        );

        match tables
            .progress
            .iter_mut()
            .find(|p| p.user_id == row.user_id && p.lesson_id == row.lesson_id)
        {
            Some(existing) => *existing = row.clone(),
            None => tables.progress.push(row.clone()),
        }

        Ok(RecordedProgress {
            user,
            user_created,
            progress: row,
        })
    }
}
