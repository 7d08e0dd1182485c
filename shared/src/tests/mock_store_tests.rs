use std::sync::Arc;

use crate::models::{RecordProgress, TelegramProfile, User};
use crate::store::ProgressStore;
use crate::test_utils::mock_progress_store::MockProgressStore;

fn command(telegram_id: i64, lesson_id: &str, is_completed: bool) -> RecordProgress {
    RecordProgress {
        telegram_id,
        lesson_id: lesson_id.to_string(),
        is_completed,
        profile: TelegramProfile {
            first_name: Some("Test".to_string()),
            last_name: None,
            username: Some("tester".to_string()),
        },
    }
}

#[tokio::test]
async fn test_record_progress_creates_user_on_first_contact() {
    let store = Arc::new(MockProgressStore::new());

    let recorded = store
        .record_progress(command(1001, "intro", true))
        .await
        .unwrap();

    assert!(recorded.user_created);
    assert_eq!(recorded.user.telegram_id, 1001);
    assert_eq!(recorded.user.first_name, "Test");
    assert_eq!(recorded.user.last_name, "");
    assert_eq!(recorded.user.username, "tester");
    assert!(recorded.progress.completed_at.is_some());
    assert_eq!(store.user_count(), 1);
    assert_eq!(store.progress_count(), 1);
}

#[tokio::test]
async fn test_record_progress_reuses_existing_user() {
    let existing = User {
        id: 5,
        telegram_id: 2002,
        first_name: "Old".to_string(),
        last_name: "Name".to_string(),
        username: "old".to_string(),
    };
    let store = MockProgressStore::with_users(vec![existing.clone()]);

    let recorded = store
        .record_progress(command(2002, "intro", false))
        .await
        .unwrap();

    assert!(!recorded.user_created);
    // Display attributes are only written on creation
    assert_eq!(recorded.user, existing);
    assert_eq!(store.user_count(), 1);
}

#[tokio::test]
async fn test_record_progress_overwrites_same_lesson() {
    let store = MockProgressStore::new();

    store
        .record_progress(command(3003, "lesson-2", true))
        .await
        .unwrap();
    let second = store
        .record_progress(command(3003, "lesson-2", false))
        .await
        .unwrap();

    assert!(!second.user_created);
    assert_eq!(store.progress_count(), 1);

    let rows = store.get_progress_by_telegram_id(3003).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_completed);
    assert!(rows[0].completed_at.is_none());
}

#[tokio::test]
async fn test_progress_is_scoped_per_user() {
    let store = MockProgressStore::new();

    store.record_progress(command(1, "a", true)).await.unwrap();
    store.record_progress(command(1, "b", false)).await.unwrap();
    store.record_progress(command(2, "a", true)).await.unwrap();

    assert_eq!(store.get_progress_by_telegram_id(1).await.unwrap().len(), 2);
    assert_eq!(store.get_progress_by_telegram_id(2).await.unwrap().len(), 1);
    assert!(store.get_progress_by_telegram_id(3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failing_store_surfaces_errors() {
    let store = MockProgressStore::failing();

    assert!(store.find_user_by_telegram_id(1).await.is_err());
    assert!(store.record_progress(command(1, "a", true)).await.is_err());
    assert_eq!(store.progress_count(), 0);
}
