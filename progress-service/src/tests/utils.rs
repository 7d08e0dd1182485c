use axum::Router;
use lesson_progress_shared::test_utils::mock_progress_store::MockProgressStore;
use lesson_progress_shared::test_utils::test_logging::init_test_logging;
use std::sync::Arc;

use crate::config::ConfigError;
use crate::routes::create_router_with_store;
use crate::state::AppState;

/// Router over a fresh mock store; the store handle lets tests count rows
pub fn test_app() -> (Router, Arc<MockProgressStore>) {
    init_test_logging();
    let store = Arc::new(MockProgressStore::new());
    let app = create_router_with_store(AppState::new(store.clone()));
    (app, store)
}

/// Router started without DATABASE_URL
pub fn unconfigured_app() -> Router {
    init_test_logging();
    create_router_with_store(AppState::<MockProgressStore>::unconfigured(
        ConfigError::MissingDatabaseUrl,
    ))
}

/// Router whose store fails every call
pub fn failing_app() -> Router {
    init_test_logging();
    create_router_with_store(AppState::new(Arc::new(MockProgressStore::failing())))
}

pub fn progress_body(telegram_id: i64, lesson_id: &str, is_completed: bool) -> serde_json::Value {
    serde_json::json!({
        "telegram_id": telegram_id,
        "telegram_user": {
            "first_name": "Test",
            "last_name": "User",
            "username": "test_user"
        },
        "lesson_id": lesson_id,
        "is_completed": is_completed
    })
}
