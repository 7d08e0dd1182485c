use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{Method, StatusCode},
    response::Response,
};
use lesson_progress_shared::store::ProgressStore;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{
    ProgressListResponse, ProgressQuery, RecordProgressRequest, RecordProgressResponse,
};
use crate::responses;
use crate::state::AppState;

// GET ?telegram_id=
pub async fn get_progress<S>(
    State(state): State<AppState<S>>,
    query: std::result::Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Response>
where
    S: ProgressStore,
{
    let store = state.store()?;
    let Query(query) =
        query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let telegram_id = query.telegram_id()?;

    let rows = store.get_progress_by_telegram_id(telegram_id).await?;
    info!(
        "Fetched {} progress rows for telegram_id={}",
        rows.len(),
        telegram_id
    );

    Ok(responses::json(
        StatusCode::OK,
        ProgressListResponse::from(rows),
    ))
}

// POST {telegram_id, telegram_user, lesson_id, is_completed}
pub async fn record_progress<S>(State(state): State<AppState<S>>, body: Bytes) -> Result<Response>
where
    S: ProgressStore,
{
    let store = state.store()?;
    let command = RecordProgressRequest::from_body(&body)?.into_command()?;

    let recorded = store.record_progress(command).await?;
    if recorded.user_created {
        info!(
            "Created user id={} for telegram_id={}",
            recorded.user.id, recorded.user.telegram_id
        );
    }
    info!(
        "Recorded progress user_id={} lesson_id={} is_completed={}",
        recorded.user.id, recorded.progress.lesson_id, recorded.progress.is_completed
    );

    Ok(responses::json(
        StatusCode::OK,
        RecordProgressResponse {
            success: true,
            lesson_id: recorded.progress.lesson_id,
            is_completed: recorded.progress.is_completed,
        },
    ))
}

// Any other method. A missing store is still reported as a configuration error first.
pub async fn method_not_allowed<S>(
    State(state): State<AppState<S>>,
    method: Method,
) -> Result<Response>
where
    S: ProgressStore,
{
    state.store()?;
    Err(AppError::MethodNotAllowed(method))
}
