use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use lesson_progress_shared::error::StoreError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::models::ErrorResponse;
use crate::responses;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Configuration(err) => {
                tracing::error!("Configuration error: {}", err);
                let message = match err {
                    ConfigError::MissingDatabaseUrl => "Database configuration missing",
                    ConfigError::InvalidValue { .. } => "Database configuration invalid",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            AppError::MethodNotAllowed(method) => {
                tracing::warn!("Method not allowed: {}", method);
                (
                    StatusCode::METHOD_NOT_ALLOWED,
                    "Method not allowed".to_string(),
                )
            }
            AppError::Store(err) => {
                tracing::error!("Store error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::SerializationError(err) => {
                tracing::warn!("Serialization error: {}", err);
                (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", err))
            }
        };

        tracing::info!("Returning error response: status={}, message={}", status, message);
        responses::json(status, ErrorResponse { error: message })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
