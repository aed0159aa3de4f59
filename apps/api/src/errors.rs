use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::listings::orchestrator::ListingsError;
use crate::listings::preferences::PreferenceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Preference not set")]
    PreferenceNotSet,

    #[error("Scraper unavailable: {0}")]
    ScraperUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ListingsError> for AppError {
    fn from(e: ListingsError) -> Self {
        match e {
            ListingsError::PreferenceNotSet => AppError::PreferenceNotSet,
            ListingsError::ScraperUnavailable(e) => AppError::ScraperUnavailable(e.to_string()),
            ListingsError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<PreferenceError> for AppError {
    fn from(e: PreferenceError) -> Self {
        ListingsError::from(e).into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::PreferenceNotSet => (
                StatusCode::BAD_REQUEST,
                "PREFERENCE_NOT_SET",
                "Upload a résumé to set a role preference before requesting listings"
                    .to_string(),
            ),
            AppError::ScraperUnavailable(msg) => {
                tracing::error!("Scraper unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SCRAPER_UNAVAILABLE",
                    "Listings are temporarily unavailable, retry shortly".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
