use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use foundation_shared::blocks::codec::CodecError;
use foundation_shared::blocks::BlockError;
use foundation_shared::save::SaveError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Account locked until {0}")]
    AccountLocked(DateTime<Utc>),

    #[error("Resource not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error("Stored content could not be decoded: {0}")]
    Decode(#[from] CodecError),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        let unique_violation = e
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == "23505");
        if unique_violation {
            return AppError::Conflict("A record with this key already exists".to_string());
        }
        AppError::Database(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::AccountLocked(_) => StatusCode::LOCKED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Block(_) => StatusCode::BAD_REQUEST,
            AppError::Save(SaveError::AuthoringInput(_)) => StatusCode::BAD_REQUEST,
            AppError::Save(SaveError::SlugConflict(_)) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Decode(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::AccountLocked(until) => format!(
                "Too many failed attempts. Try again after {}",
                until.format("%H:%M UTC")
            ),
            AppError::Validation(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Decode(e) => {
                tracing::error!("Decode error: {:?}", e);
                "Content unavailable".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "Internal error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (self.status(), body).into_response()
    }
}
