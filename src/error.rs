// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::chat_session::SessionError;
use crate::services::checkin::CheckInError;
use crate::services::health_plan_client::BackendError;
use crate::services::intake::UnknownFormat;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("session '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Upstream(#[from] BackendError),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::EmptyMessage => AppError::BadRequest(err.to_string()),
            SessionError::RequestInFlight | SessionError::IntakeAlreadySubmitted => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<CheckInError> for AppError {
    fn from(err: CheckInError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<UnknownFormat> for AppError {
    fn from(err: UnknownFormat) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
