use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use trending_core::error::CoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Trending data not available")]
    DataUnavailable,

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Scraping failed: {0}")]
    Collaborator(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::DataUnavailable(_) => AppError::DataUnavailable,
            CoreError::Validation(message) => AppError::Validation(message),
            CoreError::Unauthorized => AppError::Unauthorized,
            CoreError::Collaborator(message) => AppError::Collaborator(message),
            CoreError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::DataUnavailable | AppError::Collaborator(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
