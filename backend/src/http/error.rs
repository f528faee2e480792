//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Internal server error
    Internal(String),
    /// Feed construction error
    Feed(FeedError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Feed(e) => {
                let status = match &e {
                    FeedError::InvalidAuthentication => StatusCode::UNAUTHORIZED,
                    FeedError::InvalidSelection => StatusCode::BAD_REQUEST,
                    FeedError::DeadlineExceeded { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    FeedError::EphemerisUnavailable(_) | FeedError::Config(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                let error = ApiError::new(e.code(), e.to_string());
                let error = match e {
                    FeedError::DeadlineExceeded { .. } => {
                        error.with_details("Retry later or request a shorter window")
                    }
                    _ => error,
                };
                (status, error)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        AppError::Feed(err)
    }
}
