//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rides::FareError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::matching::MatchError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid credentials
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Bad request: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The resource belongs to another user
    #[error("Forbidden")]
    PermissionDenied,

    /// The resource is not in a state that allows the change
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::RequestNotFound(_)
            | MatchError::CandidateNotFound(_)
            | MatchError::ShareRequestNotFound(_) => ApiError::NotFound(err.to_string()),
            MatchError::PermissionDenied => ApiError::PermissionDenied,
            MatchError::InvalidTransition { .. } | MatchError::InvalidShare(_) => {
                ApiError::InvalidArgument(err.to_string())
            }
            MatchError::DuplicateShareRequest | MatchError::ShareAlreadyResolved(_) => {
                ApiError::Conflict(err.to_string())
            }
            MatchError::Store(e) => {
                error!("Store failure: {:#}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<FareError> for ApiError {
    fn from(err: FareError) -> Self {
        ApiError::InvalidArgument(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::PermissionDenied => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
