//! API error types with JSON responses.
//!
//! Handlers return [`ApiResult`] and never build error responses by hand;
//! the status code and body for every failure are decided here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookshelf_core::{PasswordError, ValidationError};
use bookshelf_store::StoreError;
use serde::Serialize;

/// Message returned for store and internal failures. Details stay in the logs.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Message returned when the store was never reached.
const UNAVAILABLE_MESSAGE: &str = "The data store is unavailable";

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400): malformed identifier, query string or body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Payload failed validation (400).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The record kept changing underneath a guarded update (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Store error (500, or 503 when the store was never connected).
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<bson::de::Error> for ApiError {
    fn from(e: bson::de::Error) -> Self {
        Self::Store(StoreError::Deserialization(e))
    }
}

impl From<bson::ser::Error> for ApiError {
    fn from(e: bson::ser::Error) -> Self {
        Self::Store(StoreError::Serialization(e))
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(StoreError::NotConnected(_)) => "STORE_UNAVAILABLE",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(StoreError::NotConnected(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Validation(e) => e.to_string(),
            Self::Store(StoreError::NotConnected(_)) => UNAVAILABLE_MESSAGE.to_string(),
            Self::Internal(_) | Self::Store(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.code(), "Request rejected");
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message: self.public_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ValidationError::EmptyPayload).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::NotConnected("refused".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(StoreError::UnexpectedResponse("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_detail_not_leaked() {
        let err = ApiError::from(StoreError::UnexpectedResponse(
            "replica set rs0 has no primary".into(),
        ));
        assert_eq!(err.code(), "STORAGE_ERROR");
        assert_eq!(err.public_message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn test_validation_message_is_public() {
        let err = ApiError::from(ValidationError::CopiesExceedTotal {
            available: 4,
            total: 3,
        });
        assert!(err.public_message().contains("availableCopies"));
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
