//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation Errors**: Malformed identifiers or missing required fields
/// - **Resource Errors**: Event id does not resolve
/// - **Authorization Errors**: Vendor identity does not own the event
/// - **Lifecycle Errors**: Operation attempted outside its required status
/// - **OTP Errors**: Wrong, expired, or already used code (deliberately undifferentiated)
/// - **Infrastructure Errors**: Store or delivery channel failures
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Store operation failed (e.g., connection error, query error).
    ///
    /// Returns HTTP 500 without exposing details.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request data is malformed or a required field is missing.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Request body exceeds the configured upload limit.
    ///
    /// Returns HTTP 413 Payload Too Large.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Event id does not resolve to a record.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Event not found")]
    EventNotFound,

    /// Claimed vendor identity does not match the event owner.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Unauthorized vendor")]
    Forbidden,

    /// Operation is not allowed in the event's current status.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("{0}")]
    InvalidState(String),

    /// No redeemable code matched.
    ///
    /// Wrong code, expiry and reuse all map here so callers cannot tell them apart.
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    /// The OTP delivery channel rejected the code.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("OTP delivery failed: {0}")]
    Notification(String),
}

/// Body extraction failures keep the error envelope instead of axum's plain text.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::InvalidArgument(rejection.body_text())
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidArgument` → 400 Bad Request
/// - `InvalidOrExpiredOtp` → 400 Bad Request
/// - `Forbidden` → 403 Forbidden
/// - `PayloadTooLarge` → 413 Payload Too Large
/// - `EventNotFound` → 404 Not Found
/// - `InvalidState` → 409 Conflict
/// - `Notification` → 502 Bad Gateway
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidArgument(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_argument", msg.clone())
            }
            AppError::InvalidOrExpiredOtp => (
                StatusCode::BAD_REQUEST,
                "invalid_or_expired_otp",
                self.to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::PayloadTooLarge(ref msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                msg.clone(),
            ),
            AppError::EventNotFound => {
                (StatusCode::NOT_FOUND, "event_not_found", self.to_string())
            }
            AppError::InvalidState(ref msg) => {
                (StatusCode::CONFLICT, "invalid_state", msg.clone())
            }
            AppError::Notification(ref msg) => {
                tracing::error!(error = %msg, "OTP delivery failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "notification_failed",
                    "OTP could not be delivered".to_string(),
                )
            }
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        let cases = [
            (
                AppError::InvalidArgument("Invalid eventId".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::InvalidOrExpiredOtp, StatusCode::BAD_REQUEST),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (
                AppError::PayloadTooLarge("Request payload is too large".to_string()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (AppError::EventNotFound, StatusCode::NOT_FOUND),
            (
                AppError::InvalidState("OTP not verified".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Notification("channel down".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
