//! Course Service error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse` impl.
//! Error messages returned to clients are intentionally generic to avoid
//! leaking internal details. Actual errors are logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::envelope::error_response;
use common::jwt::JwtValidationError;
use thiserror::Error;

/// Course Service error type.
///
/// Maps to HTTP status codes:
/// - Database, Internal: 500 Internal Server Error
/// - InvalidToken: 401 Unauthorized
/// - NotFound: 404 Not Found
/// - Conflict: 409 Conflict
/// - BadRequest: 400 Bad Request
/// - ServiceUnavailable: 503 Service Unavailable
#[derive(Debug, Error)]
pub enum CourseError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl CourseError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CourseError::Database(_) | CourseError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            CourseError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            CourseError::NotFound(_) => StatusCode::NOT_FOUND,
            CourseError::Conflict(_) => StatusCode::CONFLICT,
            CourseError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CourseError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for CourseError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match self {
            CourseError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "course.database", error = %err, "Database operation failed");
                (
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            CourseError::InvalidToken(reason) => ("INVALID_TOKEN", reason),
            CourseError::NotFound(resource) => ("NOT_FOUND", resource),
            CourseError::Conflict(reason) => ("CONFLICT", reason),
            CourseError::BadRequest(reason) => ("BAD_REQUEST", reason),
            CourseError::ServiceUnavailable(reason) => {
                tracing::warn!(target: "course.availability", reason = %reason, "Service unavailable");
                (
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            CourseError::Internal => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        error_response(status, code, message)
    }
}

/// Convert sqlx errors to CourseError
impl From<sqlx::Error> for CourseError {
    fn from(err: sqlx::Error) -> Self {
        CourseError::Database(err.to_string())
    }
}

impl From<JwtValidationError> for CourseError {
    fn from(err: JwtValidationError) -> Self {
        CourseError::InvalidToken(err.to_string())
    }
}
