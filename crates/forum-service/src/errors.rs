//! Forum Service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Database
//! details are logged server-side and never returned to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::envelope::error_response;
use common::gate::GateError;
use thiserror::Error;

/// Forum Service error type.
///
/// Maps to HTTP status codes:
/// - Database, Internal: 500 Internal Server Error
/// - InvalidToken, NotEnrolled: 401 Unauthorized
/// - Forbidden: 403 Forbidden
/// - NotFound: 404 Not Found
/// - BadRequest: 400 Bad Request
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Not enrolled in course")]
    NotEnrolled,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl ForumError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForumError::Database(_) | ForumError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ForumError::InvalidToken(_) | ForumError::NotEnrolled => StatusCode::UNAUTHORIZED,
            ForumError::Forbidden(_) => StatusCode::FORBIDDEN,
            ForumError::NotFound(_) => StatusCode::NOT_FOUND,
            ForumError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ForumError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match self {
            ForumError::Database(err) => {
                tracing::error!(target: "forum.database", error = %err, "Database operation failed");
                (
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            ForumError::InvalidToken(reason) => ("INVALID_TOKEN", reason),
            ForumError::NotEnrolled => (
                "NOT_ENROLLED",
                "User is not enrolled in this course".to_string(),
            ),
            ForumError::Forbidden(reason) => ("FORBIDDEN", reason),
            ForumError::NotFound(resource) => ("NOT_FOUND", resource),
            ForumError::BadRequest(reason) => ("BAD_REQUEST", reason),
            ForumError::Internal => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        error_response(status, code, message)
    }
}

impl From<sqlx::Error> for ForumError {
    fn from(err: sqlx::Error) -> Self {
        ForumError::Database(err.to_string())
    }
}

impl From<GateError> for ForumError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::CourseNotFound => ForumError::NotFound("Course not found".to_string()),
            GateError::InvalidCredential => {
                ForumError::InvalidToken("The access token is invalid or expired".to_string())
            }
            GateError::NotEnrolled => ForumError::NotEnrolled,
        }
    }
}
