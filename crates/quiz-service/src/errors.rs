//! Quiz Service error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::envelope::error_response;
use common::gate::GateError;
use thiserror::Error;

/// Quiz Service error type.
///
/// Maps to HTTP status codes:
/// - Database, Internal: 500 Internal Server Error
/// - InvalidToken, NotEnrolled: 401 Unauthorized
/// - NotFound: 404 Not Found
/// - BadRequest: 400 Bad Request
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Not enrolled in course")]
    NotEnrolled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl QuizError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QuizError::Database(_) | QuizError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            QuizError::InvalidToken(_) | QuizError::NotEnrolled => StatusCode::UNAUTHORIZED,
            QuizError::NotFound(_) => StatusCode::NOT_FOUND,
            QuizError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match self {
            QuizError::Database(err) => {
                tracing::error!(target: "quiz.database", error = %err, "Database operation failed");
                (
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            QuizError::InvalidToken(reason) => ("INVALID_TOKEN", reason),
            QuizError::NotEnrolled => (
                "NOT_ENROLLED",
                "User is not enrolled in this course".to_string(),
            ),
            QuizError::NotFound(resource) => ("NOT_FOUND", resource),
            QuizError::BadRequest(reason) => ("BAD_REQUEST", reason),
            QuizError::Internal => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        error_response(status, code, message)
    }
}

impl From<sqlx::Error> for QuizError {
    fn from(err: sqlx::Error) -> Self {
        QuizError::Database(err.to_string())
    }
}

impl From<GateError> for QuizError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::CourseNotFound => QuizError::NotFound("Course not found".to_string()),
            GateError::InvalidCredential => {
                QuizError::InvalidToken("The access token is invalid or expired".to_string())
            }
            GateError::NotEnrolled => QuizError::NotEnrolled,
        }
    }
}
