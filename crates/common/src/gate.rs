//! Authorization gate for course-scoped operations.
//!
//! Every protected action in a dependent service runs through
//! [`AuthorizationGate::authorize`] before touching its own store:
//!
//! 1. The course must exist (`CheckValidity`), otherwise 404.
//! 2. The bearer credential must verify and carry a subject, otherwise 401.
//! 3. The subject must be enrolled (`CheckEnrollment`), otherwise 401.
//!
//! The order is fixed. An invalid course never triggers an enrollment lookup.
//! Because the course client fails closed, an unreachable course service
//! rejects the request with the same errors as a negative answer.

use crate::course_client::CourseCheck;
use crate::jwt::{bearer_token, CredentialDecoder};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Rejections produced by the gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// The course does not exist (or validity could not be confirmed).
    #[error("Course not found")]
    CourseNotFound,

    /// Missing, malformed or unverifiable bearer credential.
    #[error("Invalid or missing credential")]
    InvalidCredential,

    /// The caller is not enrolled in the course.
    #[error("User is not enrolled in this course")]
    NotEnrolled,
}

/// Identity established by a successful gate pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedCaller {
    pub user_id: String,
    pub course_id: i32,
}

/// Validity-then-enrollment gate shared by dependent service handlers.
#[derive(Clone)]
pub struct AuthorizationGate {
    courses: Arc<dyn CourseCheck>,
    decoder: Arc<CredentialDecoder>,
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

impl AuthorizationGate {
    pub fn new(courses: Arc<dyn CourseCheck>, decoder: Arc<CredentialDecoder>) -> Self {
        Self { courses, decoder }
    }

    /// The course lookups backing this gate.
    #[must_use]
    pub fn courses(&self) -> &Arc<dyn CourseCheck> {
        &self.courses
    }

    /// Authorize the caller presenting `authorization` for `course_id`.
    ///
    /// `authorization` is the raw `Authorization` header value, if any.
    ///
    /// # Errors
    ///
    /// - `GateError::CourseNotFound` - course is not valid
    /// - `GateError::InvalidCredential` - header missing or credential rejected
    /// - `GateError::NotEnrolled` - caller is not enrolled
    #[instrument(skip_all, name = "gate.authorize", fields(course_id = course_id))]
    pub async fn authorize(
        &self,
        course_id: i32,
        authorization: Option<&str>,
    ) -> Result<AuthorizedCaller, GateError> {
        if !self.courses.check_validity(course_id).await {
            debug!(target: "common.gate", course_id = course_id, "Rejected: course not valid");
            return Err(GateError::CourseNotFound);
        }

        let token = authorization.and_then(bearer_token).ok_or_else(|| {
            debug!(target: "common.gate", "Rejected: missing or malformed Authorization header");
            GateError::InvalidCredential
        })?;

        let claims = self.decoder.decode(token).map_err(|e| {
            debug!(target: "common.gate", error = ?e, "Rejected: credential did not verify");
            GateError::InvalidCredential
        })?;

        if !self.courses.check_enrollment(&claims.sub, course_id).await {
            debug!(target: "common.gate", course_id = course_id, "Rejected: caller not enrolled");
            return Err(GateError::NotEnrolled);
        }

        Ok(AuthorizedCaller {
            user_id: claims.sub,
            course_id,
        })
    }

    /// Convenience wrapper reading the `Authorization` header from `headers`.
    ///
    /// # Errors
    ///
    /// See [`AuthorizationGate::authorize`].
    pub async fn authorize_headers(
        &self,
        course_id: i32,
        headers: &HeaderMap,
    ) -> Result<AuthorizedCaller, GateError> {
        self.authorize(course_id, authorization_header(headers))
            .await
    }
}

/// The `Authorization` header value, if present and valid UTF-8.
#[must_use]
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}
