//! Enrollment handlers.

use crate::errors::CourseError;
use crate::handlers::{parse_course_id, parse_json_body};
use crate::models::{CourseEnrollments, EnrollUsersRequest, EnrollmentSummary, MAX_ENROLLMENT_BATCH};
use crate::repositories::{CoursesRepository, EnrollmentsRepository};
use crate::routes::AppState;
use crate::services;
use axum::{
    extract::{Path, State},
    Extension,
};
use common::envelope::ApiResponse;
use common::jwt::Claims;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /v1/courses/{course_id}/enrollments
#[instrument(skip_all, name = "course.enrollments.list", fields(course_id = %course_id))]
pub async fn list_enrollments(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
    Path(course_id): Path<String>,
) -> Result<ApiResponse<CourseEnrollments>, CourseError> {
    let course_id = parse_course_id(&course_id)?;

    if !CoursesRepository::exists(&state.pool, course_id).await? {
        return Err(CourseError::NotFound("Course not found".to_string()));
    }

    let user_ids = EnrollmentsRepository::list_for_course(&state.pool, course_id).await?;

    Ok(ApiResponse::ok(
        "Enrollments retrieved successfully",
        CourseEnrollments {
            course_id,
            user_ids,
        },
    ))
}

/// Handler for PUT /v1/courses/{course_id}/enrollments
///
/// Replaces the course's enrollment set with `user_ids`, except that the
/// caller is never removed.
///
/// # Response
///
/// - 200 OK with the added, removed and final enrolled user ids
/// - 400 Bad Request: invalid body or batch too large
/// - 404 Not Found: course does not exist
#[instrument(skip_all, name = "course.enrollments.replace", fields(course_id = %course_id))]
pub async fn replace_enrollments(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<ApiResponse<EnrollmentSummary>, CourseError> {
    let course_id = parse_course_id(&course_id)?;
    let request: EnrollUsersRequest = parse_json_body(&body)?;

    if request.user_ids.len() > MAX_ENROLLMENT_BATCH {
        return Err(CourseError::BadRequest(format!(
            "At most {MAX_ENROLLMENT_BATCH} users may be enrolled per request"
        )));
    }

    let summary =
        services::replace_enrollments(&state.pool, course_id, &request.user_ids, &claims.sub)
            .await?;

    Ok(ApiResponse::ok("Enrollments updated successfully", summary))
}
