//! Course CRUD handlers.
//!
//! Reads are public. Mutations require a verified bearer credential; the
//! caller's `sub` is recorded as `created_by` / `updated_by`.

use crate::errors::CourseError;
use crate::handlers::{parse_course_id, parse_json_body};
use crate::models::{Course, CreateCourseRequest, UpdateCourseRequest};
use crate::repositories::CoursesRepository;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use common::envelope::ApiResponse;
use common::jwt::Claims;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /v1/courses
#[instrument(skip_all, name = "course.courses.list")]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<Course>>, CourseError> {
    let courses = CoursesRepository::list(&state.pool).await?;
    Ok(ApiResponse::ok("Courses retrieved successfully", courses))
}

/// Handler for GET /v1/courses/{course_id}
#[instrument(skip_all, name = "course.courses.get", fields(course_id = %course_id))]
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
) -> Result<ApiResponse<Course>, CourseError> {
    let course_id = parse_course_id(&course_id)?;

    let course = CoursesRepository::get(&state.pool, course_id)
        .await?
        .ok_or_else(|| CourseError::NotFound("Course not found".to_string()))?;

    Ok(ApiResponse::ok("Course retrieved successfully", course))
}

/// Handler for POST /v1/courses
///
/// # Response
///
/// - 201 Created with the stored course
/// - 400 Bad Request: invalid body or field constraints
/// - 409 Conflict: course code already exists
#[instrument(skip_all, name = "course.courses.create")]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    body: axum::body::Bytes,
) -> Result<ApiResponse<Course>, CourseError> {
    let request: CreateCourseRequest = parse_json_body(&body)?;
    request.validate().map_err(CourseError::BadRequest)?;

    let course = CoursesRepository::create(
        &state.pool,
        request.course_code.trim(),
        request.course_name.trim(),
        request.course_description.trim(),
        &claims.sub,
    )
    .await?;

    tracing::info!(
        target: "course.handlers.courses",
        course_id = course.course_id,
        course_code = %course.course_code,
        "Course created"
    );

    Ok(ApiResponse::created("Course created successfully", course))
}

/// Handler for PUT /v1/courses/{course_id}
///
/// Partial update. Fields absent from the body are left unchanged.
#[instrument(skip_all, name = "course.courses.update", fields(course_id = %course_id))]
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<ApiResponse<Course>, CourseError> {
    let course_id = parse_course_id(&course_id)?;
    let request: UpdateCourseRequest = parse_json_body(&body)?;
    request.validate().map_err(CourseError::BadRequest)?;

    let course = CoursesRepository::update(
        &state.pool,
        course_id,
        request.course_code.as_deref().map(str::trim),
        request.course_name.as_deref().map(str::trim),
        request.course_description.as_deref().map(str::trim),
        &claims.sub,
    )
    .await?
    .ok_or_else(|| CourseError::NotFound("Course not found".to_string()))?;

    Ok(ApiResponse::ok("Course updated successfully", course))
}

/// Handler for DELETE /v1/courses/{course_id}
///
/// Removes the course and its enrollments atomically. Returns 204.
#[instrument(skip_all, name = "course.courses.delete", fields(course_id = %course_id))]
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
    Path(course_id): Path<String>,
) -> Result<StatusCode, CourseError> {
    let course_id = parse_course_id(&course_id)?;

    if !CoursesRepository::delete(&state.pool, course_id).await? {
        return Err(CourseError::NotFound("Course not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
