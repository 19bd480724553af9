//! Data models for Course Service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum course code length in characters.
pub const MAX_COURSE_CODE_LENGTH: usize = 32;

/// Maximum course name length in characters.
pub const MAX_COURSE_NAME_LENGTH: usize = 255;

/// Maximum number of users in a single bulk enrollment request.
pub const MAX_ENROLLMENT_BATCH: usize = 5000;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status ("healthy" or "unhealthy").
    pub status: String,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Course row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub course_id: i32,
    pub course_code: String,
    pub course_name: String,
    pub course_description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /v1/courses`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub course_name: String,
    #[serde(default)]
    pub course_description: String,
}

/// Request body for `PUT /v1/courses/{course_id}`.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub course_description: Option<String>,
}

fn validate_code(code: &str) -> Result<(), String> {
    let code = code.trim();
    if code.is_empty() {
        return Err("course_code must not be empty".to_string());
    }
    if code.chars().count() > MAX_COURSE_CODE_LENGTH {
        return Err(format!(
            "course_code must be at most {MAX_COURSE_CODE_LENGTH} characters"
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("course_name must not be empty".to_string());
    }
    if name.chars().count() > MAX_COURSE_NAME_LENGTH {
        return Err(format!(
            "course_name must be at most {MAX_COURSE_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

impl CreateCourseRequest {
    /// Check field constraints. The message is safe to return to clients.
    pub fn validate(&self) -> Result<(), String> {
        validate_code(&self.course_code)?;
        validate_name(&self.course_name)
    }
}

impl UpdateCourseRequest {
    /// Check constraints on the fields that are present.
    pub fn validate(&self) -> Result<(), String> {
        if self.course_code.is_none()
            && self.course_name.is_none()
            && self.course_description.is_none()
        {
            return Err("At least one field must be provided".to_string());
        }
        if let Some(code) = &self.course_code {
            validate_code(code)?;
        }
        if let Some(name) = &self.course_name {
            validate_name(name)?;
        }
        Ok(())
    }
}

/// Request body for `PUT /v1/courses/{course_id}/enrollments`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollUsersRequest {
    pub user_ids: Vec<String>,
}

/// Result of a bulk enrollment replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentSummary {
    pub course_id: i32,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub enrolled: Vec<String>,
}

/// Enrolled users of one course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseEnrollments {
    pub course_id: i32,
    pub user_ids: Vec<String>,
}
