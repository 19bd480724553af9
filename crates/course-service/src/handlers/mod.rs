//! HTTP request handlers for Course Service.

pub mod courses;
pub mod enrollments;
pub mod health;
pub mod metrics;

pub use courses::{create_course, delete_course, get_course, list_courses, update_course};
pub use enrollments::{list_enrollments, replace_enrollments};
pub use health::health_check;
pub use metrics::metrics_handler;

use crate::errors::CourseError;
use serde::de::DeserializeOwned;

/// Deserialize a JSON body, returning 400 (not Axum's default 422) on failure.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, CourseError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "course.handlers", error = %e, "Invalid request body");
        CourseError::BadRequest("Invalid request body".to_string())
    })
}

/// Parse a numeric path identifier, returning 400 on failure.
pub(crate) fn parse_course_id(raw: &str) -> Result<i32, CourseError> {
    raw.parse()
        .map_err(|_| CourseError::BadRequest("Invalid course id".to_string()))
}
