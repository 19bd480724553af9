//! Bulk enrollment with diff-and-replace semantics.
//!
//! Given the desired user set `D`, the enrolled set `E` and the caller `c`:
//!
//! ```text
//! to_add    = D \ E
//! to_remove = (E \ D) \ {c}
//! final     = (E \ to_remove) ∪ to_add
//! ```
//!
//! The caller can never remove themself. The whole replace runs in one
//! transaction holding a row lock on the course.

use crate::errors::CourseError;
use crate::models::EnrollmentSummary;
use crate::repositories::{CoursesRepository, EnrollmentsRepository};
use sqlx::PgPool;
use std::collections::BTreeSet;
use tracing::instrument;

/// Changes needed to move an enrollment set toward a desired set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentPlan {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl EnrollmentPlan {
    /// The enrollment set after applying this plan to `current`.
    pub fn apply(&self, current: &BTreeSet<String>) -> BTreeSet<String> {
        current
            .difference(&self.to_remove)
            .chain(self.to_add.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the diff between `current` and `desired` on behalf of `caller`.
///
/// Blank ids in `desired` are ignored and duplicates collapse.
pub fn plan_enrollment_changes(
    current: &BTreeSet<String>,
    desired: &[String],
    caller: &str,
) -> EnrollmentPlan {
    let desired: BTreeSet<String> = desired
        .iter()
        .map(|user_id| user_id.trim())
        .filter(|user_id| !user_id.is_empty())
        .map(str::to_string)
        .collect();

    let to_add = desired.difference(current).cloned().collect();
    let to_remove = current
        .difference(&desired)
        .filter(|user_id| user_id.as_str() != caller)
        .cloned()
        .collect();

    EnrollmentPlan { to_add, to_remove }
}

/// Replace the enrollments of `course_id` with `desired`.
///
/// # Errors
///
/// - `CourseError::NotFound` - course does not exist
/// - `CourseError::Database` - store failure (nothing is committed)
#[instrument(skip_all, name = "course.service.replace_enrollments", fields(course_id = course_id, desired = desired.len()))]
pub async fn replace_enrollments(
    pool: &PgPool,
    course_id: i32,
    desired: &[String],
    caller: &str,
) -> Result<EnrollmentSummary, CourseError> {
    let mut tx = pool.begin().await?;

    // Lock serializes concurrent replaces and keeps the course alive until commit
    if !CoursesRepository::lock(&mut *tx, course_id).await? {
        return Err(CourseError::NotFound("Course not found".to_string()));
    }

    let current: BTreeSet<String> = EnrollmentsRepository::list_for_course(&mut *tx, course_id)
        .await?
        .into_iter()
        .collect();

    let plan = plan_enrollment_changes(&current, desired, caller);
    let to_add: Vec<String> = plan.to_add.iter().cloned().collect();
    let to_remove: Vec<String> = plan.to_remove.iter().cloned().collect();

    EnrollmentsRepository::delete_many(&mut *tx, course_id, &to_remove).await?;
    EnrollmentsRepository::insert_many(&mut *tx, course_id, &to_add).await?;

    tx.commit().await?;

    tracing::info!(
        target: "course.service.enrollment",
        course_id = course_id,
        added = to_add.len(),
        removed = to_remove.len(),
        "Enrollments replaced"
    );

    Ok(EnrollmentSummary {
        course_id,
        enrolled: plan.apply(&current).into_iter().collect(),
        added: to_add,
        removed: to_remove,
    })
}
