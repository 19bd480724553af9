//! Enrollment records.
//!
//! The existence of a `(user_id, course_id)` row means the user is enrolled.
//! There is no status, role or expiry.

use crate::errors::CourseError;
use sqlx::PgExecutor;
use tracing::instrument;

/// Enrollment repository for database operations.
pub struct EnrollmentsRepository;

impl EnrollmentsRepository {
    /// Whether `user_id` is enrolled in `course_id`.
    ///
    /// A nonexistent course or user is simply `false`.
    #[instrument(skip_all, name = "course.repo.is_enrolled", fields(course_id = course_id))]
    pub async fn is_enrolled<'e, E>(
        executor: E,
        user_id: &str,
        course_id: i32,
    ) -> Result<bool, CourseError>
    where
        E: PgExecutor<'e>,
    {
        let (enrolled,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM course_enrollments
                WHERE user_id = $1 AND course_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(executor)
        .await?;

        Ok(enrolled)
    }

    /// User ids enrolled in `course_id`, sorted.
    #[instrument(skip_all, name = "course.repo.list_enrollments", fields(course_id = course_id))]
    pub async fn list_for_course<'e, E>(
        executor: E,
        course_id: i32,
    ) -> Result<Vec<String>, CourseError>
    where
        E: PgExecutor<'e>,
    {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM course_enrollments WHERE course_id = $1 ORDER BY user_id",
        )
        .bind(course_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(user_id,)| user_id).collect())
    }

    /// Insert enrollments, skipping pairs that already exist.
    ///
    /// The caller must have verified that the course exists.
    pub async fn insert_many<'e, E>(
        executor: E,
        course_id: i32,
        user_ids: &[String],
    ) -> Result<u64, CourseError>
    where
        E: PgExecutor<'e>,
    {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO course_enrollments (user_id, course_id)
            SELECT user_id, $1 FROM UNNEST($2::text[]) AS t(user_id)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(course_id)
        .bind(user_ids)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete the given enrollments of `course_id`.
    pub async fn delete_many<'e, E>(
        executor: E,
        course_id: i32,
        user_ids: &[String],
    ) -> Result<u64, CourseError>
    where
        E: PgExecutor<'e>,
    {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "DELETE FROM course_enrollments WHERE course_id = $1 AND user_id = ANY($2)",
        )
        .bind(course_id)
        .bind(user_ids)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
