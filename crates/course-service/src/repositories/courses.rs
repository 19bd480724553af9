//! Courses repository for database operations.
//!
//! Course validity is a pure existence check on `course_id`.
//!
//! # Security
//!
//! - All queries use parameterized statements (SQL injection safe)

use crate::errors::CourseError;
use crate::models::Course;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;

const COURSE_COLUMNS: &str = "course_id, course_code, course_name, course_description, \
     created_by, created_at, updated_by, updated_at";

/// Courses repository for database operations.
pub struct CoursesRepository;

impl CoursesRepository {
    /// List all courses ordered by id.
    #[instrument(skip_all, name = "course.repo.list_courses")]
    pub async fn list(pool: &PgPool) -> Result<Vec<Course>, CourseError> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY course_id"
        ))
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }

    /// Fetch one course.
    #[instrument(skip_all, name = "course.repo.get_course", fields(course_id = course_id))]
    pub async fn get(pool: &PgPool, course_id: i32) -> Result<Option<Course>, CourseError> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = $1"
        ))
        .bind(course_id)
        .fetch_optional(pool)
        .await?;

        Ok(course)
    }

    /// Whether a course row exists.
    #[instrument(skip_all, name = "course.repo.course_exists", fields(course_id = course_id))]
    pub async fn exists<'e, E>(executor: E, course_id: i32) -> Result<bool, CourseError>
    where
        E: PgExecutor<'e>,
    {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM courses WHERE course_id = $1)")
                .bind(course_id)
                .fetch_one(executor)
                .await?;

        Ok(exists)
    }

    /// The stored course name, if the course exists.
    #[instrument(skip_all, name = "course.repo.course_name", fields(course_id = course_id))]
    pub async fn name(pool: &PgPool, course_id: i32) -> Result<Option<String>, CourseError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT course_name FROM courses WHERE course_id = $1")
                .bind(course_id)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|(name,)| name))
    }

    /// Lock a course row for the rest of the transaction.
    ///
    /// Returns `false` if the course does not exist.
    pub async fn lock<'e, E>(executor: E, course_id: i32) -> Result<bool, CourseError>
    where
        E: PgExecutor<'e>,
    {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT course_id FROM courses WHERE course_id = $1 FOR UPDATE")
                .bind(course_id)
                .fetch_optional(executor)
                .await?;

        Ok(row.is_some())
    }

    /// Insert a course.
    ///
    /// # Errors
    ///
    /// - `CourseError::Conflict` - course code already taken
    #[instrument(skip_all, name = "course.repo.create_course")]
    pub async fn create(
        pool: &PgPool,
        course_code: &str,
        course_name: &str,
        course_description: &str,
        created_by: &str,
    ) -> Result<Course, CourseError> {
        sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO courses (course_code, course_name, course_description, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(course_code)
        .bind(course_name)
        .bind(course_description)
        .bind(created_by)
        .fetch_one(pool)
        .await
        .map_err(map_write_error)
    }

    /// Apply a partial update. `None` fields keep their stored value.
    ///
    /// Returns `None` if the course does not exist.
    #[instrument(skip_all, name = "course.repo.update_course", fields(course_id = course_id))]
    pub async fn update(
        pool: &PgPool,
        course_id: i32,
        course_code: Option<&str>,
        course_name: Option<&str>,
        course_description: Option<&str>,
        updated_by: &str,
    ) -> Result<Option<Course>, CourseError> {
        sqlx::query_as::<_, Course>(&format!(
            r#"
            UPDATE courses
            SET course_code = COALESCE($2, course_code),
                course_name = COALESCE($3, course_name),
                course_description = COALESCE($4, course_description),
                updated_by = $5,
                updated_at = NOW()
            WHERE course_id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(course_id)
        .bind(course_code)
        .bind(course_name)
        .bind(course_description)
        .bind(updated_by)
        .fetch_optional(pool)
        .await
        .map_err(map_write_error)
    }

    /// Delete a course and all of its enrollments in one transaction.
    ///
    /// Returns `false` if the course does not exist.
    #[instrument(skip_all, name = "course.repo.delete_course", fields(course_id = course_id))]
    pub async fn delete(pool: &PgPool, course_id: i32) -> Result<bool, CourseError> {
        let mut tx = pool.begin().await?;

        if !Self::lock(&mut *tx, course_id).await? {
            return Ok(false);
        }

        let enrollments = sqlx::query("DELETE FROM course_enrollments WHERE course_id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM courses WHERE course_id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            target: "course.repo.courses",
            course_id = course_id,
            enrollments_removed = enrollments.rows_affected(),
            "Course deleted"
        );

        Ok(true)
    }
}

/// Map insert/update failures, surfacing unique violations as conflicts.
fn map_write_error(err: sqlx::Error) -> CourseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return CourseError::Conflict("Course code already exists".to_string());
        }
    }
    CourseError::Database(err.to_string())
}
