//! Quizzes repository.

use crate::errors::QuizError;
use crate::models::{Question, Quiz};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

const QUIZ_COLUMNS: &str =
    "quiz_id, course_id, description, questions, max_score, created_by, created_at";

pub struct QuizzesRepository;

impl QuizzesRepository {
    #[instrument(skip_all, name = "quiz.repo.list_quizzes", fields(course_id = course_id))]
    pub async fn list(pool: &PgPool, course_id: i32) -> Result<Vec<Quiz>, QuizError> {
        let quizzes = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE course_id = $1 ORDER BY quiz_id"
        ))
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        Ok(quizzes)
    }

    /// Fetch a quiz of `course_id`. A quiz of another course reads as absent.
    #[instrument(skip_all, name = "quiz.repo.get_quiz", fields(quiz_id = quiz_id))]
    pub async fn get(pool: &PgPool, course_id: i32, quiz_id: i32) -> Result<Option<Quiz>, QuizError> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE course_id = $1 AND quiz_id = $2"
        ))
        .bind(course_id)
        .bind(quiz_id)
        .fetch_optional(pool)
        .await?;

        Ok(quiz)
    }

    #[instrument(skip_all, name = "quiz.repo.create_quiz", fields(course_id = course_id))]
    pub async fn create(
        pool: &PgPool,
        course_id: i32,
        description: &str,
        questions: &[Question],
        max_score: f64,
        created_by: &str,
    ) -> Result<Quiz, QuizError> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            r#"
            INSERT INTO quizzes (course_id, description, questions, max_score, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(course_id)
        .bind(description)
        .bind(Json(questions))
        .bind(max_score)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(quiz)
    }
}
