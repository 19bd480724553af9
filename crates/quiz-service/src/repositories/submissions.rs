//! Quiz submissions repository.

use crate::errors::QuizError;
use crate::models::{Submission, SubmittedAnswer};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

const SUBMISSION_COLUMNS: &str = "submission_id, quiz_id, user_id, answers, score, submitted_at";

pub struct SubmissionsRepository;

impl SubmissionsRepository {
    #[instrument(skip_all, name = "quiz.repo.record_submission", fields(quiz_id = quiz_id))]
    pub async fn record(
        pool: &PgPool,
        quiz_id: i32,
        user_id: &str,
        answers: &[SubmittedAnswer],
        score: f64,
    ) -> Result<Submission, QuizError> {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            r#"
            INSERT INTO quiz_submissions (quiz_id, user_id, answers, score)
            VALUES ($1, $2, $3, $4)
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(quiz_id)
        .bind(user_id)
        .bind(Json(answers))
        .bind(score)
        .fetch_one(pool)
        .await?;

        Ok(submission)
    }

    /// The caller's submissions for one quiz, newest first.
    #[instrument(skip_all, name = "quiz.repo.list_submissions", fields(quiz_id = quiz_id))]
    pub async fn list_for_user(
        pool: &PgPool,
        quiz_id: i32,
        user_id: &str,
    ) -> Result<Vec<Submission>, QuizError> {
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM quiz_submissions \
             WHERE quiz_id = $1 AND user_id = $2 \
             ORDER BY submitted_at DESC, submission_id DESC"
        ))
        .bind(quiz_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(submissions)
    }
}
