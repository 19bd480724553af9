//! Quiz submission handlers.

use crate::errors::QuizError;
use crate::handlers::{load_quiz, parse_id, parse_json_body};
use crate::models::{Submission, SubmissionView, SubmitQuizRequest};
use crate::repositories::SubmissionsRepository;
use crate::routes::AppState;
use crate::services::grade;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
};
use common::envelope::ApiResponse;
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /v1/courses/{course_id}/quizzes/{quiz_id}/submissions
///
/// Grades the answers against the stored keys and records the attempt.
#[instrument(skip_all, name = "quiz.submissions.submit", fields(course_id = %course_id, quiz_id = %quiz_id))]
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Path((course_id, quiz_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<ApiResponse<SubmissionView>, QuizError> {
    let course_id = parse_id(&course_id, "course")?;
    let quiz_id = parse_id(&quiz_id, "quiz")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let request: SubmitQuizRequest = parse_json_body(&body)?;
    let quiz = load_quiz(&state.pool, course_id, quiz_id).await?;

    let result = grade(&quiz.questions, quiz.max_score, &request.answers);

    let submission = SubmissionsRepository::record(
        &state.pool,
        quiz_id,
        &caller.user_id,
        &request.answers,
        result.score,
    )
    .await?;

    metrics::counter!("quiz_submissions_total").increment(1);
    tracing::debug!(
        target: "quiz.handlers.submissions",
        quiz_id = quiz_id,
        correct = result.correct,
        total = result.total,
        "Submission graded"
    );

    Ok(ApiResponse::created(
        "Submission recorded",
        submission.into_view(quiz.max_score),
    ))
}

/// Handler for GET /v1/courses/{course_id}/quizzes/{quiz_id}/submissions
///
/// Only the caller's own submissions are returned.
#[instrument(skip_all, name = "quiz.submissions.list", fields(course_id = %course_id, quiz_id = %quiz_id))]
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Path((course_id, quiz_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<ApiResponse<Vec<SubmissionView>>, QuizError> {
    let course_id = parse_id(&course_id, "course")?;
    let quiz_id = parse_id(&quiz_id, "quiz")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let quiz = load_quiz(&state.pool, course_id, quiz_id).await?;
    let submissions =
        SubmissionsRepository::list_for_user(&state.pool, quiz_id, &caller.user_id).await?;

    Ok(ApiResponse::ok(
        "Submissions retrieved successfully",
        submissions
            .into_iter()
            .map(|s: Submission| s.into_view(quiz.max_score))
            .collect(),
    ))
}
