//! Quiz handlers.

use crate::errors::QuizError;
use crate::handlers::{load_quiz, parse_id, parse_json_body};
use crate::models::{CourseQuizzes, CreateQuizRequest, Quiz, QuizView};
use crate::repositories::QuizzesRepository;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
};
use common::course_client::CourseCheck;
use common::envelope::ApiResponse;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /v1/courses/{course_id}/quizzes
///
/// Includes the course name from the course service. A failed name lookup
/// leaves `course_name` null rather than failing the listing.
#[instrument(skip_all, name = "quiz.quizzes.list", fields(course_id = %course_id))]
pub async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    headers: HeaderMap,
) -> Result<ApiResponse<CourseQuizzes>, QuizError> {
    let course_id = parse_id(&course_id, "course")?;
    state.gate.authorize_headers(course_id, &headers).await?;

    let (course_name, quizzes) = tokio::join!(
        state.gate.courses().course_name(course_id),
        QuizzesRepository::list(&state.pool, course_id)
    );

    Ok(ApiResponse::ok(
        "Quizzes retrieved successfully",
        CourseQuizzes {
            course_id,
            course_name,
            quizzes: quizzes?.into_iter().map(Quiz::into_view).collect(),
        },
    ))
}

/// Handler for POST /v1/courses/{course_id}/quizzes
#[instrument(skip_all, name = "quiz.quizzes.create", fields(course_id = %course_id))]
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<ApiResponse<QuizView>, QuizError> {
    let course_id = parse_id(&course_id, "course")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let request: CreateQuizRequest = parse_json_body(&body)?;
    request.validate().map_err(QuizError::BadRequest)?;

    let quiz = QuizzesRepository::create(
        &state.pool,
        course_id,
        request.description.trim(),
        &request.questions,
        request.effective_max_score(),
        &caller.user_id,
    )
    .await?;

    tracing::info!(
        target: "quiz.handlers.quizzes",
        course_id = course_id,
        quiz_id = quiz.quiz_id,
        questions = request.questions.len(),
        "Quiz created"
    );

    Ok(ApiResponse::created("Quiz created successfully", quiz.into_view()))
}

/// Handler for GET /v1/courses/{course_id}/quizzes/{quiz_id}
///
/// Answer keys are withheld.
#[instrument(skip_all, name = "quiz.quizzes.get", fields(course_id = %course_id, quiz_id = %quiz_id))]
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path((course_id, quiz_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<ApiResponse<QuizView>, QuizError> {
    let course_id = parse_id(&course_id, "course")?;
    let quiz_id = parse_id(&quiz_id, "quiz")?;
    state.gate.authorize_headers(course_id, &headers).await?;

    let quiz = load_quiz(&state.pool, course_id, quiz_id).await?;
    Ok(ApiResponse::ok("Quiz retrieved successfully", quiz.into_view()))
}
