//! HTTP request handlers for Quiz Service.

pub mod health;
pub mod metrics;
pub mod quizzes;
pub mod submissions;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use quizzes::{create_quiz, get_quiz, list_quizzes};
pub use submissions::{list_submissions, submit_quiz};

use crate::errors::QuizError;
use crate::models::Quiz;
use crate::repositories::QuizzesRepository;
use serde::de::DeserializeOwned;
use sqlx::PgPool;

/// Deserialize a JSON body, returning 400 (not Axum's default 422) on failure.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, QuizError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "quiz.handlers", error = %e, "Invalid request body");
        QuizError::BadRequest("Invalid request body".to_string())
    })
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i32, QuizError> {
    raw.parse()
        .map_err(|_| QuizError::BadRequest(format!("Invalid {what} id")))
}

pub(crate) async fn load_quiz(pool: &PgPool, course_id: i32, quiz_id: i32) -> Result<Quiz, QuizError> {
    QuizzesRepository::get(pool, course_id, quiz_id)
        .await?
        .ok_or_else(|| QuizError::NotFound("Quiz not found".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::SubmitQuizRequest;

    #[test]
    fn test_parse_json_body() {
        let request: SubmitQuizRequest =
            parse_json_body(br#"{"answers":[{"question_no":1,"answer":"A"}]}"#).unwrap();
        assert_eq!(request.answers.len(), 1);

        let result: Result<SubmitQuizRequest, _> = parse_json_body(b"[]");
        assert!(matches!(result, Err(QuizError::BadRequest(_))));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("3", "quiz").unwrap(), 3);
        assert!(parse_id("", "quiz").is_err());
    }
}
