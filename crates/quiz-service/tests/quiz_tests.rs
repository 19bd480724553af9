//! Quiz API tests.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use common::course_client::mock::MockCourseCheck;
use coursework_test_utils::{mint_token, TestQuizServer};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;

const COURSE: i32 = 3;

fn authority() -> Arc<MockCourseCheck> {
    Arc::new(
        MockCourseCheck::new()
            .with_course(COURSE, "Linear Algebra")
            .with_enrollment("prof", COURSE)
            .with_enrollment("student", COURSE),
    )
}

fn options() -> Value {
    json!({ "A": "1", "B": "2", "C": "3", "D": "4" })
}

fn four_question_quiz(max_score: Option<f64>) -> Value {
    let mut body = json!({
        "description": "Warm-up",
        "questions": [
            { "question_no": 1, "question": "1+0?", "options": options(), "answer": "A" },
            { "question_no": 2, "question": "1+1?", "options": options(), "answer": "B" },
            { "question_no": 3, "question": "1+2?", "options": options(), "answer": "C" },
            { "question_no": 4, "question": "2+2?", "options": options(), "answer": "D" }
        ]
    });
    if let Some(max_score) = max_score {
        body["max_score"] = json!(max_score);
    }
    body
}

async fn create_quiz(server: &TestQuizServer, body: &Value) -> Result<i64> {
    let response = reqwest::Client::new()
        .post(server.quizzes_url(COURSE))
        .bearer_auth(mint_token("prof"))
        .json(body)
        .send()
        .await?;
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await?;
    Ok(created["data"]["quiz_id"].as_i64().unwrap())
}

#[sqlx::test(migrations = "../../migrations/quiz")]
async fn test_list_includes_course_name(pool: PgPool) -> Result<()> {
    let courses = authority();
    let server = TestQuizServer::spawn(pool, courses.clone()).await?;
    create_quiz(&server, &four_question_quiz(None)).await?;

    let body: Value = reqwest::Client::new()
        .get(server.quizzes_url(COURSE))
        .bearer_auth(mint_token("student"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["data"]["course_id"], COURSE);
    assert_eq!(body["data"]["course_name"], "Linear Algebra");
    assert_eq!(body["data"]["quizzes"].as_array().unwrap().len(), 1);
    assert_eq!(courses.name_calls(), 1);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations/quiz")]
async fn test_get_withholds_answer_keys(pool: PgPool) -> Result<()> {
    let server = TestQuizServer::spawn(pool, authority()).await?;
    let quiz_id = create_quiz(&server, &four_question_quiz(None)).await?;

    let body: Value = reqwest::Client::new()
        .get(format!("{}/{}", server.quizzes_url(COURSE), quiz_id))
        .bearer_auth(mint_token("student"))
        .send()
        .await?
        .json()
        .await?;

    let questions = body["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 4);
    assert!(questions.iter().all(|q| q.get("answer").is_none()));
    assert_eq!(body["data"]["max_score"], 4.0);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations/quiz")]
async fn test_submission_is_graded_and_listed(pool: PgPool) -> Result<()> {
    let server = TestQuizServer::spawn(pool, authority()).await?;
    let client = reqwest::Client::new();
    let quiz_id = create_quiz(&server, &four_question_quiz(Some(20.0))).await?;
    let submissions_url = format!("{}/{}/submissions", server.quizzes_url(COURSE), quiz_id);

    let response = client
        .post(&submissions_url)
        .bearer_auth(mint_token("student"))
        .json(&json!({
            "answers": [
                { "question_no": 1, "answer": "A" },
                { "question_no": 2, "answer": "B" },
                { "question_no": 2, "answer": "B" },
                { "question_no": 3, "answer": "D" },
                { "question_no": 9, "answer": "A" }
            ]
        }))
        .send()
        .await?;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await?;
    assert_eq!(body["data"]["score"], 10.0);
    assert_eq!(body["data"]["max_score"], 20.0);
    assert_eq!(body["data"]["user_id"], "student");

    // Another user's attempt is not visible to the student
    client
        .post(&submissions_url)
        .bearer_auth(mint_token("prof"))
        .json(&json!({ "answers": [] }))
        .send()
        .await?;

    let body: Value = client
        .get(&submissions_url)
        .bearer_auth(mint_token("student"))
        .send()
        .await?
        .json()
        .await?;
    let mine = body["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine.first().unwrap()["score"], 10.0);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations/quiz")]
async fn test_invalid_quiz_is_bad_request(pool: PgPool) -> Result<()> {
    let server = TestQuizServer::spawn(pool, authority()).await?;

    let response = reqwest::Client::new()
        .post(server.quizzes_url(COURSE))
        .bearer_auth(mint_token("prof"))
        .json(&json!({
            "questions": [
                { "question_no": 1, "question": "?", "options": options(), "answer": "E" }
            ]
        }))
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations/quiz")]
async fn test_gate_rejections(pool: PgPool) -> Result<()> {
    let courses = authority();
    let server = TestQuizServer::spawn(pool, courses.clone()).await?;
    let client = reqwest::Client::new();

    // Unknown course: 404 before any credential or enrollment check
    let response = client.get(server.quizzes_url(42)).send().await?;
    assert_eq!(response.status(), 404);
    assert_eq!(courses.enrollment_calls(), 0);

    let response = client.get(server.quizzes_url(COURSE)).send().await?;
    assert_eq!(response.status(), 401);

    let response = client
        .get(server.quizzes_url(COURSE))
        .bearer_auth(mint_token("outsider"))
        .send()
        .await?;
    assert_eq!(response.status(), 401);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations/quiz")]
async fn test_quiz_of_other_course_is_not_found(pool: PgPool) -> Result<()> {
    let courses = Arc::new(
        MockCourseCheck::new()
            .with_course(COURSE, "Linear Algebra")
            .with_course(4, "Calculus")
            .with_enrollment("prof", COURSE)
            .with_enrollment("prof", 4),
    );
    let server = TestQuizServer::spawn(pool, courses).await?;
    let quiz_id = create_quiz(&server, &four_question_quiz(None)).await?;

    let response = reqwest::Client::new()
        .get(format!("{}/{}", server.quizzes_url(4), quiz_id))
        .bearer_auth(mint_token("prof"))
        .send()
        .await?;
    assert_eq!(response.status(), 404);
    Ok(())
}
