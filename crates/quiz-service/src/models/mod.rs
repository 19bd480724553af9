//! Data models for Quiz Service.
//!
//! Answer keys are stored with the quiz but never serialized to clients:
//! [`Quiz::into_view`] strips them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::{BTreeMap, HashSet};

/// Valid option labels.
pub const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Maximum questions per quiz.
pub const MAX_QUESTIONS: usize = 200;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// A multiple-choice question including its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_no: i32,
    pub question: String,
    /// Option label ("A".."D") to option text.
    pub options: BTreeMap<String, String>,
    pub answer: String,
}

/// A question as shown to quiz takers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub question_no: i32,
    pub question: String,
    pub options: BTreeMap<String, String>,
}

impl From<&Question> for PublicQuestion {
    fn from(question: &Question) -> Self {
        Self {
            question_no: question.question_no,
            question: question.question.clone(),
            options: question.options.clone(),
        }
    }
}

/// Quiz row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Quiz {
    pub quiz_id: i32,
    pub course_id: i32,
    pub description: String,
    pub questions: Json<Vec<Question>>,
    pub max_score: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Quiz as returned to clients, without answer keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizView {
    pub quiz_id: i32,
    pub course_id: i32,
    pub description: String,
    pub question_count: usize,
    pub questions: Vec<PublicQuestion>,
    pub max_score: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn into_view(self) -> QuizView {
        let questions: Vec<PublicQuestion> = self.questions.iter().map(PublicQuestion::from).collect();
        QuizView {
            quiz_id: self.quiz_id,
            course_id: self.course_id,
            description: self.description,
            question_count: questions.len(),
            questions,
            max_score: self.max_score,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// Quiz listing for one course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseQuizzes {
    pub course_id: i32,
    /// Course name from the course service; absent if the lookup failed.
    pub course_name: Option<String>,
    pub quizzes: Vec<QuizView>,
}

/// Request body for creating a quiz.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuizRequest {
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    /// Defaults to the number of questions.
    #[serde(default)]
    pub max_score: Option<f64>,
}

impl CreateQuizRequest {
    /// Check the question set. The message is safe to return to clients.
    pub fn validate(&self) -> Result<(), String> {
        if self.questions.is_empty() {
            return Err("A quiz needs at least one question".to_string());
        }
        if self.questions.len() > MAX_QUESTIONS {
            return Err(format!("A quiz may have at most {MAX_QUESTIONS} questions"));
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            let no = question.question_no;
            if !seen.insert(no) {
                return Err(format!("Duplicate question_no {no}"));
            }
            if question.question.trim().is_empty() {
                return Err(format!("Question {no} has no text"));
            }
            if question.options.is_empty() {
                return Err(format!("Question {no} has no options"));
            }
            if let Some(label) = question
                .options
                .keys()
                .find(|label| !OPTION_LABELS.contains(&label.as_str()))
            {
                return Err(format!("Question {no} has invalid option label '{label}'"));
            }
            if !question.options.contains_key(&question.answer) {
                return Err(format!(
                    "Question {no} answer must be one of its option labels"
                ));
            }
        }

        if let Some(max_score) = self.max_score {
            if !max_score.is_finite() || max_score <= 0.0 {
                return Err("max_score must be a positive number".to_string());
            }
        }

        Ok(())
    }

    /// `max_score` or, when absent, one point per question.
    #[allow(clippy::cast_precision_loss)]
    pub fn effective_max_score(&self) -> f64 {
        self.max_score.unwrap_or(self.questions.len() as f64)
    }
}

/// One answer in a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_no: i32,
    pub answer: String,
}

/// Request body for submitting answers.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: Vec<SubmittedAnswer>,
}

/// Submission row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Submission {
    pub submission_id: i32,
    pub quiz_id: i32,
    pub user_id: String,
    pub answers: Json<Vec<SubmittedAnswer>>,
    pub score: f64,
    pub submitted_at: DateTime<Utc>,
}

/// Submission as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionView {
    pub submission_id: i32,
    pub quiz_id: i32,
    pub user_id: String,
    pub answers: Vec<SubmittedAnswer>,
    pub score: f64,
    pub max_score: f64,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn into_view(self, max_score: f64) -> SubmissionView {
        SubmissionView {
            submission_id: self.submission_id,
            quiz_id: self.quiz_id,
            user_id: self.user_id,
            answers: self.answers.0,
            score: self.score,
            max_score,
            submitted_at: self.submitted_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn question(no: i32, answer: &str) -> Question {
        Question {
            question_no: no,
            question: format!("Question {no}?"),
            options: OPTION_LABELS
                .iter()
                .map(|label| ((*label).to_string(), format!("Option {label}")))
                .collect(),
            answer: answer.to_string(),
        }
    }

    fn request(questions: Vec<Question>) -> CreateQuizRequest {
        CreateQuizRequest {
            description: "Week 1".to_string(),
            questions,
            max_score: None,
        }
    }

    #[test]
    fn test_valid_quiz() {
        let request = request(vec![question(1, "A"), question(2, "D")]);
        assert!(request.validate().is_ok());
        assert!((request.effective_max_score() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_empty_and_duplicate_questions() {
        assert!(request(vec![]).validate().is_err());
        assert!(request(vec![question(1, "A"), question(1, "B")])
            .validate()
            .unwrap_err()
            .contains("Duplicate"));
    }

    #[test]
    fn test_rejects_answer_outside_options() {
        assert!(request(vec![question(1, "E")]).validate().is_err());

        let mut q = question(1, "C");
        q.options.remove("C");
        assert!(request(vec![q]).validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_option_label() {
        let mut q = question(1, "A");
        q.options.insert("Z".to_string(), "nope".to_string());
        assert!(request(vec![q]).validate().unwrap_err().contains("'Z'"));
    }

    #[test]
    fn test_rejects_non_positive_max_score() {
        let mut r = request(vec![question(1, "A")]);
        r.max_score = Some(0.0);
        assert!(r.validate().is_err());
        r.max_score = Some(10.0);
        assert!(r.validate().is_ok());
        assert!((r.effective_max_score() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_view_withholds_answers() {
        let quiz = Quiz {
            quiz_id: 1,
            course_id: 2,
            description: String::new(),
            questions: Json(vec![question(1, "B")]),
            max_score: 1.0,
            created_by: "prof".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(quiz.into_view()).unwrap();
        assert_eq!(json["question_count"], 1);
        assert!(json["questions"][0].get("answer").is_none());
        assert_eq!(json["questions"][0]["options"]["B"], "Option B");
    }
}
