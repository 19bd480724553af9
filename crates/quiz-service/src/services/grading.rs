//! Automatic grading of multiple-choice submissions.
//!
//! Each correctly answered question is worth `max_score / question_count`.
//! Answers to unknown question numbers are ignored, and only the first
//! answer to a question counts.

use crate::models::{Question, SubmittedAnswer};
use std::collections::{HashMap, HashSet};

/// Result of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    pub score: f64,
    pub correct: usize,
    pub total: usize,
}

/// Grade `answers` against the answer keys in `questions`.
#[allow(clippy::cast_precision_loss)]
pub fn grade(questions: &[Question], max_score: f64, answers: &[SubmittedAnswer]) -> Grade {
    let total = questions.len();
    if total == 0 {
        return Grade {
            score: 0.0,
            correct: 0,
            total,
        };
    }

    let keys: HashMap<i32, &str> = questions
        .iter()
        .map(|q| (q.question_no, q.answer.as_str()))
        .collect();

    let mut answered = HashSet::new();
    let correct = answers
        .iter()
        .filter(|a| keys.contains_key(&a.question_no) && answered.insert(a.question_no))
        .filter(|a| keys.get(&a.question_no) == Some(&a.answer.as_str()))
        .count();

    Grade {
        score: max_score / total as f64 * correct as f64,
        correct,
        total,
    }
}
