//! Data models for Forum Service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum post title length in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum post or comment body length in characters.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Discussion post with its net vote count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub post_id: i32,
    pub course_id: i32,
    pub title: String,
    pub content: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub vote_count: i64,
}

/// Comment on a post with its net vote count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub comment_id: i32,
    pub post_id: i32,
    pub reply_to: Option<i32>,
    pub content: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub vote_count: i64,
}

/// Request body for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// Request body for editing a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Request body for creating a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default)]
    pub reply_to: Option<i32>,
}

/// Request body for editing a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// Request body for voting. `0` clears the caller's vote.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VoteRequest {
    pub value: i16,
}

/// Net vote count after a vote was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSummary {
    pub vote_count: i64,
    pub your_vote: i16,
}

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_text("title", &self.title, MAX_TITLE_LENGTH)?;
        validate_text("content", &self.content, MAX_CONTENT_LENGTH)
    }
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_none() && self.content.is_none() {
            return Err("At least one field must be provided".to_string());
        }
        if let Some(title) = &self.title {
            validate_text("title", title, MAX_TITLE_LENGTH)?;
        }
        if let Some(content) = &self.content {
            validate_text("content", content, MAX_CONTENT_LENGTH)?;
        }
        Ok(())
    }
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_text("content", &self.content, MAX_CONTENT_LENGTH)
    }
}

impl UpdateCommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_text("content", &self.content, MAX_CONTENT_LENGTH)
    }
}

impl VoteRequest {
    pub fn validate(self) -> Result<(), String> {
        if matches!(self.value, -1..=1) {
            Ok(())
        } else {
            Err("value must be 1, -1 or 0".to_string())
        }
    }
}
