//! Comment handlers.
//!
//! Comments live under a post; the post must belong to the gated course.

use crate::errors::ForumError;
use crate::handlers::{ensure_author, load_post, parse_id, parse_json_body};
use crate::models::{Comment, CreateCommentRequest, UpdateCommentRequest, VoteRequest, VoteSummary};
use crate::repositories::{CommentsRepository, VoteTarget, VotesRepository};
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use common::envelope::ApiResponse;
use std::sync::Arc;
use tracing::instrument;

fn comment_not_found() -> ForumError {
    ForumError::NotFound("Comment not found".to_string())
}

/// Handler for GET /v1/courses/{course_id}/discussions/{post_id}/comments
#[instrument(skip_all, name = "forum.comments.list", fields(course_id = %course_id, post_id = %post_id))]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<ApiResponse<Vec<Comment>>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    state.gate.authorize_headers(course_id, &headers).await?;

    load_post(&state.pool, course_id, post_id).await?;

    let comments = CommentsRepository::list(&state.pool, post_id).await?;
    Ok(ApiResponse::ok("Comments retrieved successfully", comments))
}

/// Handler for POST /v1/courses/{course_id}/discussions/{post_id}/comments
///
/// `reply_to`, when present, must name a comment of the same post.
#[instrument(skip_all, name = "forum.comments.create", fields(course_id = %course_id, post_id = %post_id))]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<ApiResponse<Comment>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let request: CreateCommentRequest = parse_json_body(&body)?;
    request.validate().map_err(ForumError::BadRequest)?;

    load_post(&state.pool, course_id, post_id).await?;

    if let Some(parent) = request.reply_to {
        if CommentsRepository::get(&state.pool, post_id, parent)
            .await?
            .is_none()
        {
            return Err(ForumError::BadRequest(
                "reply_to must reference a comment on the same post".to_string(),
            ));
        }
    }

    let comment = CommentsRepository::create(
        &state.pool,
        post_id,
        request.reply_to,
        &request.content,
        &caller.user_id,
    )
    .await?;

    Ok(ApiResponse::created("Comment created successfully", comment))
}

/// Handler for PUT /v1/courses/{course_id}/discussions/{post_id}/comments/{comment_id}
#[instrument(skip_all, name = "forum.comments.update", fields(post_id = %post_id, comment_id = %comment_id))]
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id, comment_id)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<ApiResponse<Comment>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    let comment_id = parse_id(&comment_id, "comment")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let request: UpdateCommentRequest = parse_json_body(&body)?;
    request.validate().map_err(ForumError::BadRequest)?;

    load_post(&state.pool, course_id, post_id).await?;
    let comment = CommentsRepository::get(&state.pool, post_id, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;
    ensure_author(&comment.created_by, &caller, "edit this comment")?;

    let comment = CommentsRepository::update(&state.pool, post_id, comment_id, &request.content)
        .await?
        .ok_or_else(comment_not_found)?;

    Ok(ApiResponse::ok("Comment updated successfully", comment))
}

/// Handler for DELETE /v1/courses/{course_id}/discussions/{post_id}/comments/{comment_id}
#[instrument(skip_all, name = "forum.comments.delete", fields(post_id = %post_id, comment_id = %comment_id))]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id, comment_id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    let comment_id = parse_id(&comment_id, "comment")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    load_post(&state.pool, course_id, post_id).await?;
    let comment = CommentsRepository::get(&state.pool, post_id, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;
    ensure_author(&comment.created_by, &caller, "delete this comment")?;

    if !CommentsRepository::delete(&state.pool, post_id, comment_id).await? {
        return Err(comment_not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /v1/courses/{course_id}/discussions/{post_id}/comments/{comment_id}/vote
#[instrument(skip_all, name = "forum.comments.vote", fields(post_id = %post_id, comment_id = %comment_id))]
pub async fn vote_comment(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id, comment_id)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<ApiResponse<VoteSummary>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    let comment_id = parse_id(&comment_id, "comment")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let request: VoteRequest = parse_json_body(&body)?;
    request.validate().map_err(ForumError::BadRequest)?;

    load_post(&state.pool, course_id, post_id).await?;
    CommentsRepository::get(&state.pool, post_id, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;

    let vote_count = VotesRepository::cast(
        &state.pool,
        VoteTarget::Comment(comment_id),
        &caller.user_id,
        request.value,
    )
    .await?;

    Ok(ApiResponse::ok(
        "Vote recorded",
        VoteSummary {
            vote_count,
            your_vote: request.value,
        },
    ))
}
