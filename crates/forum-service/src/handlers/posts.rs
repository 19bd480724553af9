//! Discussion post handlers.

use crate::errors::ForumError;
use crate::handlers::{ensure_author, load_post, parse_id, parse_json_body};
use crate::models::{CreatePostRequest, Post, UpdatePostRequest, VoteRequest, VoteSummary};
use crate::repositories::{PostsRepository, VoteTarget, VotesRepository};
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use common::envelope::ApiResponse;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /v1/courses/{course_id}/discussions
#[instrument(skip_all, name = "forum.posts.list", fields(course_id = %course_id))]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    headers: HeaderMap,
) -> Result<ApiResponse<Vec<Post>>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    state.gate.authorize_headers(course_id, &headers).await?;

    let posts = PostsRepository::list(&state.pool, course_id).await?;
    Ok(ApiResponse::ok("Posts retrieved successfully", posts))
}

/// Handler for POST /v1/courses/{course_id}/discussions
#[instrument(skip_all, name = "forum.posts.create", fields(course_id = %course_id))]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<ApiResponse<Post>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let request: CreatePostRequest = parse_json_body(&body)?;
    request.validate().map_err(ForumError::BadRequest)?;

    let post = PostsRepository::create(
        &state.pool,
        course_id,
        request.title.trim(),
        &request.content,
        &caller.user_id,
    )
    .await?;

    tracing::info!(
        target: "forum.handlers.posts",
        course_id = course_id,
        post_id = post.post_id,
        "Post created"
    );

    Ok(ApiResponse::created("Post created successfully", post))
}

/// Handler for GET /v1/courses/{course_id}/discussions/{post_id}
#[instrument(skip_all, name = "forum.posts.get", fields(course_id = %course_id, post_id = %post_id))]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<ApiResponse<Post>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    state.gate.authorize_headers(course_id, &headers).await?;

    let post = load_post(&state.pool, course_id, post_id).await?;
    Ok(ApiResponse::ok("Post retrieved successfully", post))
}

/// Handler for PUT /v1/courses/{course_id}/discussions/{post_id}
///
/// Author only. Absent fields are left unchanged.
#[instrument(skip_all, name = "forum.posts.update", fields(course_id = %course_id, post_id = %post_id))]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<ApiResponse<Post>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let request: UpdatePostRequest = parse_json_body(&body)?;
    request.validate().map_err(ForumError::BadRequest)?;

    let post = load_post(&state.pool, course_id, post_id).await?;
    ensure_author(&post.created_by, &caller, "edit this post")?;

    let post = PostsRepository::update(
        &state.pool,
        course_id,
        post_id,
        request.title.as_deref().map(str::trim),
        request.content.as_deref(),
    )
    .await?
    .ok_or_else(|| ForumError::NotFound("Post not found".to_string()))?;

    Ok(ApiResponse::ok("Post updated successfully", post))
}

/// Handler for DELETE /v1/courses/{course_id}/discussions/{post_id}
///
/// Author only. Removes the post's comments and votes. Returns 204.
#[instrument(skip_all, name = "forum.posts.delete", fields(course_id = %course_id, post_id = %post_id))]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let post = load_post(&state.pool, course_id, post_id).await?;
    ensure_author(&post.created_by, &caller, "delete this post")?;

    if !PostsRepository::delete(&state.pool, course_id, post_id).await? {
        return Err(ForumError::NotFound("Post not found".to_string()));
    }

    tracing::info!(target: "forum.handlers.posts", post_id = post_id, "Post deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /v1/courses/{course_id}/discussions/{post_id}/vote
#[instrument(skip_all, name = "forum.posts.vote", fields(course_id = %course_id, post_id = %post_id))]
pub async fn vote_post(
    State(state): State<Arc<AppState>>,
    Path((course_id, post_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<ApiResponse<VoteSummary>, ForumError> {
    let course_id = parse_id(&course_id, "course")?;
    let post_id = parse_id(&post_id, "post")?;
    let caller = state.gate.authorize_headers(course_id, &headers).await?;

    let request: VoteRequest = parse_json_body(&body)?;
    request.validate().map_err(ForumError::BadRequest)?;

    load_post(&state.pool, course_id, post_id).await?;

    let vote_count = VotesRepository::cast(
        &state.pool,
        VoteTarget::Post(post_id),
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
