//! HTTP request handlers for Forum Service.
//!
//! Every discussion handler parses its path, then runs the authorization
//! gate before reading or writing the forum store.

pub mod comments;
pub mod health;
pub mod metrics;
pub mod posts;

pub use comments::{create_comment, delete_comment, list_comments, update_comment, vote_comment};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use posts::{create_post, delete_post, get_post, list_posts, update_post, vote_post};

use crate::errors::ForumError;
use crate::models::Post;
use crate::repositories::PostsRepository;
use common::gate::AuthorizedCaller;
use serde::de::DeserializeOwned;
use sqlx::PgPool;

/// Deserialize a JSON body, returning 400 (not Axum's default 422) on failure.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ForumError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "forum.handlers", error = %e, "Invalid request body");
        ForumError::BadRequest("Invalid request body".to_string())
    })
}

/// Parse a numeric path identifier, returning 400 on failure.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i32, ForumError> {
    raw.parse()
        .map_err(|_| ForumError::BadRequest(format!("Invalid {what} id")))
}

/// Load a post of `course_id` or fail with 404.
pub(crate) async fn load_post(pool: &PgPool, course_id: i32, post_id: i32) -> Result<Post, ForumError> {
    PostsRepository::get(pool, course_id, post_id)
        .await?
        .ok_or_else(|| ForumError::NotFound("Post not found".to_string()))
}

/// Only the author may edit or delete their content.
pub(crate) fn ensure_author(
    created_by: &str,
    caller: &AuthorizedCaller,
    action: &str,
) -> Result<(), ForumError> {
    if created_by == caller.user_id {
        Ok(())
    } else {
        tracing::debug!(target: "forum.handlers", action = action, "Rejected: caller is not the author");
        Err(ForumError::Forbidden(format!("Only the author can {action}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::VoteRequest;

    fn caller(user_id: &str) -> AuthorizedCaller {
        AuthorizedCaller {
            user_id: user_id.to_string(),
            course_id: 1,
        }
    }

    #[test]
    fn test_parse_json_body() {
        let vote: VoteRequest = parse_json_body(br#"{"value":-1}"#).unwrap();
        assert_eq!(vote.value, -1);

        let result: Result<VoteRequest, _> = parse_json_body(br#"{"value":"up"}"#);
        assert!(matches!(result, Err(ForumError::BadRequest(_))));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("17", "post").unwrap(), 17);
        let err = parse_id("x", "post").unwrap_err();
        assert!(matches!(err, ForumError::BadRequest(msg) if msg == "Invalid post id"));
    }

    #[test]
    fn test_ensure_author() {
        assert!(ensure_author("alice", &caller("alice"), "edit this post").is_ok());
        assert!(matches!(
            ensure_author("alice", &caller("bob"), "edit this post"),
            Err(ForumError::Forbidden(_))
        ));
    }
}
