//! Comments repository.

use crate::errors::ForumError;
use crate::models::Comment;
use sqlx::PgPool;
use tracing::instrument;

const COMMENT_COLUMNS: &str = "c.comment_id, c.post_id, c.reply_to, c.content, c.created_by, \
     c.created_at, c.updated_at, \
     COALESCE((SELECT SUM(v.value) FROM comment_votes v WHERE v.comment_id = c.comment_id), 0)::BIGINT \
     AS vote_count";

pub struct CommentsRepository;

impl CommentsRepository {
    /// Comments of a post in creation order.
    #[instrument(skip_all, name = "forum.repo.list_comments", fields(post_id = post_id))]
    pub async fn list(pool: &PgPool, post_id: i32) -> Result<Vec<Comment>, ForumError> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.post_id = $1 \
             ORDER BY c.created_at, c.comment_id"
        ))
        .bind(post_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    #[instrument(skip_all, name = "forum.repo.get_comment", fields(comment_id = comment_id))]
    pub async fn get(
        pool: &PgPool,
        post_id: i32,
        comment_id: i32,
    ) -> Result<Option<Comment>, ForumError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.post_id = $1 AND c.comment_id = $2"
        ))
        .bind(post_id)
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Insert a comment. `reply_to` must already be validated against the post.
    #[instrument(skip_all, name = "forum.repo.create_comment", fields(post_id = post_id))]
    pub async fn create(
        pool: &PgPool,
        post_id: i32,
        reply_to: Option<i32>,
        content: &str,
        created_by: &str,
    ) -> Result<Comment, ForumError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, reply_to, content, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING comment_id, post_id, reply_to, content, created_by, created_at, updated_at,
                      0::BIGINT AS vote_count
            "#,
        )
        .bind(post_id)
        .bind(reply_to)
        .bind(content)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    #[instrument(skip_all, name = "forum.repo.update_comment", fields(comment_id = comment_id))]
    pub async fn update(
        pool: &PgPool,
        post_id: i32,
        comment_id: i32,
        content: &str,
    ) -> Result<Option<Comment>, ForumError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            WITH c AS (
                UPDATE comments
                SET content = $3, updated_at = NOW()
                WHERE post_id = $1 AND comment_id = $2
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS} FROM c
            "#
        ))
        .bind(post_id)
        .bind(comment_id)
        .bind(content)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Delete a comment. Replies keep their place with `reply_to` cleared.
    #[instrument(skip_all, name = "forum.repo.delete_comment", fields(comment_id = comment_id))]
    pub async fn delete(pool: &PgPool, post_id: i32, comment_id: i32) -> Result<bool, ForumError> {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = $1 AND comment_id = $2")
            .bind(post_id)
            .bind(comment_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
