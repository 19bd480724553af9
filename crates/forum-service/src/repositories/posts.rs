//! Posts repository.
//!
//! Every lookup is scoped by `course_id` so a post id from another course
//! reads as absent.

use crate::errors::ForumError;
use crate::models::Post;
use sqlx::PgPool;
use tracing::instrument;

/// Post columns plus the net vote count, for a row aliased `p`.
const POST_COLUMNS: &str = "p.post_id, p.course_id, p.title, p.content, p.created_by, \
     p.created_at, p.updated_at, \
     COALESCE((SELECT SUM(v.value) FROM post_votes v WHERE v.post_id = p.post_id), 0)::BIGINT \
     AS vote_count";

pub struct PostsRepository;

impl PostsRepository {
    /// Posts of a course, most recently updated first.
    #[instrument(skip_all, name = "forum.repo.list_posts", fields(course_id = course_id))]
    pub async fn list(pool: &PgPool, course_id: i32) -> Result<Vec<Post>, ForumError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.course_id = $1 \
             ORDER BY p.updated_at DESC, p.post_id DESC"
        ))
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }

    #[instrument(skip_all, name = "forum.repo.get_post", fields(post_id = post_id))]
    pub async fn get(
        pool: &PgPool,
        course_id: i32,
        post_id: i32,
    ) -> Result<Option<Post>, ForumError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.course_id = $1 AND p.post_id = $2"
        ))
        .bind(course_id)
        .bind(post_id)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip_all, name = "forum.repo.create_post", fields(course_id = course_id))]
    pub async fn create(
        pool: &PgPool,
        course_id: i32,
        title: &str,
        content: &str,
        created_by: &str,
    ) -> Result<Post, ForumError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (course_id, title, content, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING post_id, course_id, title, content, created_by, created_at, updated_at,
                      0::BIGINT AS vote_count
            "#,
        )
        .bind(course_id)
        .bind(title)
        .bind(content)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(post)
    }

    /// Apply a partial edit and bump `updated_at`.
    ///
    /// Returns `None` if the post does not exist in this course.
    #[instrument(skip_all, name = "forum.repo.update_post", fields(post_id = post_id))]
    pub async fn update(
        pool: &PgPool,
        course_id: i32,
        post_id: i32,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Option<Post>, ForumError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET title = COALESCE($3, title),
                    content = COALESCE($4, content),
                    updated_at = NOW()
                WHERE course_id = $1 AND post_id = $2
                RETURNING *
            )
            SELECT {POST_COLUMNS} FROM p
            "#
        ))
        .bind(course_id)
        .bind(post_id)
        .bind(title)
        .bind(content)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Delete a post. Comments and votes go with it (`ON DELETE CASCADE`).
    #[instrument(skip_all, name = "forum.repo.delete_post", fields(post_id = post_id))]
    pub async fn delete(pool: &PgPool, course_id: i32, post_id: i32) -> Result<bool, ForumError> {
        let result = sqlx::query("DELETE FROM posts WHERE course_id = $1 AND post_id = $2")
            .bind(course_id)
            .bind(post_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
