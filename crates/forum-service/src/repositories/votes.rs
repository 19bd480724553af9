//! Votes repository.
//!
//! One vote per user per target. A value of `0` removes the caller's vote;
//! `1` or `-1` inserts or replaces it. Counts are the sum of stored values.

use crate::errors::ForumError;
use sqlx::PgPool;
use tracing::instrument;

/// What a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Post(i32),
    Comment(i32),
}

impl VoteTarget {
    fn table(self) -> (&'static str, &'static str, i32) {
        match self {
            VoteTarget::Post(id) => ("post_votes", "post_id", id),
            VoteTarget::Comment(id) => ("comment_votes", "comment_id", id),
        }
    }
}

pub struct VotesRepository;

impl VotesRepository {
    /// Record `value` for `user_id` and return the new net count.
    ///
    /// The target must exist; callers look it up first.
    #[instrument(skip_all, name = "forum.repo.cast_vote", fields(target = ?target, value = value))]
    pub async fn cast(
        pool: &PgPool,
        target: VoteTarget,
        user_id: &str,
        value: i16,
    ) -> Result<i64, ForumError> {
        let (table, key, id) = target.table();
        let mut tx = pool.begin().await?;

        if value == 0 {
            sqlx::query(&format!(
                "DELETE FROM {table} WHERE {key} = $1 AND user_id = $2"
            ))
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(&format!(
                "INSERT INTO {table} ({key}, user_id, value) VALUES ($1, $2, $3) \
                 ON CONFLICT ({key}, user_id) DO UPDATE SET value = EXCLUDED.value"
            ))
            .bind(id)
            .bind(user_id)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COALESCE(SUM(value), 0)::BIGINT FROM {table} WHERE {key} = $1"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(count)
    }
}
