//! PostgreSQL pool construction shared by the service binaries.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Statement timeout applied to every connection.
pub const STATEMENT_TIMEOUT_SECS: u32 = 5;

/// How long a request waits for a pooled connection.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect a bounded pool with a per-statement timeout.
///
/// # Errors
///
/// Returns the sqlx error if the initial connections cannot be established.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let url = add_query_timeout(database_url, STATEMENT_TIMEOUT_SECS);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(max_connections.min(2))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&url)
        .await
}

/// Adds statement_timeout to the database URL.
/// This ensures queries don't hang indefinitely.
#[must_use]
pub fn add_query_timeout(url: &str, timeout_secs: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}options=-c%20statement_timeout%3D{timeout_secs}s")
}
