//! Health check handler.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Health check handler.
///
/// Pings the database and reports the result. An unreachable database yields
/// 503 with `"status": "unhealthy"` so orchestrators can still read the body.
#[instrument(skip_all, name = "course.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    if db_healthy {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                database: Some("healthy".to_string()),
            }),
        )
    } else {
        tracing::warn!(target: "course.health", "Database ping failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                database: Some("unhealthy".to_string()),
            }),
        )
    }
}
