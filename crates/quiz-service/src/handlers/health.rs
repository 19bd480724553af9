//! Health check handler.
//!
//! Reports only this service's database. Course service reachability is not
//! part of health: gated requests already fail closed when it is down.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip_all, name = "quiz.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    let (status, label) = if db_healthy {
        (StatusCode::OK, "healthy")
    } else {
        tracing::warn!(target: "quiz.health", "Database ping failed");
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            database: Some(label.to_string()),
        }),
    )
}
