//! HTTP routes for Quiz Service.

use crate::config::Config;
use crate::handlers;
use axum::{middleware, routing::get, Router};
use common::gate::AuthorizationGate;
use common::observability::track_http_metrics;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

const SERVICE_NAME: &str = "quiz-service";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    /// Validity-then-enrollment gate backed by the course service.
    pub gate: AuthorizationGate,
}

/// Build the application routes.
///
/// Quiz routes are gated inside each handler.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let quiz_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/v1/courses/:course_id/quizzes",
            get(handlers::list_quizzes).post(handlers::create_quiz),
        )
        .route(
            "/v1/courses/:course_id/quizzes/:quiz_id",
            get(handlers::get_quiz),
        )
        .route(
            "/v1/courses/:course_id/quizzes/:quiz_id/submissions",
            get(handlers::list_submissions).post(handlers::submit_quiz),
        )
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    quiz_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn_with_state(
            SERVICE_NAME,
            track_http_metrics,
        ))
}
