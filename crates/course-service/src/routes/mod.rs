//! HTTP routes for Course Service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{require_auth, AuthState};
use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use common::jwt::CredentialDecoder;
use common::observability::track_http_metrics;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Service label on HTTP metrics.
const SERVICE_NAME: &str = "course-service";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Health check (database ping) - public
/// - `/metrics` - Prometheus metrics - public
/// - `GET /v1/courses`, `GET /v1/courses/:course_id` - public
/// - `POST /v1/courses`, `PUT|DELETE /v1/courses/:course_id` - authenticated
/// - `GET|PUT /v1/courses/:course_id/enrollments` - authenticated
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let decoder = Arc::new(CredentialDecoder::hs256(
        &state.config.jwt_secret,
        state.config.jwt_clock_skew(),
    ));
    let auth_state = Arc::new(AuthState { decoder });

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/v1/courses", get(handlers::list_courses))
        .route("/v1/courses/:course_id", get(handlers::get_course))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/v1/courses", axum::routing::post(handlers::create_course))
        .route(
            "/v1/courses/:course_id",
            put(handlers::update_course).delete(handlers::delete_course),
        )
        .route(
            "/v1/courses/:course_id/enrollments",
            get(handlers::list_enrollments).put(handlers::replace_enrollments),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. track_http_metrics - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn_with_state(
            SERVICE_NAME,
            track_http_metrics,
        ))
}
