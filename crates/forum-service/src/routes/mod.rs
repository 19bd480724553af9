//! HTTP routes for Forum Service.

use crate::config::Config;
use crate::handlers;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use common::gate::AuthorizationGate;
use common::observability::track_http_metrics;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

const SERVICE_NAME: &str = "forum-service";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// Validity-then-enrollment gate backed by the course service.
    pub gate: AuthorizationGate,
}

/// Build the application routes.
///
/// Every route under `/v1/courses/:course_id/discussions` is gated inside
/// its handler because the gate needs the course id from the path.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let discussion_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/v1/courses/:course_id/discussions",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/v1/courses/:course_id/discussions/:post_id",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/v1/courses/:course_id/discussions/:post_id/vote",
            post(handlers::vote_post),
        )
        .route(
            "/v1/courses/:course_id/discussions/:post_id/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/v1/courses/:course_id/discussions/:post_id/comments/:comment_id",
            axum::routing::put(handlers::update_comment).delete(handlers::delete_comment),
        )
        .route(
            "/v1/courses/:course_id/discussions/:post_id/comments/:comment_id/vote",
            post(handlers::vote_comment),
        )
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    discussion_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn_with_state(
            SERVICE_NAME,
            track_http_metrics,
        ))
}
