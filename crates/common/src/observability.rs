//! Tracing and metrics setup shared by the service binaries.
//!
//! # Metrics
//!
//! All metrics follow Prometheus naming conventions (`_total` counters,
//! `_seconds` histograms). Labels are bounded:
//! - `service`: one value per binary
//! - `method`: HTTP verbs
//! - `endpoint`: the matched route template, never the raw path
//! - `status`: success, error, timeout

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides `default_filter`. Output is JSON when
/// `LOG_FORMAT=json`, human-readable otherwise.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Install the Prometheus recorder and return the handle for `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("http_request_duration_seconds".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Build a recorder handle without installing it globally.
///
/// Useful in tests where several servers share a process.
#[must_use]
pub fn detached_metrics_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Record one completed HTTP request.
///
/// Metric: `http_requests_total`, `http_request_duration_seconds`
pub fn record_http_request(
    service: &'static str,
    method: &str,
    endpoint: &str,
    status_code: u16,
    duration: Duration,
) {
    let status = categorize_status_code(status_code);

    histogram!("http_request_duration_seconds",
        "service" => service,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("http_requests_total",
        "service" => service,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Middleware recording request metrics for every response, including
/// framework-level rejections (404, 405, 415, JSON errors).
///
/// Install with `middleware::from_fn_with_state(SERVICE_NAME, track_http_metrics)`.
pub async fn track_http_metrics(
    axum::extract::State(service): axum::extract::State<&'static str>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let response = next.run(request).await;

    record_http_request(
        service,
        &method,
        &endpoint,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(204), "success");
        assert_eq!(categorize_status_code(404), "error");
        assert_eq!(categorize_status_code(500), "error");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
    }

    #[tokio::test]
    async fn test_middleware_passes_response_through() {
        let app = Router::new()
            .route("/ok", get(|| async { "OK" }))
            .layer(middleware::from_fn_with_state("test", track_http_metrics));

        let ok = app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/ok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let missing = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_detached_handle_renders() {
        let handle = detached_metrics_handle();
        // Nothing recorded against a detached recorder
        assert!(handle.render().is_empty());
    }
}
