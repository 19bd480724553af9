//! Forum Service
//!
//! Course discussion boards. Every request is authorized against the course
//! service over gRPC before the forum store is touched.

use common::course_client::CourseClient;
use common::db::connect_pool;
use common::gate::AuthorizationGate;
use common::jwt::CredentialDecoder;
use common::observability::{init_metrics_recorder, init_tracing};
use common::shutdown::shutdown_signal;
use forum_service::config;
use forum_service::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("forum_service=debug,common=debug,tower_http=debug");

    info!("Starting Forum Service");

    let config = config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        course_service_endpoint = %config.course_service_endpoint,
        course_service_timeout_ms = config.course_service_timeout_ms,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!(error = %e, "Failed to install Prometheus metrics recorder");
        e
    })?;

    info!("Connecting to database...");
    let db_pool = connect_pool(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("../../migrations/forum")
        .run(&db_pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;

    info!("Database connection established");

    // One lazily connected channel shared by every request
    let course_client = CourseClient::new(
        &config.course_service_endpoint,
        config.course_service_timeout(),
    )
    .map_err(|e| {
        error!(error = %e, "Invalid course service endpoint");
        e
    })?;
    let decoder = CredentialDecoder::hs256(&config.jwt_secret, config.jwt_clock_skew());
    let gate = AuthorizationGate::new(Arc::new(course_client), Arc::new(decoder));

    let bind_address: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let state = Arc::new(AppState {
        pool: db_pool,
        config,
        gate,
    });
    let app = routes::build_routes(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Forum Service listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Forum Service shutdown complete");

    Ok(())
}
