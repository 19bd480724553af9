//! Course Service
//!
//! Entry point for the course authority: REST API for courses and
//! enrollments, gRPC API for enrollment and validity checks.

use common::db::connect_pool;
use common::observability::{init_metrics_recorder, init_tracing};
use common::shutdown::shutdown_signal;
use course_service::config::Config;
use course_service::grpc;
use course_service::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("course_service=debug,common=debug,tower_http=debug");

    info!("Starting Course Service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        grpc_bind_address = %config.grpc_bind_address,
        grpc_max_concurrent_requests = config.grpc_max_concurrent_requests,
        jwt_clock_skew_seconds = config.jwt_clock_skew_seconds,
        "Configuration loaded successfully"
    );

    // Must happen before any metrics are recorded
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

    sqlx::migrate!("../../migrations/course")
        .run(&db_pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;

    info!("Database connection established");

    let http_addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;
    let grpc_addr: SocketAddr = config.grpc_bind_address.parse().map_err(|e| {
        error!("Invalid gRPC bind address: {}", e);
        e
    })?;
    let grpc_max_concurrent = config.grpc_max_concurrent_requests;

    let shutdown_token = CancellationToken::new();

    // Bind listeners BEFORE spawning to fail fast on bind errors
    let grpc_listener = tokio::net::TcpListener::bind(grpc_addr).await?;
    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;

    let grpc_pool = Arc::new(db_pool.clone());
    let grpc_shutdown = shutdown_token.child_token();
    let grpc_task = tokio::spawn(async move {
        info!(addr = %grpc_addr, "gRPC server starting");
        if let Err(e) = grpc::serve(grpc_listener, grpc_pool, grpc_max_concurrent, grpc_shutdown).await {
            error!(error = %e, "gRPC server failed");
        }
    });

    let state = Arc::new(AppState {
        pool: db_pool,
        config,
    });
    let app = routes::build_routes(state, metrics_handle);

    info!("Course Service listening on {}", http_addr);

    let http_shutdown = shutdown_token.clone();
    axum::serve(
        http_listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        http_shutdown.cancel();
    })
    .await?;

    // HTTP has drained; make sure the gRPC server finishes too
    shutdown_token.cancel();
    if let Err(e) = grpc_task.await {
        error!(error = %e, "gRPC server task panicked");
    }

    info!("Course Service shutdown complete");

    Ok(())
}
