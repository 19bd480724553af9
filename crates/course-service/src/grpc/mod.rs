//! gRPC server for Course Service.
//!
//! Serves `CourseService` behind a global concurrency limit so at most
//! `max_concurrent` lookups run at once. Excess calls wait for a slot.

pub mod course_check;

pub use course_check::CourseCheckService;

use proto_gen::internal::course_service_server::{CourseService, CourseServiceServer};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tower::limit::GlobalConcurrencyLimitLayer;

/// Serve the course check RPCs on `listener` until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns the transport error if the server fails.
pub async fn serve(
    listener: TcpListener,
    pool: Arc<PgPool>,
    max_concurrent: usize,
    shutdown: CancellationToken,
) -> Result<(), tonic::transport::Error> {
    serve_checks(
        listener,
        CourseCheckService::new(pool),
        max_concurrent,
        shutdown,
    )
    .await
}

/// Serve any `CourseService` implementation behind the concurrency limit.
///
/// # Errors
///
/// Returns the transport error if the server fails.
pub async fn serve_checks<S: CourseService>(
    listener: TcpListener,
    service: S,
    max_concurrent: usize,
    shutdown: CancellationToken,
) -> Result<(), tonic::transport::Error> {
    let incoming = TcpListenerStream::new(listener);

    Server::builder()
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
        .add_service(CourseServiceServer::new(service))
        .serve_with_incoming_shutdown(incoming, async move {
            shutdown.cancelled().await;
            tracing::info!(target: "course.grpc", "gRPC server shutting down");
        })
        .await
}
