//! Concurrency limit tests for the gRPC check server.
//!
//! A slow stub service sits behind the same `serve_checks` stack as the real
//! service, so every lookup holds its slot long enough to observe queueing.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use common::course_client::{CourseCheck, CourseClient};
use course_service::grpc::serve_checks;
use proto_gen::internal::course_service_server::CourseService;
use proto_gen::internal::{
    CourseNameRequest, CourseNameResponse, EnrollmentRequest, EnrollmentResponse, ValidityRequest,
    ValidityResponse,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

const HOLD: Duration = Duration::from_millis(200);

#[derive(Clone, Default)]
struct SlowCourseService {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl SlowCourseService {
    async fn hold_slot(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(HOLD).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[tonic::async_trait]
impl CourseService for SlowCourseService {
    async fn check_enrollment(
        &self,
        _request: Request<EnrollmentRequest>,
    ) -> Result<Response<EnrollmentResponse>, Status> {
        self.hold_slot().await;
        Ok(Response::new(EnrollmentResponse { is_enrolled: true }))
    }

    async fn check_validity(
        &self,
        _request: Request<ValidityRequest>,
    ) -> Result<Response<ValidityResponse>, Status> {
        self.hold_slot().await;
        Ok(Response::new(ValidityResponse { is_valid: true }))
    }

    async fn course_name(
        &self,
        _request: Request<CourseNameRequest>,
    ) -> Result<Response<CourseNameResponse>, Status> {
        self.hold_slot().await;
        Ok(Response::new(CourseNameResponse {
            course_name: "Operating Systems".to_string(),
        }))
    }
}

async fn start_limited(
    service: SlowCourseService,
    max_concurrent: usize,
) -> (SocketAddr, CancellationToken) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let server_cancel = cancel.clone();

    tokio::spawn(async move {
        let _ = serve_checks(listener, service, max_concurrent, server_cancel).await;
    });

    (addr, cancel)
}

#[tokio::test]
async fn test_in_flight_lookups_never_exceed_limit() {
    let service = SlowCourseService::default();
    let (addr, cancel) = start_limited(service.clone(), 2).await;
    let client = CourseClient::new(&addr.to_string(), Duration::from_secs(10)).unwrap();

    let calls: Vec<_> = (0..6)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.check_validity(1).await })
        })
        .collect();

    for call in calls {
        assert!(call.await.unwrap());
    }

    assert_eq!(service.peak.load(Ordering::SeqCst), 2);
    cancel.cancel();
}

#[tokio::test]
async fn test_call_beyond_limit_waits_for_a_slot() {
    let service = SlowCourseService::default();
    let (addr, cancel) = start_limited(service.clone(), 1).await;
    let client = CourseClient::new(&addr.to_string(), Duration::from_secs(10)).unwrap();

    // Warm the channel so connection setup is not part of the measurement
    assert!(client.check_validity(1).await);

    let holder = {
        let client = client.clone();
        tokio::spawn(async move { client.check_enrollment("alice", 1).await })
    };
    while service.in_flight.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let started = Instant::now();
    assert_eq!(
        client.course_name(1).await.as_deref(),
        Some("Operating Systems")
    );
    let waited = started.elapsed();

    assert!(holder.await.unwrap());
    // Queued behind the holder's remaining time plus its own hold
    assert!(waited >= HOLD + HOLD / 2, "second call did not queue: {waited:?}");
    assert_eq!(service.peak.load(Ordering::SeqCst), 1);
    cancel.cancel();
}
