//! Course client tests against an in-process gRPC course service.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::course_client::{CourseCheck, CourseClient};
use proto_gen::internal::course_service_server::{CourseService, CourseServiceServer};
use proto_gen::internal::{
    CourseNameRequest, CourseNameResponse, EnrollmentRequest, EnrollmentResponse, ValidityRequest,
    ValidityResponse,
};
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

// ============================================================================
// Mock course service
// ============================================================================

#[derive(Clone, Copy)]
enum Behavior {
    Answer,
    Fail,
    Stall,
}

struct StubCourseService {
    behavior: Behavior,
    calls: Arc<AtomicU32>,
}

impl StubCourseService {
    async fn gate(&self) -> Result<(), Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Answer => Ok(()),
            Behavior::Fail => Err(Status::unavailable("store down")),
            Behavior::Stall => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            }
        }
    }
}

#[tonic::async_trait]
impl CourseService for StubCourseService {
    async fn check_enrollment(
        &self,
        request: Request<EnrollmentRequest>,
    ) -> Result<Response<EnrollmentResponse>, Status> {
        self.gate().await?;
        let inner = request.into_inner();
        Ok(Response::new(EnrollmentResponse {
            is_enrolled: inner.user_id == "alice" && inner.course_id == 1,
        }))
    }

    async fn check_validity(
        &self,
        request: Request<ValidityRequest>,
    ) -> Result<Response<ValidityResponse>, Status> {
        self.gate().await?;
        Ok(Response::new(ValidityResponse {
            is_valid: request.into_inner().course_id == 1,
        }))
    }

    async fn course_name(
        &self,
        request: Request<CourseNameRequest>,
    ) -> Result<Response<CourseNameResponse>, Status> {
        self.gate().await?;
        let course_name = if request.into_inner().course_id == 1 {
            "Operating Systems".to_string()
        } else {
            String::new()
        };
        Ok(Response::new(CourseNameResponse { course_name }))
    }
}

async fn start_stub(behavior: Behavior) -> (SocketAddr, Arc<AtomicU32>, CancellationToken) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel_token = CancellationToken::new();
    let cancel_token_clone = cancel_token.clone();
    let calls = Arc::new(AtomicU32::new(0));

    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);
    let service = StubCourseService {
        behavior,
        calls: calls.clone(),
    };

    let server = Server::builder()
        .add_service(CourseServiceServer::new(service))
        .serve_with_incoming_shutdown(incoming, async move {
            cancel_token_clone.cancelled().await;
        });

    tokio::spawn(async move {
        let _ = server.await;
    });

    (addr, calls, cancel_token)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_client_relays_answers() {
    let (addr, calls, cancel) = start_stub(Behavior::Answer).await;
    let client = CourseClient::new(&addr.to_string(), Duration::from_secs(2)).unwrap();

    assert!(client.check_validity(1).await);
    assert!(!client.check_validity(2).await);
    assert!(client.check_enrollment("alice", 1).await);
    assert!(!client.check_enrollment("bob", 1).await);
    assert_eq!(
        client.course_name(1).await.as_deref(),
        Some("Operating Systems")
    );
    assert_eq!(client.course_name(2).await, None);

    assert_eq!(calls.load(Ordering::SeqCst), 6);
    cancel.cancel();
}

#[tokio::test]
async fn test_client_shares_one_channel_across_clones() {
    let (addr, calls, cancel) = start_stub(Behavior::Answer).await;
    let client = CourseClient::new(&addr.to_string(), Duration::from_secs(2)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.check_validity(1).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 8);
    cancel.cancel();
}

#[tokio::test]
async fn test_error_status_fails_closed() {
    let (addr, _calls, cancel) = start_stub(Behavior::Fail).await;
    let client = CourseClient::new(&addr.to_string(), Duration::from_secs(2)).unwrap();

    assert!(!client.check_validity(1).await);
    assert!(!client.check_enrollment("alice", 1).await);
    assert_eq!(client.course_name(1).await, None);
    cancel.cancel();
}

#[tokio::test]
async fn test_timeout_fails_closed() {
    let (addr, calls, cancel) = start_stub(Behavior::Stall).await;
    let client = CourseClient::new(&addr.to_string(), Duration::from_millis(200)).unwrap();

    let started = std::time::Instant::now();
    assert!(!client.check_validity(1).await);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    cancel.cancel();
}
