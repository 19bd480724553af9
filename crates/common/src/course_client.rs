//! Course service gRPC client.
//!
//! Dependent services (forum, quiz) ask the course service whether a course
//! exists, whether a user is enrolled in it, and what it is called.
//!
//! # Failure semantics
//!
//! The client fails closed. A transport error, a non-OK status or a timeout
//! yields `false` (or `None` for names). Failures are logged at warn level and
//! counted in `course_check_requests_total{outcome="transport_error"|"timeout"}`
//! so operators can tell an outage apart from a genuine negative answer.
//!
//! # Connection reuse
//!
//! One lazily connected [`Channel`] is built at startup. Clones share the
//! underlying HTTP/2 connection, and tonic reconnects it after failures.

use metrics::counter;
use proto_gen::internal::course_service_client::CourseServiceClient;
use proto_gen::internal::{CourseNameRequest, EnrollmentRequest, ValidityRequest};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, instrument, warn};

/// Default per-call timeout for course service RPCs.
pub const DEFAULT_COURSE_RPC_TIMEOUT: Duration = Duration::from_secs(3);

/// Connect timeout used when (re)establishing the channel.
const COURSE_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Metric name for course check outcomes.
const COURSE_CHECK_METRIC: &str = "course_check_requests_total";

/// Errors raised while constructing a [`CourseClient`].
///
/// RPC failures never surface as errors; they fail closed.
#[derive(Debug, Error)]
pub enum CourseClientError {
    /// The configured endpoint could not be parsed.
    #[error("Invalid course service endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Enrollment, validity and course-name lookups against the course service.
///
/// Implemented by [`CourseClient`] for production and by
/// [`mock::MockCourseCheck`] for tests.
#[async_trait::async_trait]
pub trait CourseCheck: Send + Sync {
    /// Whether `user_id` is enrolled in `course_id`.
    async fn check_enrollment(&self, user_id: &str, course_id: i32) -> bool;

    /// Whether `course_id` names an existing course.
    async fn check_validity(&self, course_id: i32) -> bool;

    /// The course's display name, or `None` if unknown or unreachable.
    async fn course_name(&self, course_id: i32) -> Option<String>;
}

/// gRPC client for the course service.
#[derive(Clone)]
pub struct CourseClient {
    client: CourseServiceClient<Channel>,
    endpoint: String,
    timeout: Duration,
}

impl std::fmt::Debug for CourseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CourseClient {
    /// Build a client for `endpoint` (`host:port` or a full `http://` URI).
    ///
    /// No connection is made here. The channel connects on first use, so the
    /// course service may start after its dependents.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `CourseClientError::InvalidEndpoint` if the address cannot be
    /// parsed as a URI.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, CourseClientError> {
        let uri = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{endpoint}")
        };

        let channel = Endpoint::from_shared(uri.clone())
            .map_err(|e| {
                warn!(target: "common.course_client", error = %e, endpoint = %endpoint, "Invalid course service endpoint");
                CourseClientError::InvalidEndpoint(endpoint.to_string())
            })?
            .connect_timeout(COURSE_CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .connect_lazy();

        Ok(Self {
            client: CourseServiceClient::new(channel),
            endpoint: uri,
            timeout,
        })
    }

    /// The endpoint this client targets.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one unary call under the client timeout, failing closed.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Option<T>
    where
        F: Future<Output = Result<tonic::Response<T>, tonic::Status>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => Some(response.into_inner()),
            Ok(Err(status)) => {
                warn!(
                    target: "common.course_client",
                    operation = operation,
                    code = ?status.code(),
                    error = %status.message(),
                    "Course service call failed, denying"
                );
                record_outcome(operation, "transport_error");
                None
            }
            Err(_) => {
                warn!(
                    target: "common.course_client",
                    operation = operation,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "Course service call timed out, denying"
                );
                record_outcome(operation, "timeout");
                None
            }
        }
    }
}

fn record_outcome(operation: &'static str, outcome: &'static str) {
    counter!(COURSE_CHECK_METRIC, "operation" => operation, "outcome" => outcome).increment(1);
}

fn bool_outcome(value: bool) -> &'static str {
    if value {
        "positive"
    } else {
        "negative"
    }
}

#[async_trait::async_trait]
impl CourseCheck for CourseClient {
    #[instrument(skip_all, name = "course_client.check_enrollment", fields(course_id = course_id))]
    async fn check_enrollment(&self, user_id: &str, course_id: i32) -> bool {
        let mut client = self.client.clone();
        let request = EnrollmentRequest {
            user_id: user_id.to_string(),
            course_id,
        };

        let Some(response) = self
            .bounded("check_enrollment", client.check_enrollment(request))
            .await
        else {
            return false;
        };

        debug!(target: "common.course_client", course_id = course_id, is_enrolled = response.is_enrolled, "Enrollment checked");
        record_outcome("check_enrollment", bool_outcome(response.is_enrolled));
        response.is_enrolled
    }

    #[instrument(skip_all, name = "course_client.check_validity", fields(course_id = course_id))]
    async fn check_validity(&self, course_id: i32) -> bool {
        let mut client = self.client.clone();

        let Some(response) = self
            .bounded(
                "check_validity",
                client.check_validity(ValidityRequest { course_id }),
            )
            .await
        else {
            return false;
        };

        debug!(target: "common.course_client", course_id = course_id, is_valid = response.is_valid, "Validity checked");
        record_outcome("check_validity", bool_outcome(response.is_valid));
        response.is_valid
    }

    #[instrument(skip_all, name = "course_client.course_name", fields(course_id = course_id))]
    async fn course_name(&self, course_id: i32) -> Option<String> {
        let mut client = self.client.clone();

        let response = self
            .bounded("course_name", client.course_name(CourseNameRequest { course_id }))
            .await?;

        // Empty string on the wire means no such course
        let name = Some(response.course_name).filter(|name| !name.is_empty());
        record_outcome("course_name", bool_outcome(name.is_some()));
        name
    }
}

/// Mock course check module for testing.
///
/// This module provides an in-memory [`CourseCheck`] for use in tests of the
/// gate and of service handlers.
pub mod mock {
    use super::CourseCheck;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory course authority.
    #[derive(Debug, Default)]
    pub struct MockCourseCheck {
        courses: HashMap<i32, String>,
        enrollments: HashSet<(String, i32)>,
        /// Simulates an unreachable course service.
        unavailable: bool,
        enrollment_calls: AtomicUsize,
        validity_calls: AtomicUsize,
        name_calls: AtomicUsize,
    }

    impl MockCourseCheck {
        /// Create a mock with no courses and no enrollments.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock that behaves like an unreachable course service.
        #[must_use]
        pub fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }

        /// Register a course.
        #[must_use]
        pub fn with_course(mut self, course_id: i32, name: &str) -> Self {
            self.courses.insert(course_id, name.to_string());
            self
        }

        /// Register an enrollment.
        #[must_use]
        pub fn with_enrollment(mut self, user_id: &str, course_id: i32) -> Self {
            self.enrollments.insert((user_id.to_string(), course_id));
            self
        }

        /// Number of `check_enrollment` calls made.
        pub fn enrollment_calls(&self) -> usize {
            self.enrollment_calls.load(Ordering::SeqCst)
        }

        /// Number of `check_validity` calls made.
        pub fn validity_calls(&self) -> usize {
            self.validity_calls.load(Ordering::SeqCst)
        }

        /// Number of `course_name` calls made.
        pub fn name_calls(&self) -> usize {
            self.name_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl CourseCheck for MockCourseCheck {
        async fn check_enrollment(&self, user_id: &str, course_id: i32) -> bool {
            self.enrollment_calls.fetch_add(1, Ordering::SeqCst);
            !self.unavailable
                && self
                    .enrollments
                    .contains(&(user_id.to_string(), course_id))
        }

        async fn check_validity(&self, course_id: i32) -> bool {
            self.validity_calls.fetch_add(1, Ordering::SeqCst);
            !self.unavailable && self.courses.contains_key(&course_id)
        }

        async fn course_name(&self, course_id: i32) -> Option<String> {
            self.name_calls.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return None;
            }
            self.courses.get(&course_id).cloned()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_answers_from_registered_data() {
            let mock = MockCourseCheck::new()
                .with_course(7, "Compilers")
                .with_enrollment("alice", 7);

            assert!(mock.check_validity(7).await);
            assert!(!mock.check_validity(8).await);
            assert!(mock.check_enrollment("alice", 7).await);
            assert!(!mock.check_enrollment("bob", 7).await);
            assert_eq!(mock.course_name(7).await.as_deref(), Some("Compilers"));
            assert_eq!(mock.course_name(8).await, None);

            assert_eq!(mock.validity_calls(), 2);
            assert_eq!(mock.enrollment_calls(), 2);
            assert_eq!(mock.name_calls(), 2);
        }

        #[tokio::test]
        async fn test_mock_unavailable_fails_closed() {
            let mock = MockCourseCheck::unavailable()
                .with_course(7, "Compilers")
                .with_enrollment("alice", 7);

            assert!(!mock.check_validity(7).await);
            assert!(!mock.check_enrollment("alice", 7).await);
            assert_eq!(mock.course_name(7).await, None);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_accepts_host_port() {
        let client = CourseClient::new("localhost:50051", DEFAULT_COURSE_RPC_TIMEOUT).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:50051");
    }

    #[tokio::test]
    async fn test_new_keeps_explicit_scheme() {
        let client =
            CourseClient::new("http://course-service:50051", DEFAULT_COURSE_RPC_TIMEOUT).unwrap();
        assert_eq!(client.endpoint(), "http://course-service:50051");
    }

    #[tokio::test]
    async fn test_new_rejects_garbage_endpoint() {
        let result = CourseClient::new("not a uri", DEFAULT_COURSE_RPC_TIMEOUT);
        assert!(matches!(result, Err(CourseClientError::InvalidEndpoint(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_closed() {
        // Bind then drop so the port is known to be closed
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CourseClient::new(&addr.to_string(), Duration::from_millis(500)).unwrap();

        assert!(!client.check_enrollment("alice", 1).await);
        assert!(!client.check_validity(1).await);
        assert_eq!(client.course_name(1).await, None);
    }

    #[tokio::test]
    async fn test_debug_shows_endpoint() {
        let client = CourseClient::new("localhost:50051", DEFAULT_COURSE_RPC_TIMEOUT).unwrap();
        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("http://localhost:50051"));
    }
}
