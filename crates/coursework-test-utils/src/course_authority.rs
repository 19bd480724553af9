//! In-process gRPC course authority.
//!
//! Serves the `CourseService` contract from an in-memory table so dependent
//! services can be exercised end to end through a real `CourseClient`
//! without a course database.

use proto_gen::internal::course_service_server::{CourseService, CourseServiceServer};
use proto_gen::internal::{
    CourseNameRequest, CourseNameResponse, EnrollmentRequest, EnrollmentResponse,
    ValidityRequest, ValidityResponse,
};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::{transport::Server, Request, Response, Status};

#[derive(Default)]
struct Table {
    courses: HashMap<i32, String>,
    enrollments: HashSet<(String, i32)>,
    unavailable: bool,
}

/// In-memory course authority.
///
/// # Example
/// ```rust,ignore
/// let authority = MockCourseAuthority::new()
///     .with_course(7, "Compilers")
///     .with_enrollment("alice", 7)
///     .spawn()
///     .await?;
///
/// let client = CourseClient::new(&authority.endpoint(), Duration::from_secs(1))?;
/// assert!(client.check_enrollment("alice", 7).await);
/// ```
#[derive(Clone, Default)]
pub struct MockCourseAuthority {
    table: Arc<Mutex<Table>>,
}

impl MockCourseAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(self, course_id: i32, name: &str) -> Self {
        self.add_course(course_id, name);
        self
    }

    pub fn with_enrollment(self, user_id: &str, course_id: i32) -> Self {
        self.enroll(user_id, course_id);
        self
    }

    /// Add or rename a course on a running authority.
    pub fn add_course(&self, course_id: i32, name: &str) {
        self.table
            .lock()
            .unwrap()
            .courses
            .insert(course_id, name.to_string());
    }

    /// Remove a course and all of its enrollments.
    pub fn remove_course(&self, course_id: i32) {
        let mut table = self.table.lock().unwrap();
        table.courses.remove(&course_id);
        table.enrollments.retain(|(_, id)| *id != course_id);
    }

    pub fn enroll(&self, user_id: &str, course_id: i32) {
        self.table
            .lock()
            .unwrap()
            .enrollments
            .insert((user_id.to_string(), course_id));
    }

    pub fn unenroll(&self, user_id: &str, course_id: i32) {
        self.table
            .lock()
            .unwrap()
            .enrollments
            .remove(&(user_id.to_string(), course_id));
    }

    /// When set, every RPC fails with `UNAVAILABLE`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.table.lock().unwrap().unavailable = unavailable;
    }

    fn check_available(&self) -> Result<(), Status> {
        if self.table.lock().unwrap().unavailable {
            return Err(Status::unavailable("Course store unavailable"));
        }
        Ok(())
    }

    /// Serve on a random loopback port until the returned handle is dropped.
    pub async fn spawn(self) -> Result<RunningCourseAuthority, anyhow::Error> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind course authority: {}", e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        let service = CourseServiceServer::new(self.clone());

        tokio::spawn(async move {
            let result = Server::builder()
                .add_service(service)
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                    shutdown.cancelled().await;
                })
                .await;
            if let Err(e) = result {
                eprintln!("Course authority error: {}", e);
            }
        });

        Ok(RunningCourseAuthority {
            addr,
            authority: self,
            cancel,
        })
    }
}

#[tonic::async_trait]
impl CourseService for MockCourseAuthority {
    async fn check_enrollment(
        &self,
        request: Request<EnrollmentRequest>,
    ) -> Result<Response<EnrollmentResponse>, Status> {
        self.check_available()?;
        let request = request.into_inner();
        let is_enrolled = self
            .table
            .lock()
            .unwrap()
            .enrollments
            .contains(&(request.user_id, request.course_id));
        Ok(Response::new(EnrollmentResponse { is_enrolled }))
    }

    async fn check_validity(
        &self,
        request: Request<ValidityRequest>,
    ) -> Result<Response<ValidityResponse>, Status> {
        self.check_available()?;
        let course_id = request.into_inner().course_id;
        let is_valid = self.table.lock().unwrap().courses.contains_key(&course_id);
        Ok(Response::new(ValidityResponse { is_valid }))
    }

    async fn course_name(
        &self,
        request: Request<CourseNameRequest>,
    ) -> Result<Response<CourseNameResponse>, Status> {
        self.check_available()?;
        let course_id = request.into_inner().course_id;
        let course_name = self
            .table
            .lock()
            .unwrap()
            .courses
            .get(&course_id)
            .cloned()
            .unwrap_or_default();
        Ok(Response::new(CourseNameResponse { course_name }))
    }
}

/// A serving [`MockCourseAuthority`]. Stops serving on drop.
pub struct RunningCourseAuthority {
    addr: SocketAddr,
    authority: MockCourseAuthority,
    cancel: CancellationToken,
}

impl RunningCourseAuthority {
    /// `host:port` suitable for `COURSE_SERVICE_ENDPOINT`.
    pub fn endpoint(&self) -> String {
        self.addr.to_string()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The shared table; mutations are visible to in-flight clients.
    pub fn authority(&self) -> &MockCourseAuthority {
        &self.authority
    }
}

impl Drop for RunningCourseAuthority {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::course_client::{CourseCheck, CourseClient};
    use std::time::Duration;

    #[tokio::test]
    async fn test_authority_answers_through_course_client() {
        let running = MockCourseAuthority::new()
            .with_course(7, "Compilers")
            .with_enrollment("alice", 7)
            .spawn()
            .await
            .unwrap();
        let client = CourseClient::new(&running.endpoint(), Duration::from_secs(2)).unwrap();

        assert!(client.check_validity(7).await);
        assert!(!client.check_validity(8).await);
        assert!(client.check_enrollment("alice", 7).await);
        assert!(!client.check_enrollment("bob", 7).await);
        assert_eq!(client.course_name(7).await.as_deref(), Some("Compilers"));
        assert_eq!(client.course_name(8).await, None);
    }

    #[tokio::test]
    async fn test_mutations_are_visible_while_running() {
        let running = MockCourseAuthority::new().spawn().await.unwrap();
        let client = CourseClient::new(&running.endpoint(), Duration::from_secs(2)).unwrap();

        assert!(!client.check_validity(3).await);
        running.authority().add_course(3, "Databases");
        running.authority().enroll("bob", 3);
        assert!(client.check_enrollment("bob", 3).await);

        running.authority().remove_course(3);
        assert!(!client.check_validity(3).await);
        assert!(!client.check_enrollment("bob", 3).await);
    }

    #[tokio::test]
    async fn test_unavailable_authority_fails_closed() {
        let running = MockCourseAuthority::new()
            .with_course(1, "Algorithms")
            .spawn()
            .await
            .unwrap();
        running.authority().set_unavailable(true);
        let client = CourseClient::new(&running.endpoint(), Duration::from_secs(2)).unwrap();

        assert!(!client.check_validity(1).await);
        assert_eq!(client.course_name(1).await, None);
    }
}
