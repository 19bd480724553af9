//! gRPC service answering enrollment, validity and course-name lookups.
//!
//! Implements `CourseService` from `course_check.proto`. Dependent services
//! (forum, quiz) call these RPCs before every protected action.
//!
//! Each call is a single point lookup on a pooled connection. The connection
//! returns to the pool on every exit path. A missing row is a negative answer,
//! never an error. Store failures surface as `UNAVAILABLE` with no retry.

use crate::errors::CourseError;
use crate::repositories::{CoursesRepository, EnrollmentsRepository};
use metrics::counter;
use proto_gen::internal::course_service_server::CourseService;
use proto_gen::internal::{
    CourseNameRequest, CourseNameResponse, EnrollmentRequest, EnrollmentResponse, ValidityRequest,
    ValidityResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::instrument;

/// gRPC course check service.
pub struct CourseCheckService {
    pool: Arc<PgPool>,
}

impl CourseCheckService {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Map a store failure to a transport-level error for the caller.
fn store_unavailable(method: &'static str, err: CourseError) -> Status {
    tracing::error!(target: "course.grpc", method = method, error = %err, "Course store lookup failed");
    record(method, "store_error");
    Status::unavailable("Course store unavailable")
}

fn record(method: &'static str, outcome: &'static str) {
    counter!("course_grpc_requests_total", "method" => method, "outcome" => outcome).increment(1);
}

fn answer(value: bool) -> &'static str {
    if value {
        "positive"
    } else {
        "negative"
    }
}

#[tonic::async_trait]
impl CourseService for CourseCheckService {
    #[instrument(skip_all, name = "course.grpc.check_enrollment", fields(course_id = request.get_ref().course_id))]
    async fn check_enrollment(
        &self,
        request: Request<EnrollmentRequest>,
    ) -> Result<Response<EnrollmentResponse>, Status> {
        let req = request.into_inner();

        let is_enrolled =
            EnrollmentsRepository::is_enrolled(self.pool.as_ref(), &req.user_id, req.course_id)
                .await
                .map_err(|e| store_unavailable("check_enrollment", e))?;

        tracing::debug!(
            target: "course.grpc",
            course_id = req.course_id,
            is_enrolled = is_enrolled,
            "CheckEnrollment answered"
        );
        record("check_enrollment", answer(is_enrolled));

        Ok(Response::new(EnrollmentResponse { is_enrolled }))
    }

    #[instrument(skip_all, name = "course.grpc.check_validity", fields(course_id = request.get_ref().course_id))]
    async fn check_validity(
        &self,
        request: Request<ValidityRequest>,
    ) -> Result<Response<ValidityResponse>, Status> {
        let course_id = request.into_inner().course_id;

        let is_valid = CoursesRepository::exists(self.pool.as_ref(), course_id)
            .await
            .map_err(|e| store_unavailable("check_validity", e))?;

        tracing::debug!(
            target: "course.grpc",
            course_id = course_id,
            is_valid = is_valid,
            "CheckValidity answered"
        );
        record("check_validity", answer(is_valid));

        Ok(Response::new(ValidityResponse { is_valid }))
    }

    #[instrument(skip_all, name = "course.grpc.course_name", fields(course_id = request.get_ref().course_id))]
    async fn course_name(
        &self,
        request: Request<CourseNameRequest>,
    ) -> Result<Response<CourseNameResponse>, Status> {
        let course_id = request.into_inner().course_id;

        let name = CoursesRepository::name(self.pool.as_ref(), course_id)
            .await
            .map_err(|e| store_unavailable("course_name", e))?;

        tracing::debug!(
            target: "course.grpc",
            course_id = course_id,
            found = name.is_some(),
            "CourseName answered"
        );
        record("course_name", answer(name.is_some()));

        // Unknown courses answer with an empty name
        Ok(Response::new(CourseNameResponse {
            course_name: name.unwrap_or_default(),
        }))
    }
}
