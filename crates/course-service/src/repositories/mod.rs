//! Repository layer for Course Service.
//!
//! Provides database access patterns following the Handler -> Service -> Repository
//! architecture. Functions taking a `PgExecutor` can run inside a caller's
//! transaction.

pub mod courses;
pub mod enrollments;

pub use courses::CoursesRepository;
pub use enrollments::EnrollmentsRepository;
