//! Service layer for Course Service.

pub mod enrollment;

pub use enrollment::{plan_enrollment_changes, replace_enrollments, EnrollmentPlan};
