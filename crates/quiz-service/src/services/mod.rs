//! Business logic for Quiz Service.

pub mod grading;

pub use grading::{grade, Grade};
