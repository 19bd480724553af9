//! Generated Protocol Buffer code for Coursework services.
//!
//! This crate contains the compiled Protocol Buffer definitions used for
//! communication between the course service and its dependent services.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)] // Generated code has various doc formatting
#![allow(clippy::default_trait_access)]
#![allow(clippy::too_many_lines)]

// Re-export prost traits for convenience
pub use prost::Message;

// Generated protobuf modules
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::pedantic)]
pub mod internal {
    //! Internal service-to-service messages and the `CourseService` contract.
    tonic::include_proto!("coursework.internal");
}
