//! Course Service Library
//!
//! The course service owns courses and enrollment records. It is the
//! authority that dependent services (forum, quiz) consult before every
//! protected action.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! grpc/*.rs     ----------------------------------> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `grpc` - Enrollment, validity and course-name RPCs
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer credential verification
//! - `models` - Data models
//! - `repositories` - Database access
//! - `routes` - Axum router setup
//! - `services` - Bulk enrollment planning

pub mod config;
pub mod errors;
pub mod grpc;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
