//! Forum Service Library
//!
//! Course discussion boards: posts, threaded comments and votes. Every
//! operation is scoped to a course and passes the authorization gate
//! (course validity, then credential, then enrollment) before touching the
//! forum store.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> gate (course service gRPC)
//!                               \-> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `models` - Data models and request validation
//! - `repositories` - Database access
//! - `routes` - Axum router setup

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
