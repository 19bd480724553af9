//! Common utilities and types shared across Coursework services.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for bearer credential decoding and verification
pub mod jwt;

/// Module for the course service gRPC client wrapper
pub mod course_client;

/// Module for the validity-then-enrollment authorization gate
pub mod gate;

/// Module for the JSON response envelope
pub mod envelope;

/// Module for tracing and metrics initialization
pub mod observability;

/// Module for configuration shared by course-dependent services
pub mod config;

/// Module for database pool construction
pub mod db;

/// Module for process shutdown signal handling
pub mod shutdown;
