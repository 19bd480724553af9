//! Quiz Service Library
//!
//! Course quizzes with automatic grading of multiple-choice submissions.
//! Every operation passes the authorization gate before touching the quiz
//! store.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `models` - Quiz, question and submission models
//! - `repositories` - Database access
//! - `routes` - Axum router setup
//! - `services` - Grading

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
