//! HTTP middleware for Course Service.

pub mod auth;

pub use auth::{require_auth, AuthState};
