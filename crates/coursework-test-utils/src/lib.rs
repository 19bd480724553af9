//! # Coursework Test Utilities
//!
//! Shared test utilities for the Coursework services.
//!
//! This crate provides:
//! - Credential minting signed with a fixed test secret (`tokens`)
//! - An in-process gRPC course authority (`MockCourseAuthority`)
//! - Server harnesses for E2E tests (`TestCourseServer`, `TestForumServer`,
//!   `TestQuizServer`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coursework_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations/forum")]
//! async fn test_example(pool: PgPool) -> Result<()> {
//!     let courses = Arc::new(MockCourseCheck::new().with_course(1, "Algorithms"));
//!     let server = TestForumServer::spawn(pool, courses).await?;
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/v1/courses/1/discussions", server.url()))
//!         .bearer_auth(mint_token("alice"))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 401);
//!     Ok(())
//! }
//! ```

pub mod course_authority;
pub mod server_harness;
pub mod tokens;

// Re-export commonly used items
pub use course_authority::*;
pub use server_harness::*;
pub use tokens::*;
