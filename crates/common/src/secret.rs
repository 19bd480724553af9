//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use these types for
//! sensitive values like the JWT signing secret and database URLs.
//!
//! `SecretString` implements `Debug` with redaction, so any struct deriving
//! `Debug` that holds one gets safe logging behavior for free. Secrets are
//! zeroized when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct SigningConfig {
//!     issuer: String,
//!     secret: SecretString,  // Debug shows "[REDACTED]"
//! }
//!
//! let config = SigningConfig {
//!     issuer: "coursework".to_string(),
//!     secret: SecretString::from("hunter2"),
//! };
//!
//! assert!(!format!("{:?}", config).contains("hunter2"));
//! let secret: &str = config.secret.expose_secret();
//! assert_eq!(secret, "hunter2");
//! ```

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretString};
