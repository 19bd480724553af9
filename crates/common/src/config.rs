//! Configuration shared by services that depend on the course service.
//!
//! Forum and quiz read the same variables and differ only in their default
//! bind address. Sensitive fields are redacted in Debug output.

use crate::course_client::DEFAULT_COURSE_RPC_TIMEOUT;
use crate::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use crate::secret::SecretString;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default course service gRPC endpoint.
pub const DEFAULT_COURSE_SERVICE_ENDPOINT: &str = "http://localhost:50051";

/// Default database pool size.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Configuration of a course-dependent service.
#[derive(Clone)]
pub struct DependentServiceConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// HTTP server bind address.
    pub bind_address: String,

    /// Shared secret used to verify bearer credentials (HS256).
    pub jwt_secret: SecretString,

    /// JWT clock skew tolerance in seconds.
    pub jwt_clock_skew_seconds: u64,

    /// Course service gRPC endpoint (`host:port` or URL).
    pub course_service_endpoint: String,

    /// Per-call timeout for course checks, in milliseconds.
    pub course_service_timeout_ms: u64,

    /// Maximum database pool connections.
    pub db_max_connections: u32,
}

impl fmt::Debug for DependentServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependentServiceConfig")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("course_service_endpoint", &self.course_service_endpoint)
            .field("course_service_timeout_ms", &self.course_service_timeout_ms)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

impl DependentServiceConfig {
    /// Load configuration from a variable map, binding to
    /// `default_bind_address` unless `BIND_ADDRESS` is set.
    ///
    /// # Errors
    ///
    /// - `MissingEnvVar` - `DATABASE_URL` or `JWT_SECRET` is absent
    /// - `InvalidValue` - a numeric variable is not positive or the skew is too large
    pub fn from_vars(
        vars: &HashMap<String, String>,
        default_bind_address: &str,
    ) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let jwt_secret = vars
            .get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        let jwt_secret = SecretString::from(jwt_secret.as_str());

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| default_bind_address.to_string());

        let course_service_endpoint = vars
            .get("COURSE_SERVICE_ENDPOINT")
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_COURSE_SERVICE_ENDPOINT.to_string());

        let jwt_clock_skew_seconds = parse_positive(
            vars,
            "JWT_CLOCK_SKEW_SECONDS",
            DEFAULT_CLOCK_SKEW.as_secs(),
        )?;
        if jwt_clock_skew_seconds > MAX_CLOCK_SKEW.as_secs() {
            return Err(ConfigError::InvalidValue(
                "JWT_CLOCK_SKEW_SECONDS".to_string(),
                format!(
                    "must not exceed {} seconds, got {jwt_clock_skew_seconds}",
                    MAX_CLOCK_SKEW.as_secs()
                ),
            ));
        }

        let default_timeout_ms =
            u64::try_from(DEFAULT_COURSE_RPC_TIMEOUT.as_millis()).unwrap_or(3000);
        let course_service_timeout_ms =
            parse_positive(vars, "COURSE_SERVICE_TIMEOUT_MS", default_timeout_ms)?;

        let db_max_connections =
            parse_positive(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        Ok(Self {
            database_url,
            bind_address,
            jwt_secret,
            jwt_clock_skew_seconds,
            course_service_endpoint,
            course_service_timeout_ms,
            db_max_connections,
        })
    }

    #[must_use]
    pub fn jwt_clock_skew(&self) -> Duration {
        Duration::from_secs(self.jwt_clock_skew_seconds)
    }

    #[must_use]
    pub fn course_service_timeout(&self) -> Duration {
        Duration::from_millis(self.course_service_timeout_ms)
    }
}

/// Parse an optional positive integer variable, falling back to `default`.
///
/// # Errors
///
/// Returns `InvalidValue` when the variable is present but not a positive number.
pub fn parse_positive<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(value_str) = vars.get(name) else {
        return Ok(default);
    };

    match value_str.parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("must be a positive integer, got '{value_str}'"),
        )),
    }
}
