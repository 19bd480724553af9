//! Course Service configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default gRPC bind address.
pub const DEFAULT_GRPC_BIND_ADDRESS: &str = "0.0.0.0:50051";

/// Default bound on in-flight gRPC check requests.
pub const DEFAULT_GRPC_MAX_CONCURRENT_REQUESTS: usize = 10;

/// Default database pool size.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;

/// Course Service configuration.
///
/// Database URL and signing secret are redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// HTTP server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// gRPC server bind address (default: "0.0.0.0:50051").
    pub grpc_bind_address: String,

    /// Shared secret used to verify bearer credentials (HS256).
    pub jwt_secret: SecretString,

    /// JWT clock skew tolerance in seconds.
    pub jwt_clock_skew_seconds: u64,

    /// Maximum concurrent gRPC check requests.
    pub grpc_max_concurrent_requests: usize,

    /// Maximum database pool connections.
    pub db_max_connections: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("grpc_bind_address", &self.grpc_bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field(
                "grpc_max_concurrent_requests",
                &self.grpc_max_concurrent_requests,
            )
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
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
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let grpc_bind_address = vars
            .get("COURSE_GRPC_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_GRPC_BIND_ADDRESS.to_string());

        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{value_str}': {e}"
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidJwtClockSkew(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got 0".to_string(),
                ));
            }

            if value > MAX_CLOCK_SKEW.as_secs() {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {value}",
                    MAX_CLOCK_SKEW.as_secs()
                )));
            }

            value
        } else {
            DEFAULT_CLOCK_SKEW.as_secs()
        };

        let grpc_max_concurrent_requests = parse_positive(
            vars,
            "COURSE_GRPC_MAX_CONCURRENT_REQUESTS",
            DEFAULT_GRPC_MAX_CONCURRENT_REQUESTS,
        )?;

        let db_max_connections =
            parse_positive(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        Ok(Config {
            database_url,
            bind_address,
            grpc_bind_address,
            jwt_secret,
            jwt_clock_skew_seconds,
            grpc_max_concurrent_requests,
            db_max_connections,
        })
    }

    /// Clock skew tolerance as a `Duration`.
    pub fn jwt_clock_skew(&self) -> Duration {
        Duration::from_secs(self.jwt_clock_skew_seconds)
    }
}

/// Parse an optional positive integer variable, falling back to `default`.
fn parse_positive<T>(
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://localhost/course_test".to_string(),
            ),
            ("JWT_SECRET".to_string(), "test-secret".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert_eq!(config.database_url, "postgresql://localhost/course_test");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.grpc_bind_address, DEFAULT_GRPC_BIND_ADDRESS);
        assert_eq!(config.jwt_secret.expose_secret(), "test-secret");
        assert_eq!(config.jwt_clock_skew_seconds, DEFAULT_CLOCK_SKEW.as_secs());
        assert_eq!(
            config.grpc_max_concurrent_requests,
            DEFAULT_GRPC_MAX_CONCURRENT_REQUESTS
        );
        assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert(
            "COURSE_GRPC_BIND_ADDRESS".to_string(),
            "127.0.0.1:50052".to_string(),
        );
        vars.insert("JWT_CLOCK_SKEW_SECONDS".to_string(), "120".to_string());
        vars.insert(
            "COURSE_GRPC_MAX_CONCURRENT_REQUESTS".to_string(),
            "32".to_string(),
        );
        vars.insert("DB_MAX_CONNECTIONS".to_string(), "5".to_string());

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.grpc_bind_address, "127.0.0.1:50052");
        assert_eq!(config.jwt_clock_skew(), Duration::from_secs(120));
        assert_eq!(config.grpc_max_concurrent_requests, 32);
        assert_eq!(config.db_max_connections, 5);
    }

    #[test]
    fn test_from_vars_missing_database_url() {
        let mut vars = base_vars();
        vars.remove("DATABASE_URL");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "DATABASE_URL"));
    }

    #[test]
    fn test_from_vars_missing_jwt_secret() {
        let mut vars = base_vars();
        vars.insert("JWT_SECRET".to_string(), String::new());

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "JWT_SECRET"));
    }

    #[test]
    fn test_jwt_clock_skew_rejects_zero() {
        let mut vars = base_vars();
        vars.insert("JWT_CLOCK_SKEW_SECONDS".to_string(), "0".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwtClockSkew(msg)) if msg.contains("must be positive"))
        );
    }

    #[test]
    fn test_jwt_clock_skew_rejects_too_large() {
        let mut vars = base_vars();
        vars.insert("JWT_CLOCK_SKEW_SECONDS".to_string(), "601".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwtClockSkew(msg)) if msg.contains("must not exceed 600"))
        );
    }

    #[test]
    fn test_grpc_concurrency_rejects_zero() {
        let mut vars = base_vars();
        vars.insert(
            "COURSE_GRPC_MAX_CONCURRENT_REQUESTS".to_string(),
            "0".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidValue(name, _)) if name == "COURSE_GRPC_MAX_CONCURRENT_REQUESTS")
        );
    }

    #[test]
    fn test_db_max_connections_rejects_garbage() {
        let mut vars = base_vars();
        vars.insert("DB_MAX_CONNECTIONS".to_string(), "lots".to_string());

        assert!(Config::from_vars(&vars).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_vars(&base_vars()).unwrap();
        let debug_str = format!("{:?}", config);

        assert!(!debug_str.contains("course_test"));
        assert!(!debug_str.contains("test-secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
