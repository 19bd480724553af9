//! Forum Service configuration.
//!
//! The variables are shared with every course-dependent service; only the
//! default bind address is specific to this one.

pub use common::config::{ConfigError, DependentServiceConfig as Config};
use std::collections::HashMap;
use std::env;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Load configuration from environment variables.
pub fn from_env() -> Result<Config, ConfigError> {
    from_vars(&env::vars().collect())
}

/// Load configuration from a HashMap (for testing).
pub fn from_vars(vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
    Config::from_vars(vars, DEFAULT_BIND_ADDRESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_address() {
        let vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://localhost/forum_test".to_string(),
            ),
            ("JWT_SECRET".to_string(), "test-secret".to_string()),
        ]);

        let config = from_vars(&vars).unwrap();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }
}
