//! Quiz Service configuration.
//!
//! The variables are shared with every course-dependent service; only the
//! default bind address is specific to this one.

pub use common::config::{ConfigError, DependentServiceConfig as Config};
use std::collections::HashMap;
use std::env;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8082";

/// Load configuration from environment variables.
pub fn from_env() -> Result<Config, ConfigError> {
    from_vars(&env::vars().collect())
}

/// Load configuration from a HashMap (for testing).
pub fn from_vars(vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
    Config::from_vars(vars, DEFAULT_BIND_ADDRESS)
}
