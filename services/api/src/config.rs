//! Service settings layered from defaults and `RIDESHARE_*` environment variables

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Settings for the API service
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Minutes after creation at which a ride request expires
    pub request_ttl_minutes: i64,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Settings {
    /// Load settings from the environment on top of the built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("bind_addr", "0.0.0.0:3001")?
            .set_default("request_ttl_minutes", 30)?
            .set_default("log_filter", "info")?
            .add_source(Environment::with_prefix("RIDESHARE").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if settings.request_ttl_minutes <= 0 {
            return Err(ConfigError::Message(format!(
                "RIDESHARE_REQUEST_TTL_MINUTES must be positive, got {}",
                settings.request_ttl_minutes
            )));
        }

        Ok(settings)
    }

    pub fn request_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.request_ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        unsafe {
            env::remove_var("RIDESHARE_BIND_ADDR");
            env::remove_var("RIDESHARE_REQUEST_TTL_MINUTES");
            env::remove_var("RIDESHARE_LOG_FILTER");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let settings = Settings::load().unwrap();

        assert_eq!(settings.bind_addr, "0.0.0.0:3001");
        assert_eq!(settings.request_ttl_minutes, 30);
        assert_eq!(settings.log_filter, "info");
        assert_eq!(settings.request_ttl(), chrono::Duration::minutes(30));
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            env::set_var("RIDESHARE_BIND_ADDR", "127.0.0.1:8080");
            env::set_var("RIDESHARE_REQUEST_TTL_MINUTES", "45");
        }

        let settings = Settings::load().unwrap();

        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
        assert_eq!(settings.request_ttl_minutes, 45);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_non_positive_ttl() {
        clear_env();
        unsafe {
            env::set_var("RIDESHARE_REQUEST_TTL_MINUTES", "0");
        }

        assert!(Settings::load().is_err());

        clear_env();
    }
}
