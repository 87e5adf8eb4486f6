//! Application configuration module
//!
//! Configuration is loaded from environment variables with the
//! `COURSE_ENROLLMENT` prefix; nested values are separated by `__`.
//!
//! # Example
//!
//! ```no_run
//! use course_enrollment::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod enrollment;
mod error;
mod payment;
mod redis;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use enrollment::EnrollmentConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address, environment and HTTP limits
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection pool
    pub database: DatabaseConfig,

    /// Redis pub/sub for enrollment notifications
    pub redis: RedisConfig,

    /// Bearer token validation
    pub auth: AuthConfig,

    /// Razorpay credentials
    pub payment: PaymentConfig,

    /// Abandoned checkout sweep
    #[serde(default)]
    pub enrollment: EnrollmentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file is read first if present.
    ///
    /// - `COURSE_ENROLLMENT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COURSE_ENROLLMENT__DATABASE__URL=...` -> `database.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COURSE_ENROLLMENT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        let environment = &self.server.environment;
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.auth.validate(environment)?;
        self.payment.validate(environment)?;
        self.enrollment.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::DEFAULT_NOTIFICATION_CHANNEL;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[(&str, &str)] = &[
        ("COURSE_ENROLLMENT__DATABASE__URL", "postgresql://test@localhost/test"),
        ("COURSE_ENROLLMENT__REDIS__URL", "redis://localhost:6379"),
        ("COURSE_ENROLLMENT__AUTH__JWT_SECRET", "dev-secret"),
        ("COURSE_ENROLLMENT__PAYMENT__RAZORPAY_KEY_ID", "rzp_test_xxx"),
        ("COURSE_ENROLLMENT__PAYMENT__RAZORPAY_KEY_SECRET", "key_secret"),
        ("COURSE_ENROLLMENT__PAYMENT__RAZORPAY_WEBHOOK_SECRET", "whsec_xxx"),
    ];

    const OPTIONAL: &[&str] = &[
        "COURSE_ENROLLMENT__SERVER__PORT",
        "COURSE_ENROLLMENT__SERVER__ENVIRONMENT",
        "COURSE_ENROLLMENT__ENROLLMENT__ABANDONED_AFTER_MINS",
    ];

    fn set_minimal_env() {
        for (key, value) in VARS {
            env::set_var(key, value);
        }
    }

    fn clear_env() {
        for (key, _) in VARS {
            env::remove_var(key);
        }
        for key in OPTIONAL {
            env::remove_var(key);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.payment.razorpay_key_id, "rzp_test_xxx");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.enrollment.abandoned_after_mins, 60);
        assert_eq!(config.redis.notification_channel, DEFAULT_NOTIFICATION_CHANNEL);
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("COURSE_ENROLLMENT__SERVER__PORT", "3000"),
            ("COURSE_ENROLLMENT__ENROLLMENT__ABANDONED_AFTER_MINS", "15"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.enrollment.abandoned_after_mins, 15);
    }

    #[test]
    fn test_production_rejects_test_credentials() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("COURSE_ENROLLMENT__SERVER__ENVIRONMENT", "production")]).unwrap();

        assert!(config.is_production());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_database_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("COURSE_ENROLLMENT__DATABASE__URL");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}
