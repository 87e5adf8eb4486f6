//! Redis configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::events::DEFAULT_NOTIFICATION_CHANNEL;

/// Redis connection used for enrollment notifications
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Pub/sub channel enrollment notifications are published on
    #[serde(default = "default_channel")]
    pub notification_channel: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate Redis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.notification_channel.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__NOTIFICATION_CHANNEL"));
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            notification_channel: default_channel(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_channel() -> String {
    DEFAULT_NOTIFICATION_CHANNEL.to_string()
}

fn default_timeout() -> u64 {
    5
}
