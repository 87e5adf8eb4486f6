//! Enrollment lifecycle configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Abandoned checkout sweep settings
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentConfig {
    /// Minutes a pending enrollment may sit unpaid before it is cancelled
    #[serde(default = "default_abandoned_after")]
    pub abandoned_after_mins: i64,

    /// Seconds between sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl EnrollmentConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.abandoned_after_mins <= 0 {
            return Err(ValidationError::InvalidAbandonWindow);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            abandoned_after_mins: default_abandoned_after(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_abandoned_after() -> i64 {
    60
}

fn default_sweep_interval() -> u64 {
    300
}
