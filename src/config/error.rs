//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A loaded value that is well-typed but unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required setting COURSE_ENROLLMENT__{0}")]
    MissingRequired(&'static str),

    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("database url must start with postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("redis url must start with redis:// or rediss://")]
    InvalidRedisUrl,

    #[error("database min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("database max_connections exceeds 100")]
    PoolSizeTooLarge,

    #[error("jwt secret must be at least 32 bytes in production")]
    WeakJwtSecret,

    #[error("razorpay key id must start with rzp_")]
    InvalidRazorpayKeyId,

    #[error("razorpay api url must use https in production")]
    GatewayUrlMustBeHttps,

    #[error("razorpay test keys are not allowed in production")]
    TestKeyInProduction,

    #[error("abandoned_after_mins must be positive")]
    InvalidAbandonWindow,

    #[error("sweep_interval_secs must be positive")]
    InvalidSweepInterval,
}
