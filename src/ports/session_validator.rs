//! Session validation port for bearer tokens.
//!
//! Implementations must validate the signature and expiry, plus issuer and
//! audience when configured, and map failures to `AuthError`.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validates a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
