//! Identity of the caller, as established by the `SessionValidator` port.

use super::UserId;
use thiserror::Error;

/// Learner behind a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Enrollments are keyed by this id.
    pub id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: Option<String>, display_name: Option<String>) -> Self {
        Self {
            id,
            email,
            display_name,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Malformed token, bad signature, wrong issuer or audience.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// The caller's credentials are at fault, as opposed to the backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::ServiceUnavailable(_))
    }
}
