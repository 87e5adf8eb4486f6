//! Authentication configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::auth::JwtValidatorConfig;

const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Bearer token validation (HS256 JWT)
#[derive(Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret tokens are signed with
    pub jwt_secret: String,

    /// Required `iss` claim, if set
    pub jwt_issuer: Option<String>,

    /// Required `aud` claim, if set
    pub jwt_audience: Option<String>,
}

impl AuthConfig {
    pub fn validator_config(&self) -> JwtValidatorConfig {
        JwtValidatorConfig {
            secret: SecretString::new(self.jwt_secret.clone()),
            issuer: self.jwt_issuer.clone(),
            audience: self.jwt_audience.clone(),
        }
    }

    /// Validate authentication configuration
    ///
    /// Production requires a secret long enough for HS256.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production
            && self.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ValidationError::WeakJwtSecret);
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .finish()
    }
}
