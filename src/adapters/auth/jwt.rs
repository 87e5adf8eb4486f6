//! HS256 bearer token validation.
//!
//! Tokens are minted by the platform's identity service with a shared
//! secret. The subject claim is the user id checkout records enrollments
//! under.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

#[derive(Clone)]
pub struct JwtValidatorConfig {
    pub secret: SecretString,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl std::fmt::Debug for JwtValidatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidatorConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    name: Option<String>,
}

pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: JwtValidatorConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let mut required = vec!["exp", "sub"];
        match &config.issuer {
            Some(issuer) => {
                validation.set_issuer(&[issuer]);
                required.push("iss");
            }
            None => validation.iss = None,
        }
        match &config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        validation.set_required_spec_claims(&required);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    tracing::warn!("Token issued for another party: {}", e);
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })?;

        let claims = data.claims;
        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Token has blank subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email, claims.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "test-signing-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        iss: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<&'a str>,
    }

    fn token(sub: &str, exp_offset_secs: i64, iss: Option<&str>, secret: &str) -> String {
        let claims = TestClaims {
            sub,
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
            iss,
            email: Some("learner@example.com"),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn validator(issuer: Option<&str>) -> JwtSessionValidator {
        JwtSessionValidator::new(JwtValidatorConfig {
            secret: SecretString::new(SECRET.to_string()),
            issuer: issuer.map(str::to_string),
            audience: None,
        })
    }

    #[tokio::test]
    async fn valid_token_yields_subject() {
        let user = validator(None)
            .validate(&token("user-42", 3600, None, SECRET))
            .await
            .unwrap();

        assert_eq!(user.id.as_str(), "user-42");
        assert_eq!(user.email.as_deref(), Some("learner@example.com"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let result = validator(None)
            .validate(&token("user-42", -3600, None, SECRET))
            .await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let result = validator(None)
            .validate(&token("user-42", 3600, None, "other-secret"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn issuer_is_enforced_when_configured() {
        let v = validator(Some("https://id.example.com"));

        assert!(v
            .validate(&token("user-42", 3600, Some("https://id.example.com"), SECRET))
            .await
            .is_ok());
        assert!(v
            .validate(&token("user-42", 3600, Some("https://evil.example.com"), SECRET))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        assert!(matches!(
            validator(None).validate("not-a-jwt").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn config_debug_redacts_secret() {
        let config = JwtValidatorConfig {
            secret: SecretString::new(SECRET.to_string()),
            issuer: None,
            audience: None,
        };
        assert!(!format!("{:?}", config).contains(SECRET));
    }
}
