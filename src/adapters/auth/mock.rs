//! Token table standing in for the identity service in tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Resolves tokens from a fixed table; anything else is `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    users: HashMap<String, AuthenticatedUser>,
    outage: Option<AuthError>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.users.insert(token.into(), user);
        self
    }

    /// Maps `token` to a learner with a generated email. A blank id is
    /// skipped, so the token stays invalid.
    pub fn with_test_user(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        match UserId::new(&user_id) {
            Ok(id) => self.with_user(
                token,
                AuthenticatedUser::new(id, Some(format!("{}@learners.test", user_id)), None),
            ),
            Err(_) => self,
        }
    }

    /// Every validation fails with `error`.
    pub fn with_error(mut self, error: AuthError) -> Self {
        self.outage = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = &self.outage {
            return Err(error.clone());
        }
        self.users.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}
