//! Referral code value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// A user's shareable referral code, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferralCode(String);

impl ReferralCode {
    pub fn try_new(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_uppercase();

        if normalized.is_empty() {
            return Err(ValidationError::empty_field("referral_code"));
        }

        if !(4..=32).contains(&normalized.len()) {
            return Err(ValidationError::out_of_range(
                "referral_code_length",
                4,
                32,
                normalized.len() as i64,
            ));
        }

        if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::invalid_format(
                "referral_code",
                "alphanumeric characters only",
            ));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ReferralCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<ReferralCode> for String {
    fn from(value: ReferralCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_uppercase() {
        assert_eq!(ReferralCode::try_new(" alice42 ").unwrap().as_str(), "ALICE42");
    }

    #[test]
    fn rejects_punctuation() {
        assert!(ReferralCode::try_new("ali-ce").is_err());
    }

    #[test]
    fn rejects_blank_and_short() {
        assert!(ReferralCode::try_new("").is_err());
        assert!(ReferralCode::try_new("abc").is_err());
    }
}
