//! Coupon code value object and the request-side input shape.
//!
//! Codes are compared case-insensitively by normalizing to trimmed
//! uppercase before any lookup.
//!
//! # Validation Rules
//!
//! - 3-32 characters after trimming
//! - ASCII alphanumerics, `-` and `_` only

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 32;

/// A normalized coupon code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalizes and validates a raw code.
    pub fn try_new(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_uppercase();

        if normalized.is_empty() {
            return Err(ValidationError::empty_field("coupon_code"));
        }

        let len = normalized.chars().count();
        if !(MIN_LEN..=MAX_LEN).contains(&len) {
            return Err(ValidationError::out_of_range(
                "coupon_code_length",
                MIN_LEN as i64,
                MAX_LEN as i64,
                len as i64,
            ));
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::invalid_format(
                "coupon_code",
                "letters, digits, '-' and '_' only",
            ));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CouponCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<CouponCode> for String {
    fn from(value: CouponCode) -> Self {
        value.0
    }
}

/// Coupon field as clients send it.
///
/// Browsers post either a string (possibly comma-joined) or an array of
/// strings. Everything funnels through [`CouponCodeInput::into_single`] so
/// the rest of the crate only ever sees zero or one [`CouponCode`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CouponCodeInput {
    One(String),
    Many(Vec<String>),
}

impl CouponCodeInput {
    /// Collapses the input to at most one validated code.
    ///
    /// Blank entries are dropped. More than one remaining code is rejected;
    /// discounts never stack.
    pub fn into_single(self) -> Result<Option<CouponCode>, ValidationError> {
        self.into_single_entry()?
            .map(|raw| CouponCode::try_new(&raw))
            .transpose()
    }

    /// Like [`CouponCodeInput::into_single`] but leaves the one remaining
    /// entry unvalidated, for callers that treat a malformed code as no code.
    pub fn into_single_entry(self) -> Result<Option<String>, ValidationError> {
        let raw: Vec<String> = match self {
            CouponCodeInput::One(s) => s.split(',').map(str::to_string).collect(),
            CouponCodeInput::Many(items) => items
                .iter()
                .flat_map(|s| s.split(','))
                .map(str::to_string)
                .collect(),
        };

        let mut codes = raw.into_iter().filter(|s| !s.trim().is_empty());

        let first = match codes.next() {
            Some(first) => first,
            None => return Ok(None),
        };

        if codes.next().is_some() {
            return Err(ValidationError::invalid_format(
                "coupon_code",
                "only one coupon code can be applied per order",
            ));
        }

        Ok(Some(first))
    }
}
