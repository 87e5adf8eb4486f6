//! Percentage discounts on minor-unit prices.
//!
//! Rounding is half-up on the discounted amount: `(nominal * (100 - pct) + 50) / 100`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Percent off a price, 1 through 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if !(1..=100).contains(&value) {
            return Err(ValidationError::out_of_range(
                "percent_off",
                1,
                100,
                value as i64,
            ));
        }
        Ok(Self(value))
    }

    /// Const constructor for fixed rates; out-of-range values fail the build.
    pub const fn new_const(value: u8) -> Self {
        assert!(value >= 1 && value <= 100, "percent_off must be 1..=100");
        Self(value)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DiscountPercent {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<DiscountPercent> for u8 {
    fn from(value: DiscountPercent) -> Self {
        value.0
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Applies a percentage discount to a non-negative minor-unit amount.
///
/// Negative inputs clamp to zero. The result never exceeds the input.
pub fn apply_percent_off(nominal_minor: i64, percent: DiscountPercent) -> i64 {
    let nominal = i128::from(nominal_minor.max(0));
    let keep = i128::from(100 - percent.value());
    let discounted = (nominal * keep + 50) / 100;
    // `discounted <= nominal <= i64::MAX`, so the narrowing cannot fail.
    i64::try_from(discounted).unwrap_or(nominal_minor.max(0))
}
