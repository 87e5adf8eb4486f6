//! PostgreSQL adapters - Database implementations for store ports.
//!
//! - `PostgresCourseCatalog` - Course lookup and enrollment counter
//! - `PostgresCouponRepository` - Coupon lookup and conditional redemption
//! - `PostgresReferralRepository` - Referral fields on the users table
//! - `PostgresEnrollmentRepository` - Canonical enrollment upserts
//! - `PostgresLegacyMirror` - JSONB enrollment list on the users table
//!
//! Every write that must be race-free is a single statement guarded by its
//! own `WHERE` clause or a unique-key `ON CONFLICT`.

mod coupon_repository;
mod course_catalog;
mod enrollment_repository;
mod legacy_mirror;
mod referral_repository;

pub use coupon_repository::PostgresCouponRepository;
pub use course_catalog::PostgresCourseCatalog;
pub use enrollment_repository::PostgresEnrollmentRepository;
pub use legacy_mirror::PostgresLegacyMirror;
pub use referral_repository::PostgresReferralRepository;

use crate::domain::foundation::{DomainError, ErrorCode};

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "Failed to {}", action);
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

fn corrupt_row(column: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, detail),
    )
}

#[cfg(test)]
mod tests {
    const CHECKOUT_SCHEMA: &str = include_str!("../../../migrations/0001_checkout.sql");

    #[test]
    fn schema_statements_are_rerunnable() {
        for line in CHECKOUT_SCHEMA.lines().map(str::trim) {
            if line.starts_with("CREATE TABLE") || line.starts_with("CREATE INDEX") {
                assert!(line.contains("IF NOT EXISTS"), "{}", line);
            }
        }
    }

    #[test]
    fn invite_count_column_is_integer() {
        let column = CHECKOUT_SCHEMA
            .lines()
            .map(str::trim)
            .find(|l| l.starts_with("invite_count"))
            .unwrap();
        assert!(column.contains("INTEGER"), "{}", column);
    }
}
