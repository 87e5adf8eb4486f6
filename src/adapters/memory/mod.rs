//! In-memory store adapters.
//!
//! Each store keeps its rows behind one mutex, so every port operation is
//! atomic the way the corresponding SQL statement is. Used by the test
//! suites and by `COURSE_ENROLLMENT__DATABASE__URL`-less local runs.

mod catalog;
mod coupons;
mod enrollments;
mod legacy_mirror;
mod referrals;

pub use catalog::InMemoryCourseCatalog;
pub use coupons::InMemoryCouponRepository;
pub use enrollments::InMemoryEnrollmentRepository;
pub use legacy_mirror::InMemoryLegacyMirror;
pub use referrals::InMemoryReferralRepository;

use crate::domain::foundation::{DomainError, ErrorCode};

fn poisoned() -> DomainError {
    DomainError::new(ErrorCode::InternalError, "in-memory store lock poisoned")
}
