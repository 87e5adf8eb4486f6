//! Legacy enrollment list port.
//!
//! Mirrors canonical enrollments into the list embedded on the user record.

use async_trait::async_trait;

use crate::domain::enrollment::{LegacyEnrollmentEntry, MirrorOutcome};
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait LegacyEnrollmentMirror: Send + Sync {
    /// Appends the entry unless one for the same course already exists.
    ///
    /// Check and append happen in one statement; concurrent callers may
    /// still produce a duplicate on stores without that guarantee, which
    /// readers tolerate.
    async fn ensure_entry(
        &self,
        user_id: &UserId,
        entry: &LegacyEnrollmentEntry,
    ) -> Result<MirrorOutcome, DomainError>;
}
