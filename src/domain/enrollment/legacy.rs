//! Entry in the per-user embedded enrollment list.
//!
//! Older clients read enrollments from a list stored on the user record.
//! The list is a mirror of the canonical store, written only by
//! reconciliation. Duplicate entries for a course are tolerated on read.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyEnrollmentEntry {
    pub course_id: CourseId,
    pub enrolled_at: Timestamp,
    pub progress: i16,
}

/// Result of mirroring an enrollment into the legacy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    Appended,
    AlreadyPresent,
}
