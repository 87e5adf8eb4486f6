//! Enrollment domain module.
//!
//! - `aggregate` - Enrollment aggregate and payment record
//! - `status` - EnrollmentStatus state machine
//! - `legacy` - Legacy embedded-list entry
//! - `events` - Notifications emitted after reconciliation

mod aggregate;
mod events;
mod legacy;
mod status;

pub use aggregate::{Enrollment, PaymentRecord, PendingOrder, Progress};
pub use events::EnrollmentConfirmed;
pub use legacy::{LegacyEnrollmentEntry, MirrorOutcome};
pub use status::EnrollmentStatus;
