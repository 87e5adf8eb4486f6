//! Foundation module - Shared domain primitives.
//!
//! Value objects, identifiers, errors and event plumbing used by the
//! coupon, referral, enrollment and payment modules.

mod auth;
mod errors;
mod events;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use ids::{CouponId, CourseId, EnrollmentId, UserId};
pub use money::{Currency, Money};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
