//! Course catalog port.
//!
//! The catalog is owned elsewhere; checkout reads courses and bumps their
//! enrollment counter.

use async_trait::async_trait;

use crate::domain::course::Course;
use crate::domain::foundation::{CourseId, DomainError};

#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    /// Atomically increments the course's enrollment counter by one.
    async fn increment_enrollment_count(&self, id: &CourseId) -> Result<(), DomainError>;
}
