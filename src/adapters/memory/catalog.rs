use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::course::Course;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode};
use crate::ports::CourseCatalog;

use super::poisoned;

#[derive(Default)]
pub struct InMemoryCourseCatalog {
    courses: Mutex<HashMap<CourseId, Course>>,
}

impl InMemoryCourseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(self, course: Course) -> Self {
        self.insert(course);
        self
    }

    pub fn insert(&self, course: Course) {
        if let Ok(mut courses) = self.courses.lock() {
            courses.insert(course.id, course);
        }
    }

    /// Current counter value, for assertions.
    pub fn enrollment_count(&self, id: &CourseId) -> Option<i64> {
        self.courses
            .lock()
            .ok()
            .and_then(|courses| courses.get(id).map(|c| c.enrollment_count))
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourseCatalog {
    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let courses = self.courses.lock().map_err(|_| poisoned())?;
        Ok(courses.get(id).cloned())
    }

    async fn increment_enrollment_count(&self, id: &CourseId) -> Result<(), DomainError> {
        let mut courses = self.courses.lock().map_err(|_| poisoned())?;
        match courses.get_mut(id) {
            Some(course) => {
                course.enrollment_count += 1;
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::CourseNotFound,
                format!("Course not found: {}", id),
            )),
        }
    }
}
