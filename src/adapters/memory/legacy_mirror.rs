use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::enrollment::{LegacyEnrollmentEntry, MirrorOutcome};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::LegacyEnrollmentMirror;

use super::poisoned;

#[derive(Default)]
pub struct InMemoryLegacyMirror {
    lists: Mutex<HashMap<UserId, Vec<LegacyEnrollmentEntry>>>,
}

impl InMemoryLegacyMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's embedded list as older clients would read it.
    pub fn entries(&self, user_id: &UserId) -> Vec<LegacyEnrollmentEntry> {
        self.lists
            .lock()
            .ok()
            .and_then(|lists| lists.get(user_id).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LegacyEnrollmentMirror for InMemoryLegacyMirror {
    async fn ensure_entry(
        &self,
        user_id: &UserId,
        entry: &LegacyEnrollmentEntry,
    ) -> Result<MirrorOutcome, DomainError> {
        let mut lists = self.lists.lock().map_err(|_| poisoned())?;
        let list = lists.entry(user_id.clone()).or_default();

        if list.iter().any(|e| e.course_id == entry.course_id) {
            return Ok(MirrorOutcome::AlreadyPresent);
        }
        list.push(entry.clone());
        Ok(MirrorOutcome::Appended)
    }
}
