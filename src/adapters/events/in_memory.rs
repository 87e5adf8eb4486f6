//! Recording notification sink.
//!
//! Keeps every envelope in publish order so tests can assert on what the
//! reconciler announced. Not wired in production.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Default)]
pub struct InMemoryEventBus {
    published: Mutex<Vec<EventEnvelope>>,
    unavailable: AtomicBool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publish fails with `CacheError`.
    pub fn failing() -> Self {
        let bus = Self::new();
        bus.unavailable.store(true, Ordering::SeqCst);
        bus
    }

    /// Snapshot of everything published so far.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.published.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        !self.events_of_type(event_type).is_empty()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.published.lock() {
            events.clear();
        }
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::CacheError,
                format!("Notification sink unavailable for {}", event.event_type),
            ));
        }

        let mut events = self.published.lock().map_err(|_| {
            DomainError::new(ErrorCode::InternalError, "event bus lock poisoned")
        })?;
        events.push(event);
        Ok(())
    }
}
