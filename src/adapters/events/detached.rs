//! Fire-and-forget wrapper around another publisher.
//!
//! `publish` hands the envelope to a spawned task and returns immediately,
//! so a slow or unavailable sink never delays the caller. Failures are
//! logged from the task.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Clone)]
pub struct DetachedPublisher {
    inner: Arc<dyn EventPublisher>,
}

impl DetachedPublisher {
    pub fn new(inner: Arc<dyn EventPublisher>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl EventPublisher for DetachedPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let event_type = event.event_type.clone();
            let event_id = event.event_id.clone();
            if let Err(e) = inner.publish(event).await {
                tracing::warn!(
                    event_type = %event_type,
                    event_id = %event_id,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use std::time::Duration;

    fn envelope() -> EventEnvelope {
        EventEnvelope::new("enrollment.confirmed.v1", "enr-1", "Enrollment", serde_json::json!({}))
    }

    #[tokio::test]
    async fn delivers_in_background() {
        let bus = Arc::new(InMemoryEventBus::new());
        let detached = DetachedPublisher::new(bus.clone());

        detached.publish(envelope()).await.unwrap();

        for _ in 0..50 {
            if bus.event_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(bus.event_count(), 1);
    }

    #[tokio::test]
    async fn inner_failure_is_not_reported_to_caller() {
        let detached = DetachedPublisher::new(Arc::new(InMemoryEventBus::failing()));
        assert!(detached.publish(envelope()).await.is_ok());
    }
}
