//! Redis pub/sub notification sink.
//!
//! Each envelope is serialized to JSON and `PUBLISH`ed on one channel.
//! Downstream mailers and analytics subscribe to that channel; nothing is
//! retained if no subscriber is listening.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// Default channel for enrollment notifications.
pub const DEFAULT_NOTIFICATION_CHANNEL: &str = "course-enrollment.notifications";

#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel: String,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection, channel: impl Into<String>) -> Self {
        Self {
            conn,
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize {}: {}", event.event_type, e),
            )
        })?;

        let mut conn = self.conn.clone();
        let receivers: i64 = conn
            .publish(&self.channel, payload)
            .await
            .map_err(|e: redis::RedisError| {
                DomainError::new(ErrorCode::CacheError, format!("Redis publish failed: {}", e))
            })?;

        tracing::debug!(
            event_type = %event.event_type,
            event_id = %event.event_id,
            channel = %self.channel,
            receivers,
            "Notification published"
        );
        Ok(())
    }
}
