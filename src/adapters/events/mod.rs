//! Notification sink adapters.
//!
//! - `InMemoryEventBus` - Captures envelopes for test assertions
//! - `RedisEventPublisher` - Redis pub/sub channel for downstream consumers
//! - `DetachedPublisher` - Spawns delivery so callers never wait on the sink

mod detached;
mod in_memory;
mod redis_publisher;

pub use detached::DetachedPublisher;
pub use in_memory::InMemoryEventBus;
pub use redis_publisher::{RedisEventPublisher, DEFAULT_NOTIFICATION_CHANNEL};
