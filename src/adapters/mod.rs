//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session validators (JWT, mock)
//! - `events` - Notification publishers (in-memory, Redis, detached)
//! - `http` - Axum routers, handlers and middleware
//! - `memory` - In-memory stores for tests and local runs
//! - `postgres` - PostgreSQL store implementations
//! - `razorpay` - Payment gateway (Razorpay Orders API, mock)

pub mod auth;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod razorpay;

pub use events::{DetachedPublisher, InMemoryEventBus, RedisEventPublisher};
