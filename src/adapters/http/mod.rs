//! HTTP adapters - REST API implementations.
//!
//! Each feature module has its own router; [`api_router`] assembles them
//! behind the auth middleware and adds the liveness probe.

pub mod checkout;
pub mod error;
pub mod middleware;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::{json, Value};

pub use checkout::{checkout_router, CheckoutAppState};
pub use error::{ApiError, ErrorResponse};
pub use middleware::{auth_middleware, AuthState, RequireAuth};

/// GET /health - Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Full application router without transport layers.
///
/// Bearer tokens are validated for every `/api` route; handlers that need a
/// user enforce it with [`RequireAuth`].
pub fn api_router(state: CheckoutAppState, auth: AuthState) -> Router {
    Router::new()
        .nest("/api", checkout_router())
        .with_state(state)
        .layer(from_fn_with_state(auth, auth_middleware))
        .route("/health", get(health))
}
