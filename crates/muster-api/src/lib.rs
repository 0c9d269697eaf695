//! JSON REST API for Muster.
//!
//! Exposes an axum [`Router`] backed by any [`muster_core::store::EventStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", muster_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod events;
pub mod registrations;
pub mod users;

use std::sync::Arc;

use axum::{
  Json,
  Router,
  routing::{get, post},
};
use muster_core::store::EventStore;
use serde_json::json;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: EventStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Liveness
    .route("/health", get(health))
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    // Events
    .route("/events", get(events::list_upcoming::<S>).post(events::create::<S>))
    .route("/events/{id}", get(events::get_one::<S>))
    .route("/events/{id}/stats", get(events::stats::<S>))
    // Registrations
    .route(
      "/events/{id}/register",
      post(registrations::register::<S>).delete(registrations::cancel::<S>),
    )
    .with_state(store)
}

/// `GET /health`
async fn health() -> Json<serde_json::Value> {
  Json(json!({ "status": "ok" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
