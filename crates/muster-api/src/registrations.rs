//! Handlers for registering and cancelling.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/events/:id/register` | Body: `{"user_id":N}`; 201, or 400 with the rejection reason |
//! | `DELETE` | `/events/:id/register` | Body: `{"user_id":N}`; returns the deleted registration, 404 if none |
//!
//! Both handlers check that the user exists before touching the registration
//! path — event existence is part of the registrar's own decision, user
//! existence is the boundary's job.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use muster_core::{
  event::EventId,
  registration::{RegisterOutcome, Registration},
  store::EventStore,
  user::UserId,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegistrationBody {
  pub user_id: UserId,
}

async fn ensure_user_exists<S>(store: &S, user_id: UserId) -> Result<(), ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_user(user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .map(|_| ())
    .ok_or_else(|| ApiError::NotFound(format!("user {user_id} not found")))
}

/// `POST /events/:id/register`
pub async fn register<S>(
  State(store): State<Arc<S>>,
  Path(event_id): Path<EventId>,
  Json(body): Json<RegistrationBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  ensure_user_exists(store.as_ref(), body.user_id).await?;

  let outcome = store
    .register(event_id, body.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  match outcome {
    RegisterOutcome::Registered(registration) => {
      Ok((StatusCode::CREATED, Json(registration)))
    }
    RegisterOutcome::Rejected(rejection) => {
      Err(ApiError::BadRequest(rejection.message().to_string()))
    }
  }
}

/// `DELETE /events/:id/register`
pub async fn cancel<S>(
  State(store): State<Arc<S>>,
  Path(event_id): Path<EventId>,
  Json(body): Json<RegistrationBody>,
) -> Result<Json<Registration>, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  ensure_user_exists(store.as_ref(), body.user_id).await?;

  let cancelled = store
    .cancel(event_id, body.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no registration for user {} on event {event_id}",
        body.user_id
      ))
    })?;
  Ok(Json(cancelled))
}
