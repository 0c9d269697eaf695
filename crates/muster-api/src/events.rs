//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Upcoming events with registration counts |
//! | `POST` | `/events` | Body: `{"title","starts_at","location","capacity"}` |
//! | `GET`  | `/events/:id` | Event with attendee list; 404 if not found |
//! | `GET`  | `/events/:id/stats` | Occupancy figures; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use muster_core::{
  event::{EventDetail, EventId, EventStats, EventSummary, NewEvent},
  store::EventStore,
};

use crate::error::ApiError;

/// `GET /events`
pub async fn list_upcoming<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<EventSummary>>, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let events = store
    .list_upcoming()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(events))
}

/// `POST /events`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Out-of-range capacity is a client error, not a store fault.
  body
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let event = store
    .add_event(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<EventId>,
) -> Result<Json<EventDetail>, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let detail = store
    .get_event_detail(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(detail))
}

/// `GET /events/:id/stats`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<EventId>,
) -> Result<Json<EventStats>, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let stats = store
    .event_stats(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(stats))
}
