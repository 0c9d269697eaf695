//! Error type for `muster-store-sqlite`.

use muster_core::event::EventId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] muster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to create a user with an email that is already registered.
  #[error("email already in use: {0}")]
  EmailTaken(String),

  /// The registration count for an event exceeds its capacity. This can only
  /// happen if the serialization of the register path is broken; it is
  /// surfaced loudly instead of being corrected.
  #[error("event {event_id} has {count} registrations but capacity {capacity}")]
  CapacityInvariant {
    event_id: EventId,
    count:    i64,
    capacity: i64,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
