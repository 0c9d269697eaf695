//! Registration — the sole unit of "a seat taken".
//!
//! A registration is created only through [`crate::store::EventStore::register`]
//! and destroyed only by explicit cancellation or cascade deletion of its
//! parent user or event. No other write path exists, which is what makes the
//! capacity invariant enforceable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{event::EventId, user::UserId};

/// Integer surrogate key for a registration.
pub type RegistrationId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
  pub registration_id: RegistrationId,
  pub event_id:        EventId,
  pub user_id:         UserId,
  pub registered_at:   DateTime<Utc>,
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why a registration attempt was refused.
///
/// Rejections are expected outcomes, not faults: they travel inside `Ok` and
/// never abort anything beyond the single attempted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
  /// The event does not exist, or its start time is no longer in the future.
  EventNotFoundOrPast,
  /// The user already holds an active registration for this event.
  AlreadyRegistered,
  /// Every seat is taken.
  EventFull,
}

impl Rejection {
  pub fn message(self) -> &'static str {
    match self {
      Rejection::EventNotFoundOrPast => "event not found or has already passed",
      Rejection::AlreadyRegistered => "user is already registered for this event",
      Rejection::EventFull => "event is at full capacity",
    }
  }
}

/// The result of a registration attempt that reached the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterOutcome {
  Registered(Registration),
  Rejected(Rejection),
}

impl RegisterOutcome {
  /// The committed registration, if the attempt succeeded.
  pub fn registration(self) -> Option<Registration> {
    match self {
      RegisterOutcome::Registered(r) => Some(r),
      RegisterOutcome::Rejected(_) => None,
    }
  }

  /// The rejection reason, if the attempt was refused.
  pub fn rejection(&self) -> Option<Rejection> {
    match self {
      RegisterOutcome::Registered(_) => None,
      RegisterOutcome::Rejected(r) => Some(*r),
    }
  }
}
