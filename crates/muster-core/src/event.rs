//! Event — a capacity-bounded occasion participants register for.
//!
//! Capacity is fixed at creation; there is no resize operation. The seat
//! count an event has left is never stored as a mutable field — it is always
//! derived by counting live registrations at decision time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, user::UserId};

/// Integer surrogate key for an event.
pub type EventId = i64;

/// Smallest capacity an event may declare.
pub const CAPACITY_MIN: u32 = 1;
/// Largest capacity an event may declare.
pub const CAPACITY_MAX: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:   EventId,
  pub title:      String,
  pub starts_at:  DateTime<Utc>,
  pub location:   String,
  pub capacity:   u32,
  pub created_at: DateTime<Utc>,
}

/// Input for creating an event. The id and creation timestamp are assigned
/// by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
  pub title:     String,
  pub starts_at: DateTime<Utc>,
  pub location:  String,
  pub capacity:  u32,
}

impl NewEvent {
  /// Check the declared capacity against the allowed range.
  pub fn validate(&self) -> Result<()> {
    if !(CAPACITY_MIN..=CAPACITY_MAX).contains(&self.capacity) {
      return Err(Error::CapacityOutOfRange(self.capacity));
    }
    Ok(())
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// An upcoming event annotated with its current registration count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
  #[serde(flatten)]
  pub event:              Event,
  pub registration_count: u32,
}

/// One registered participant of an event, as shown in the detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
  pub user_id:       UserId,
  pub name:          String,
  pub email:         String,
  pub registered_at: DateTime<Utc>,
}

/// An event together with everyone registered for it, in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetail {
  #[serde(flatten)]
  pub event:     Event,
  pub attendees: Vec<Attendee>,
}

/// Occupancy figures for a single event, computed from one consistent read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStats {
  pub capacity:            u32,
  pub total_registrations: u32,
  pub remaining_capacity:  u32,
  pub percentage_used:     f64,
}

impl EventStats {
  /// Derive the stats from a capacity and a live registration count.
  ///
  /// The caller must have verified `total <= capacity`; the count comes from
  /// the same read as the capacity, so a violation there is a store bug, not
  /// something to paper over here.
  pub fn from_counts(capacity: u32, total: u32) -> Self {
    let ratio = f64::from(total) / f64::from(capacity) * 100.0;
    Self {
      capacity,
      total_registrations: total,
      remaining_capacity: capacity - total,
      percentage_used: (ratio * 100.0).round() / 100.0,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_event(capacity: u32) -> NewEvent {
    NewEvent {
      title:     "Rust meetup".into(),
      starts_at: Utc::now(),
      location:  "Austin".into(),
      capacity,
    }
  }

  #[test]
  fn capacity_bounds() {
    assert!(new_event(0).validate().is_err());
    assert!(new_event(1).validate().is_ok());
    assert!(new_event(1000).validate().is_ok());
    assert!(new_event(1001).validate().is_err());
  }

  #[test]
  fn stats_rounding_to_two_decimals() {
    // 1/3 of 150 seats: 33.333...% rounds to 33.33.
    let stats = EventStats::from_counts(150, 50);
    assert_eq!(stats.percentage_used, 33.33);
    assert_eq!(stats.remaining_capacity, 100);

    // 2/3 of 3 seats: 66.666...% rounds half away to 66.67.
    let stats = EventStats::from_counts(3, 2);
    assert_eq!(stats.percentage_used, 66.67);
  }

  #[test]
  fn stats_full_event_is_exactly_one_hundred() {
    let stats = EventStats::from_counts(2, 2);
    assert_eq!(stats.percentage_used, 100.00);
    assert_eq!(stats.remaining_capacity, 0);
  }

  #[test]
  fn stats_empty_event_is_zero() {
    let stats = EventStats::from_counts(10, 0);
    assert_eq!(stats.percentage_used, 0.0);
    assert_eq!(stats.remaining_capacity, 10);
  }
}
