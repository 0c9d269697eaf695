//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings with fixed six-digit
//! fractional seconds and a `Z` suffix. The fixed width matters: the schema
//! compares timestamps in SQL (`starts_at > ?now`), and only a uniform
//! format makes lexicographic string order equal chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use muster_core::{
  event::{Attendee, Event},
  registration::Registration,
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:    i64,
  pub name:       String,
  pub email:      String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    self.user_id,
      name:       self.name,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub event_id:   i64,
  pub title:      String,
  pub starts_at:  String,
  pub location:   String,
  pub capacity:   i64,
  pub created_at: String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:   self.event_id,
      title:      self.title,
      starts_at:  decode_dt(&self.starts_at)?,
      location:   self.location,
      capacity:   self.capacity as u32,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `registrations` row.
pub struct RawRegistration {
  pub registration_id: i64,
  pub event_id:        i64,
  pub user_id:         i64,
  pub registered_at:   String,
}

impl RawRegistration {
  pub fn into_registration(self) -> Result<Registration> {
    Ok(Registration {
      registration_id: self.registration_id,
      event_id:        self.event_id,
      user_id:         self.user_id,
      registered_at:   decode_dt(&self.registered_at)?,
    })
  }
}

/// Raw values for one attendee row in the event detail view.
pub struct RawAttendee {
  pub user_id:       i64,
  pub name:          String,
  pub email:         String,
  pub registered_at: String,
}

impl RawAttendee {
  pub fn into_attendee(self) -> Result<Attendee> {
    Ok(Attendee {
      user_id:       self.user_id,
      name:          self.name,
      email:         self.email,
      registered_at: decode_dt(&self.registered_at)?,
    })
  }
}
