//! User — a participant who can hold registrations.
//!
//! Users are created once and are immutable thereafter as far as this crate
//! is concerned. The email address is unique across the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Integer surrogate key for a user.
pub type UserId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    UserId,
  pub name:       String,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// Input for creating a user. The id and timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub name:  String,
  pub email: String,
}
