//! The `EventStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `muster-store-sqlite`).
//! Higher layers (`muster-api`, `muster-server`) depend on this abstraction,
//! not on any concrete backend, which also makes the registration engine
//! testable against an in-memory database.

use std::future::Future;

use crate::{
  event::{Event, EventDetail, EventId, EventStats, EventSummary, NewEvent},
  registration::{RegisterOutcome, Registration},
  user::{NewUser, User, UserId},
};

/// Abstraction over a Muster storage backend.
///
/// Registrations are only ever written through [`register`](Self::register)
/// and removed through [`cancel`](Self::cancel) or a cascading parent delete.
/// Both mutations must be atomic: a rejected or failed attempt leaves no
/// partial effect behind, and the capacity decision is made against the same
/// snapshot the insert commits into.
///
/// Expected negative outcomes are values, not errors: `register` reports
/// rejections inside `Ok`, and `cancel`/lookup methods return `None` for
/// missing rows. `Self::Error` is reserved for store faults.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. Fails if the email is already taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by email. Returns `None` if not found.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// List all users, newest first.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Delete a user and, by cascade, all of their registrations.
  /// Returns `false` if no such user existed.
  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Create and persist a new event after validating its capacity.
  fn add_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Retrieve an event by id. Returns `None` if not found.
  fn get_event(
    &self,
    id: EventId,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Retrieve an event together with its attendee list, in registration
  /// order. Returns `None` if the event does not exist.
  fn get_event_detail(
    &self,
    id: EventId,
  ) -> impl Future<Output = Result<Option<EventDetail>, Self::Error>> + Send + '_;

  /// All events with a start time in the future, each annotated with its
  /// registration count, ordered by start time then location.
  fn list_upcoming(
    &self,
  ) -> impl Future<Output = Result<Vec<EventSummary>, Self::Error>> + Send + '_;

  /// Delete an event and, by cascade, all registrations for it.
  /// Returns `false` if no such event existed.
  fn delete_event(
    &self,
    id: EventId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Registrations ─────────────────────────────────────────────────────

  /// Attempt to register `user_id` for `event_id`.
  ///
  /// The whole decision — event exists and is in the future, no duplicate,
  /// seats left — and the insert execute as one atomic unit, serialized
  /// against every other registration attempt for the same event. With N
  /// seats left and more than N concurrent callers, exactly N succeed and
  /// the rest observe [`Rejection::EventFull`].
  fn register(
    &self,
    event_id: EventId,
    user_id: UserId,
  ) -> impl Future<Output = Result<RegisterOutcome, Self::Error>> + Send + '_;

  /// Cancel the registration of `user_id` for `event_id`, returning the
  /// deleted row. Returns `None` if no such registration exists — cancelling
  /// twice is safe, the second call simply reports the miss.
  fn cancel(
    &self,
    event_id: EventId,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<Registration>, Self::Error>> + Send + '_;

  /// Occupancy stats for an event, from a single consistent read.
  /// Returns `None` if the event does not exist.
  fn event_stats(
    &self,
    event_id: EventId,
  ) -> impl Future<Output = Result<Option<EventStats>, Self::Error>> + Send + '_;
}
