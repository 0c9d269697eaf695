//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use muster_core::{
  event::NewEvent,
  registration::{RegisterOutcome, Rejection},
  store::EventStore,
  user::NewUser,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(n: u32) -> NewUser {
  NewUser {
    name:  format!("User {n}"),
    email: format!("user{n}@example.com"),
  }
}

/// An event one week out.
fn future_event(capacity: u32) -> NewEvent {
  NewEvent {
    title:     "Rust meetup".into(),
    starts_at: Utc::now() + Duration::days(7),
    location:  "Austin".into(),
    capacity,
  }
}

/// An event that already happened.
fn past_event(capacity: u32) -> NewEvent {
  NewEvent {
    starts_at: Utc::now() - Duration::days(1),
    ..future_event(capacity)
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;

  let user = s.add_user(new_user(1)).await.unwrap();
  assert_eq!(user.email, "user1@example.com");

  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, user.user_id);
  assert_eq!(fetched.name, "User 1");
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(42).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_refused() {
  let s = store().await;
  s.add_user(new_user(1)).await.unwrap();

  let err = s.add_user(new_user(1)).await.unwrap_err();
  assert!(matches!(err, Error::EmailTaken(ref e) if e == "user1@example.com"));
}

#[tokio::test]
async fn find_user_by_email() {
  let s = store().await;
  let user = s.add_user(new_user(1)).await.unwrap();

  let found = s.find_user_by_email("user1@example.com").await.unwrap().unwrap();
  assert_eq!(found.user_id, user.user_id);

  assert!(s.find_user_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn list_users_newest_first() {
  let s = store().await;
  let first = s.add_user(new_user(1)).await.unwrap();
  let second = s.add_user(new_user(2)).await.unwrap();

  let users = s.list_users().await.unwrap();
  assert_eq!(users.len(), 2);
  assert_eq!(users[0].user_id, second.user_id);
  assert_eq!(users[1].user_id, first.user_id);
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_event() {
  let s = store().await;

  let event = s.add_event(future_event(100)).await.unwrap();
  assert_eq!(event.capacity, 100);

  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  assert_eq!(fetched.event_id, event.event_id);
  assert_eq!(fetched.title, "Rust meetup");
  assert_eq!(fetched.location, "Austin");
}

#[tokio::test]
async fn event_capacity_is_validated() {
  let s = store().await;

  let err = s.add_event(future_event(0)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(muster_core::Error::CapacityOutOfRange(0))
  ));

  let err = s.add_event(future_event(1001)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(muster_core::Error::CapacityOutOfRange(1001))
  ));

  assert!(s.add_event(future_event(1000)).await.is_ok());
}

#[tokio::test]
async fn get_event_missing_returns_none() {
  let s = store().await;
  assert!(s.get_event(7).await.unwrap().is_none());
}

// ─── Registering ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_creates_a_registration() {
  let s = store().await;
  let user = s.add_user(new_user(1)).await.unwrap();
  let event = s.add_event(future_event(10)).await.unwrap();

  let outcome = s.register(event.event_id, user.user_id).await.unwrap();
  let registration = outcome.registration().expect("should be registered");
  assert_eq!(registration.event_id, event.event_id);
  assert_eq!(registration.user_id, user.user_id);
}

#[tokio::test]
async fn register_twice_rejects_duplicate() {
  let s = store().await;
  let user = s.add_user(new_user(1)).await.unwrap();
  let event = s.add_event(future_event(10)).await.unwrap();

  let first = s.register(event.event_id, user.user_id).await.unwrap();
  assert!(first.rejection().is_none());

  let second = s.register(event.event_id, user.user_id).await.unwrap();
  assert_eq!(second.rejection(), Some(Rejection::AlreadyRegistered));

  // Still exactly one seat taken.
  let stats = s.event_stats(event.event_id).await.unwrap().unwrap();
  assert_eq!(stats.total_registrations, 1);
}

#[tokio::test]
async fn register_for_past_event_is_rejected() {
  let s = store().await;
  let user = s.add_user(new_user(1)).await.unwrap();
  let event = s.add_event(past_event(10)).await.unwrap();

  let outcome = s.register(event.event_id, user.user_id).await.unwrap();
  assert_eq!(outcome.rejection(), Some(Rejection::EventNotFoundOrPast));
}

#[tokio::test]
async fn register_for_unknown_event_is_rejected() {
  let s = store().await;
  let user = s.add_user(new_user(1)).await.unwrap();

  let outcome = s.register(999, user.user_id).await.unwrap();
  assert_eq!(outcome.rejection(), Some(Rejection::EventNotFoundOrPast));
}

#[tokio::test]
async fn register_on_full_event_is_rejected() {
  let s = store().await;
  let event = s.add_event(future_event(1)).await.unwrap();
  let u1 = s.add_user(new_user(1)).await.unwrap();
  let u2 = s.add_user(new_user(2)).await.unwrap();

  assert!(s.register(event.event_id, u1.user_id).await.unwrap().rejection().is_none());

  let outcome = s.register(event.event_id, u2.user_id).await.unwrap();
  assert_eq!(outcome.rejection(), Some(Rejection::EventFull));
}

#[tokio::test]
async fn concurrent_registrations_never_exceed_capacity() {
  let s = store().await;
  let event = s.add_event(future_event(3)).await.unwrap();

  // Two seats already taken, four callers race for the last one.
  let mut user_ids = Vec::new();
  for n in 1..=6 {
    user_ids.push(s.add_user(new_user(n)).await.unwrap().user_id);
  }
  for uid in &user_ids[..2] {
    assert!(s.register(event.event_id, *uid).await.unwrap().rejection().is_none());
  }

  let mut handles = Vec::new();
  for uid in &user_ids[2..] {
    let s = s.clone();
    let (event_id, uid) = (event.event_id, *uid);
    handles.push(tokio::spawn(async move { s.register(event_id, uid).await.unwrap() }));
  }

  let mut registered = 0;
  let mut full = 0;
  for handle in handles {
    match handle.await.unwrap() {
      RegisterOutcome::Registered(_) => registered += 1,
      RegisterOutcome::Rejected(Rejection::EventFull) => full += 1,
      other => panic!("unexpected outcome: {other:?}"),
    }
  }
  assert_eq!(registered, 1);
  assert_eq!(full, 3);

  let stats = s.event_stats(event.event_id).await.unwrap().unwrap();
  assert_eq!(stats.total_registrations, 3);
  assert_eq!(stats.remaining_capacity, 0);
}

#[tokio::test]
async fn three_callers_two_seats() {
  let s = store().await;
  let event = s.add_event(future_event(2)).await.unwrap();

  let mut handles = Vec::new();
  for n in 1..=3 {
    let uid = s.add_user(new_user(n)).await.unwrap().user_id;
    let s = s.clone();
    let event_id = event.event_id;
    handles.push(tokio::spawn(async move { s.register(event_id, uid).await.unwrap() }));
  }

  let mut registered = 0;
  let mut full = 0;
  for handle in handles {
    match handle.await.unwrap() {
      RegisterOutcome::Registered(_) => registered += 1,
      RegisterOutcome::Rejected(Rejection::EventFull) => full += 1,
      other => panic!("unexpected outcome: {other:?}"),
    }
  }
  assert_eq!(registered, 2);
  assert_eq!(full, 1);

  let stats = s.event_stats(event.event_id).await.unwrap().unwrap();
  assert_eq!(stats.total_registrations, 2);
  assert_eq!(stats.remaining_capacity, 0);
  assert_eq!(stats.percentage_used, 100.00);
}

// ─── Cancelling ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancel_returns_deleted_registration_then_none() {
  let s = store().await;
  let user = s.add_user(new_user(1)).await.unwrap();
  let event = s.add_event(future_event(5)).await.unwrap();

  let registration = s
    .register(event.event_id, user.user_id)
    .await
    .unwrap()
    .registration()
    .unwrap();

  let cancelled = s.cancel(event.event_id, user.user_id).await.unwrap().unwrap();
  assert_eq!(cancelled.registration_id, registration.registration_id);

  // Idempotent: the second cancel is a miss, not an error.
  assert!(s.cancel(event.event_id, user.user_id).await.unwrap().is_none());

  let stats = s.event_stats(event.event_id).await.unwrap().unwrap();
  assert_eq!(stats.total_registrations, 0);
}

#[tokio::test]
async fn cancel_nonexistent_registration_returns_none() {
  let s = store().await;
  let user = s.add_user(new_user(1)).await.unwrap();
  let event = s.add_event(future_event(5)).await.unwrap();

  assert!(s.cancel(event.event_id, user.user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn cancel_frees_the_seat() {
  let s = store().await;
  let event = s.add_event(future_event(1)).await.unwrap();
  let u1 = s.add_user(new_user(1)).await.unwrap();
  let u2 = s.add_user(new_user(2)).await.unwrap();

  assert!(s.register(event.event_id, u1.user_id).await.unwrap().rejection().is_none());
  assert_eq!(
    s.register(event.event_id, u2.user_id).await.unwrap().rejection(),
    Some(Rejection::EventFull)
  );

  s.cancel(event.event_id, u1.user_id).await.unwrap().unwrap();

  // The freed seat is immediately visible to the next attempt.
  assert!(s.register(event.event_id, u2.user_id).await.unwrap().rejection().is_none());
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_for_unknown_event_returns_none() {
  let s = store().await;
  assert!(s.event_stats(404).await.unwrap().is_none());
}

#[tokio::test]
async fn stats_reflect_committed_registrations() {
  let s = store().await;
  let event = s.add_event(future_event(4)).await.unwrap();

  let stats = s.event_stats(event.event_id).await.unwrap().unwrap();
  assert_eq!(stats.total_registrations, 0);
  assert_eq!(stats.remaining_capacity, 4);
  assert_eq!(stats.percentage_used, 0.0);

  let user = s.add_user(new_user(1)).await.unwrap();
  s.register(event.event_id, user.user_id).await.unwrap();

  let stats = s.event_stats(event.event_id).await.unwrap().unwrap();
  assert_eq!(stats.capacity, 4);
  assert_eq!(stats.total_registrations, 1);
  assert_eq!(stats.remaining_capacity, 3);
  assert_eq!(stats.percentage_used, 25.00);
}

// ─── Upcoming events ─────────────────────────────────────────────────────────

#[tokio::test]
async fn upcoming_events_ordered_by_start_then_location() {
  let s = store().await;
  let t1 = Utc::now() + Duration::days(3);
  let t2 = Utc::now() + Duration::days(5);

  // Inserted out of order on purpose.
  let c = s
    .add_event(NewEvent {
      title:     "C".into(),
      starts_at: t2,
      location:  "Albany".into(),
      capacity:  10,
    })
    .await
    .unwrap();
  let b = s
    .add_event(NewEvent {
      title:     "B".into(),
      starts_at: t1,
      location:  "Boston".into(),
      capacity:  10,
    })
    .await
    .unwrap();
  let a = s
    .add_event(NewEvent {
      title:     "A".into(),
      starts_at: t1,
      location:  "Austin".into(),
      capacity:  10,
    })
    .await
    .unwrap();
  // A past event must not appear at all.
  s.add_event(past_event(10)).await.unwrap();

  let upcoming = s.list_upcoming().await.unwrap();
  let ids: Vec<_> = upcoming.iter().map(|e| e.event.event_id).collect();
  assert_eq!(ids, vec![a.event_id, b.event_id, c.event_id]);
}

#[tokio::test]
async fn upcoming_events_carry_registration_counts() {
  let s = store().await;
  let busy = s.add_event(future_event(10)).await.unwrap();
  let quiet = s
    .add_event(NewEvent {
      location: "Boston".into(),
      ..future_event(10)
    })
    .await
    .unwrap();

  for n in 1..=2 {
    let uid = s.add_user(new_user(n)).await.unwrap().user_id;
    s.register(busy.event_id, uid).await.unwrap();
  }

  let upcoming = s.list_upcoming().await.unwrap();
  assert_eq!(upcoming.len(), 2);

  let count_of = |id| {
    upcoming
      .iter()
      .find(|e| e.event.event_id == id)
      .unwrap()
      .registration_count
  };
  assert_eq!(count_of(busy.event_id), 2);
  assert_eq!(count_of(quiet.event_id), 0);
}

// ─── Event detail ────────────────────────────────────────────────────────────

#[tokio::test]
async fn event_detail_lists_attendees_in_registration_order() {
  let s = store().await;
  let event = s.add_event(future_event(10)).await.unwrap();

  let mut expected = Vec::new();
  for n in 1..=3 {
    let user = s.add_user(new_user(n)).await.unwrap();
    s.register(event.event_id, user.user_id).await.unwrap();
    expected.push(user.user_id);
  }

  let detail = s.get_event_detail(event.event_id).await.unwrap().unwrap();
  assert_eq!(detail.event.event_id, event.event_id);

  let attendee_ids: Vec<_> = detail.attendees.iter().map(|a| a.user_id).collect();
  assert_eq!(attendee_ids, expected);
  assert_eq!(detail.attendees[0].email, "user1@example.com");
}

#[tokio::test]
async fn event_detail_missing_returns_none() {
  let s = store().await;
  assert!(s.get_event_detail(11).await.unwrap().is_none());
}

// ─── Cascade deletes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_an_event_removes_its_registrations() {
  let s = store().await;
  let event = s.add_event(future_event(5)).await.unwrap();
  let user = s.add_user(new_user(1)).await.unwrap();
  s.register(event.event_id, user.user_id).await.unwrap();

  assert!(s.delete_event(event.event_id).await.unwrap());

  assert!(s.event_stats(event.event_id).await.unwrap().is_none());
  assert!(s.cancel(event.event_id, user.user_id).await.unwrap().is_none());
  // The user itself is untouched.
  assert!(s.get_user(user.user_id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_user_frees_their_seat() {
  let s = store().await;
  let event = s.add_event(future_event(1)).await.unwrap();
  let u1 = s.add_user(new_user(1)).await.unwrap();
  let u2 = s.add_user(new_user(2)).await.unwrap();

  s.register(event.event_id, u1.user_id).await.unwrap();
  assert!(s.delete_user(u1.user_id).await.unwrap());

  let stats = s.event_stats(event.event_id).await.unwrap().unwrap();
  assert_eq!(stats.total_registrations, 0);

  // The seat is claimable again.
  assert!(s.register(event.event_id, u2.user_id).await.unwrap().rejection().is_none());
}

#[tokio::test]
async fn delete_missing_rows_returns_false() {
  let s = store().await;
  assert!(!s.delete_user(3).await.unwrap());
  assert!(!s.delete_event(3).await.unwrap());
}
