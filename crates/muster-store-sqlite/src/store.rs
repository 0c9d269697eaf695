//! [`SqliteStore`] — the SQLite implementation of [`EventStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use muster_core::{
  event::{Event, EventDetail, EventId, EventStats, EventSummary, NewEvent},
  registration::{RegisterOutcome, Registration, Rejection},
  store::EventStore,
  user::{NewUser, User, UserId},
};

use crate::{
  Error, Result,
  encode::{RawAttendee, RawEvent, RawRegistration, RawUser, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Muster store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every
/// closure submitted through it runs to completion on the connection thread
/// before the next one starts, so a multi-statement closure can never
/// interleave with another caller's statements. The register path leans on
/// this: its whole read-check-insert sequence lives in one closure, inside
/// one immediate transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Result of the register transaction closure, before it is translated into
/// a domain outcome on the async side.
enum RegisterTx {
  Registered(RawRegistration),
  Rejected(Rejection),
  Overfull { count: i64, capacity: i64 },
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let email_for_err = input.email.clone();
    let now_str = encode_dt(Utc::now());

    // The connection thread runs this closure alone, so check-then-insert
    // cannot race another create; the UNIQUE index is the backstop.
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let taken: Option<i64> = conn
          .query_row(
            "SELECT user_id FROM users WHERE email = ?1",
            rusqlite::params![input.email],
            |r| r.get(0),
          )
          .optional()?;
        if taken.is_some() {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO users (name, email, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![input.name, input.email, now_str],
        )?;

        Ok(Some(RawUser {
          user_id:    conn.last_insert_rowid(),
          name:       input.name,
          email:      input.email,
          created_at: now_str,
        }))
      })
      .await?;

    raw
      .map(RawUser::into_user)
      .transpose()?
      .ok_or(Error::EmailTaken(email_for_err))
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, email, created_at FROM users WHERE user_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  name:       row.get(1)?,
                  email:      row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, email, created_at FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  name:       row.get(1)?,
                  email:      row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, name, email, created_at FROM users
           ORDER BY created_at DESC, user_id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawUser {
              user_id:    row.get(0)?,
              name:       row.get(1)?,
              email:      row.get(2)?,
              created_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute("DELETE FROM users WHERE user_id = ?1", rusqlite::params![id])?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn add_event(&self, input: NewEvent) -> Result<Event> {
    input.validate()?;

    let now_str = encode_dt(Utc::now());
    let starts_str = encode_dt(input.starts_at);

    let raw: RawEvent = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (title, starts_at, location, capacity, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![input.title, starts_str, input.location, input.capacity, now_str],
        )?;

        Ok(RawEvent {
          event_id:   conn.last_insert_rowid(),
          title:      input.title,
          starts_at:  starts_str,
          location:   input.location,
          capacity:   i64::from(input.capacity),
          created_at: now_str,
        })
      })
      .await?;

    raw.into_event()
  }

  async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT event_id, title, starts_at, location, capacity, created_at
               FROM events WHERE event_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawEvent {
                  event_id:   row.get(0)?,
                  title:      row.get(1)?,
                  starts_at:  row.get(2)?,
                  location:   row.get(3)?,
                  capacity:   row.get(4)?,
                  created_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn get_event_detail(&self, id: EventId) -> Result<Option<EventDetail>> {
    let raw: Option<(RawEvent, Vec<RawAttendee>)> = self
      .conn
      .call(move |conn| {
        let event = conn
          .query_row(
            "SELECT event_id, title, starts_at, location, capacity, created_at
             FROM events WHERE event_id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(RawEvent {
                event_id:   row.get(0)?,
                title:      row.get(1)?,
                starts_at:  row.get(2)?,
                location:   row.get(3)?,
                capacity:   row.get(4)?,
                created_at: row.get(5)?,
              })
            },
          )
          .optional()?;

        let Some(event) = event else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT u.user_id, u.name, u.email, r.registered_at
           FROM users u
           JOIN registrations r ON r.user_id = u.user_id
           WHERE r.event_id = ?1
           ORDER BY r.registered_at, r.registration_id",
        )?;
        let attendees = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(RawAttendee {
              user_id:       row.get(0)?,
              name:          row.get(1)?,
              email:         row.get(2)?,
              registered_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((event, attendees)))
      })
      .await?;

    let Some((event, attendees)) = raw else {
      return Ok(None);
    };

    Ok(Some(EventDetail {
      event:     event.into_event()?,
      attendees: attendees
        .into_iter()
        .map(RawAttendee::into_attendee)
        .collect::<Result<_>>()?,
    }))
  }

  async fn list_upcoming(&self) -> Result<Vec<EventSummary>> {
    let now_str = encode_dt(Utc::now());

    let raws: Vec<(RawEvent, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT e.event_id, e.title, e.starts_at, e.location, e.capacity, e.created_at,
                  COUNT(r.user_id)
           FROM events e
           LEFT JOIN registrations r ON r.event_id = e.event_id
           WHERE e.starts_at > ?1
           GROUP BY e.event_id
           ORDER BY e.starts_at ASC, e.location ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![now_str], |row| {
            Ok((
              RawEvent {
                event_id:   row.get(0)?,
                title:      row.get(1)?,
                starts_at:  row.get(2)?,
                location:   row.get(3)?,
                capacity:   row.get(4)?,
                created_at: row.get(5)?,
              },
              row.get::<_, i64>(6)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, count)| {
        Ok(EventSummary {
          event:              raw.into_event()?,
          registration_count: count as u32,
        })
      })
      .collect()
  }

  async fn delete_event(&self, id: EventId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let n =
          conn.execute("DELETE FROM events WHERE event_id = ?1", rusqlite::params![id])?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  // ── Registrations ─────────────────────────────────────────────────────────

  async fn register(&self, event_id: EventId, user_id: UserId) -> Result<RegisterOutcome> {
    let now_str = encode_dt(Utc::now());

    let step = self
      .conn
      .call(move |conn| {
        // One immediate transaction around the whole decision. Dropping it
        // on any early return rolls it back; rejection paths mutate nothing.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // 1. The event must exist and still lie in the future.
        let capacity: Option<i64> = tx
          .query_row(
            "SELECT capacity FROM events WHERE event_id = ?1 AND starts_at > ?2",
            rusqlite::params![event_id, now_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(capacity) = capacity else {
          return Ok(RegisterTx::Rejected(Rejection::EventNotFoundOrPast));
        };

        // 2. At most one active registration per (user, event).
        let duplicate: Option<i64> = tx
          .query_row(
            "SELECT registration_id FROM registrations
             WHERE event_id = ?1 AND user_id = ?2",
            rusqlite::params![event_id, user_id],
            |r| r.get(0),
          )
          .optional()?;
        if duplicate.is_some() {
          return Ok(RegisterTx::Rejected(Rejection::AlreadyRegistered));
        }

        // 3. The capacity decision, against the same snapshot the insert
        //    commits into. A count above capacity is never reported as
        //    merely "full".
        let count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM registrations WHERE event_id = ?1",
          rusqlite::params![event_id],
          |r| r.get(0),
        )?;
        if count > capacity {
          return Ok(RegisterTx::Overfull { count, capacity });
        }
        if count == capacity {
          return Ok(RegisterTx::Rejected(Rejection::EventFull));
        }

        // 4. Claim the seat.
        tx.execute(
          "INSERT INTO registrations (event_id, user_id, registered_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![event_id, user_id, now_str],
        )?;
        let raw = RawRegistration {
          registration_id: tx.last_insert_rowid(),
          event_id,
          user_id,
          registered_at: now_str,
        };

        tx.commit()?;
        Ok(RegisterTx::Registered(raw))
      })
      .await?;

    match step {
      RegisterTx::Registered(raw) => Ok(RegisterOutcome::Registered(raw.into_registration()?)),
      RegisterTx::Rejected(rejection) => Ok(RegisterOutcome::Rejected(rejection)),
      RegisterTx::Overfull { count, capacity } => {
        Err(Error::CapacityInvariant { event_id, count, capacity })
      }
    }
  }

  async fn cancel(&self, event_id: EventId, user_id: UserId) -> Result<Option<Registration>> {
    // Single statement — the row is gone and returned in one step, so two
    // racing cancels can never both report the same registration.
    let raw: Option<RawRegistration> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "DELETE FROM registrations WHERE event_id = ?1 AND user_id = ?2
               RETURNING registration_id, event_id, user_id, registered_at",
              rusqlite::params![event_id, user_id],
              |row| {
                Ok(RawRegistration {
                  registration_id: row.get(0)?,
                  event_id:        row.get(1)?,
                  user_id:         row.get(2)?,
                  registered_at:   row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRegistration::into_registration).transpose()
  }

  async fn event_stats(&self, event_id: EventId) -> Result<Option<EventStats>> {
    let row: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT e.capacity, COUNT(r.user_id)
               FROM events e
               LEFT JOIN registrations r ON r.event_id = e.event_id
               WHERE e.event_id = ?1
               GROUP BY e.event_id, e.capacity",
              rusqlite::params![event_id],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((capacity, count)) = row else {
      return Ok(None);
    };
    if count > capacity {
      return Err(Error::CapacityInvariant { event_id, count, capacity });
    }

    Ok(Some(EventStats::from_counts(capacity as u32, count as u32)))
  }
}
