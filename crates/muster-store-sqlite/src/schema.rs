//! SQL schema for the Muster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The schema carries the registration invariants as backstops: the unique
/// (user, event) pair, the capacity range check, and the cascading foreign
/// keys that remove registrations atomically with their parent row.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS users (
    user_id    INTEGER PRIMARY KEY,
    name       TEXT NOT NULL,
    email      TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL    -- RFC 3339 UTC, fixed-width fractional seconds
);

CREATE TABLE IF NOT EXISTS events (
    event_id   INTEGER PRIMARY KEY,
    title      TEXT NOT NULL,
    starts_at  TEXT NOT NULL,
    location   TEXT NOT NULL,
    capacity   INTEGER NOT NULL CHECK (capacity >= 1 AND capacity <= 1000),
    created_at TEXT NOT NULL
);

-- One row per seat taken. Rows are inserted only by the register
-- transaction and removed only by cancel or a cascading parent delete.
CREATE TABLE IF NOT EXISTS registrations (
    registration_id INTEGER PRIMARY KEY,
    event_id        INTEGER NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    user_id         INTEGER NOT NULL REFERENCES users(user_id)   ON DELETE CASCADE,
    registered_at   TEXT NOT NULL,
    UNIQUE (user_id, event_id)
);

CREATE INDEX IF NOT EXISTS events_starts_at_idx      ON events(starts_at);
CREATE INDEX IF NOT EXISTS events_location_idx       ON events(location);
CREATE INDEX IF NOT EXISTS registrations_event_idx   ON registrations(event_id);

PRAGMA user_version = 1;
";
