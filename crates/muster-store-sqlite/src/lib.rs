//! SQLite backend for the Muster registration engine.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime. That thread runs
//! each submitted closure to completion before picking up the next, which is
//! also what serializes the registration decision against concurrent
//! attempts — see [`SqliteStore::register`](muster_core::store::EventStore::register).

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
