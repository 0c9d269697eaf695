//! Error types for `muster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("capacity {0} is out of range (1..=1000)")]
  CapacityOutOfRange(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
