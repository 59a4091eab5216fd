//! Error types for `meet-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("storage quota exceeded: {needed} bytes needed, {available} available")]
  QuotaExceeded { needed: usize, available: usize },

  #[error("athlete not found: {0}")]
  AthleteNotFound(String),

  #[error("{0:?} matches more than one athlete")]
  AmbiguousAthlete(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
