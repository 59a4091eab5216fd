//! Error types for the share-link codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no share token in input")]
  MissingToken,

  #[error("token is not valid base64: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
