//! Error types for `jobtrail-core`.
//!
//! Every variant is a validation failure: the payload was rejected before it
//! reached a storage backend.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("invalid status: {0:?}")]
  InvalidStatus(String),

  #[error("invalid date: {0:?}")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
