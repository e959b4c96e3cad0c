//! Error type for `gosync-engine`.
//!
//! Only two conditions abort a run: the missing reference anchor and a store
//! failure outside any per-record operation (index loads, the anchor
//! lookup). Per-record store failures are caught by the reconciler, logged,
//! and recorded in the report instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("reference source {0:?} is not present in the store")]
  ReferenceDataUnavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
