//! Error types for `gosync-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown link attribute: {0:?}")]
  UnknownLinkAttr(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
