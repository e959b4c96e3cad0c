//! Error types for the GO file parser.
//!
//! Both variants are structural errors in the source file and abort the
//! whole parse; everything else the parser meets is tolerated silently.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("accession {0} appears more than once in the input")]
  DuplicateAccession(String),

  #[error("term {0} already has a name; name is a single-value field")]
  DuplicateName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
