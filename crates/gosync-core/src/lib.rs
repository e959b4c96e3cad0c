//! Core types and trait definitions for the gosync term store.
//!
//! This crate is deliberately free of database and file-format dependencies.
//! All other crates depend on it; it depends on nothing heavier than serde.

pub mod context;
pub mod error;
pub mod record;
pub mod store;
pub mod term;

pub use error::{Error, Result};
