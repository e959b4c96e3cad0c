//! The GO reconciliation engine.
//!
//! Takes the parsed term model (`gosync-obo`), the EC index, and a
//! [`TermStore`](gosync_core::store::TermStore), and drives the store to
//! match the release file: create, update, delete and relink record by
//! record, in three passes (classify, delete, rebuild relationships).
//!
//! The engine never owns the transaction: the caller brackets
//! [`Reconciler::run`] with the store's begin/commit/rollback so the whole
//! run commits or disappears as one unit.

pub mod error;

mod index;
mod mutator;
mod reconcile;
mod report;

pub use error::{Error, Result};
pub use index::TermIndex;
pub use mutator::InstanceMutator;
pub use reconcile::{REFERENCE_SOURCE_NAME, Reconciler};
pub use report::{RunReport, UndeletableRecord};
