//! Run-scoped context.
//!
//! Everything a reconciliation run shares across its components lives here
//! and is passed by reference; nothing outlives the run.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The authorship stamp recorded on every record a run creates or modifies.
#[derive(Debug, Clone)]
pub struct EditStamp {
  pub run_id:     Uuid,
  pub author:     String,
  pub started_at: DateTime<Utc>,
}

impl EditStamp {
  pub fn new(author: impl Into<String>) -> Self {
    EditStamp {
      run_id:     Uuid::new_v4(),
      author:     author.into(),
      started_at: Utc::now(),
    }
  }
}

/// Context threaded through the index, mutator and reconciler for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
  pub stamp: EditStamp,
  /// Record id of the reference-source anchor every GO term links to.
  pub reference_source: i64,
}

impl RunContext {
  pub fn new(stamp: EditStamp, reference_source: i64) -> Self {
    RunContext {
      stamp,
      reference_source,
    }
  }
}
