//! The existing-instance index: every stored GO record, grouped by
//! accession.
//!
//! The index is a snapshot. The reconciler loads it once for classification
//! and again after the deletion pass: relationship rebuilding against a
//! stale snapshot would relink records that no longer exist.

use std::collections::HashMap;

use gosync_core::{
  record::{GoSubtype, RecordClass, StoredRecord},
  store::TermStore,
};

use crate::{Error, Result};

/// Accession → stored records. List-valued: several records may share an
/// accession, and all of them take part in reconciliation.
pub struct TermIndex {
  by_accession: HashMap<String, Vec<StoredRecord>>,
}

impl TermIndex {
  /// Query the store for all records of the GO classes and group them.
  pub async fn load<S: TermStore>(store: &S) -> Result<Self> {
    let mut by_accession: HashMap<String, Vec<StoredRecord>> = HashMap::new();

    for subtype in GoSubtype::ALL {
      let records = store
        .list_records(RecordClass::Go(subtype))
        .await
        .map_err(Error::store)?;
      tracing::info!(
        class = %subtype,
        count = records.len(),
        "loaded GO records"
      );

      for record in records {
        let Some(accession) = record.accession.clone() else {
          tracing::warn!(
            record_id = record.record_id,
            "GO record without accession left out of the index"
          );
          continue;
        };
        by_accession.entry(accession).or_default().push(record);
      }
    }

    Ok(TermIndex { by_accession })
  }

  /// The records stored under `accession`, if any.
  pub fn records_for(&self, accession: &str) -> Option<&[StoredRecord]> {
    self.by_accession.get(accession).map(Vec::as_slice)
  }

  pub fn contains(&self, accession: &str) -> bool {
    self.by_accession.contains_key(accession)
  }
}
