//! The run report: counts, categorised log entries, and the list of records
//! an operator has to look at by hand.

use std::fmt;

use gosync_core::record::StoredRecord;

/// A record that was obsolete or mismatched but could not be deleted, kept
/// for manual follow-up.
#[derive(Debug)]
pub struct UndeletableRecord {
  pub record_id: i64,
  pub accession: String,
  /// The records whose edges block the deletion.
  pub referrers: Vec<StoredRecord>,
}

/// Everything one reconciliation run has to say for itself.
#[derive(Debug, Default)]
pub struct RunReport {
  /// Raw line count of the GO file; filled in by the driver from the
  /// parsed file.
  pub lines_read: usize,
  /// `[Term]` stanza count; filled in by the driver from the parsed file.
  pub terms_read: usize,

  pub new_terms:        usize,
  pub updated:          usize,
  pub mismatches:       usize,
  pub obsolete:         usize,
  pub deleted:          usize,
  pub pending_obsolete: usize,

  /// One line per created term: record id, accession, name.
  pub new_term_log:               Vec<String>,
  /// Subset of the above for molecular-function terms.
  pub new_molecular_functions:    Vec<String>,
  pub name_or_definition_changes: Vec<String>,
  pub category_mismatches:        Vec<String>,
  pub obsoletion_warnings:        Vec<String>,
  pub deletions:                  Vec<String>,
  pub relationship_log:           Vec<String>,
  /// Per-record failures that were skipped, with context.
  pub errors:                     Vec<String>,

  pub undeletable: Vec<UndeletableRecord>,
}

impl fmt::Display for RunReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !self.category_mismatches.is_empty() {
      writeln!(f, "*** Category mismatches ***")?;
      for line in &self.category_mismatches {
        writeln!(f, "{line}")?;
      }
      writeln!(f)?;
    }
    if !self.obsoletion_warnings.is_empty() {
      writeln!(f, "*** Obsoletion warnings ***")?;
      for line in &self.obsoletion_warnings {
        writeln!(f, "{line}")?;
      }
      writeln!(f)?;
    }
    if !self.deletions.is_empty() {
      writeln!(f, "*** Deletions ***")?;
      for line in &self.deletions {
        writeln!(f, "{line}")?;
      }
      writeln!(f)?;
    }
    if !self.errors.is_empty() {
      writeln!(f, "*** Errors ***")?;
      for line in &self.errors {
        writeln!(f, "{line}")?;
      }
      writeln!(f)?;
    }
    for entry in &self.undeletable {
      writeln!(
        f,
        "GO:{} (record {}) could not be deleted because it has {} \
         referrer(s):",
        entry.accession,
        entry.record_id,
        entry.referrers.len()
      )?;
      for referrer in &entry.referrers {
        writeln!(
          f,
          "\t{} (record {})",
          referrer.display_name.as_deref().unwrap_or("?"),
          referrer.record_id
        )?;
      }
    }

    writeln!(f, "{} lines from the file were processed.", self.lines_read)?;
    writeln!(f, "{} GO terms were read from the file.", self.terms_read)?;
    writeln!(
      f,
      "{} new GO terms were found (and added to the database).",
      self.new_terms
    )?;
    writeln!(
      f,
      "{} GO terms had name or definition changes (and were updated).",
      self.updated
    )?;
    writeln!(
      f,
      "{} existing GO term records had mismatched categories when compared \
       to the file (and were deleted from the database).",
      self.mismatches
    )?;
    writeln!(
      f,
      "{} were obsolete. {} were actually deleted, and {} could not be \
       deleted due to existing referrers.",
      self.obsolete,
      self.deleted,
      self.undeletable.len()
    )?;
    writeln!(
      f,
      "{} are pending obsolescence (and will probably be deleted at a \
       future date).",
      self.pending_obsolete
    )
  }
}
