//! The reconciliation driver: classify every parsed term, execute the
//! deferred deletions, then rebuild relationships against a fresh index.

use std::collections::HashMap;

use gosync_core::{
  context::{EditStamp, RunContext},
  record::{LinkAttr, RecordClass, StoredRecord},
  store::TermStore,
  term::{GoNamespace, ParsedTerm, RelationshipKind},
};

use crate::{
  Error, Result, TermIndex,
  mutator::InstanceMutator,
  report::{RunReport, UndeletableRecord},
};

/// Name of the reference-source anchor record every GO term links to.
pub const REFERENCE_SOURCE_NAME: &str = "GO";

/// A record flagged for removal during classification. The replacement is
/// resolved at delete time, from the term's successor fields.
struct DeletionItem {
  record:    StoredRecord,
  accession: String,
}

pub struct Reconciler<'a, S> {
  store: &'a S,
  ctx:   RunContext,
}

impl<'a, S: TermStore> Reconciler<'a, S> {
  /// Resolve the reference-source anchor and build the run context.
  ///
  /// Fails with [`Error::ReferenceDataUnavailable`] before any mutation
  /// when the anchor record is missing.
  pub async fn new(store: &'a S, stamp: EditStamp) -> Result<Self> {
    let anchors = store
      .find_by_name(RecordClass::ReferenceSource, REFERENCE_SOURCE_NAME)
      .await
      .map_err(Error::store)?;
    let Some(anchor) = anchors.first() else {
      return Err(Error::ReferenceDataUnavailable(
        REFERENCE_SOURCE_NAME.to_string(),
      ));
    };
    tracing::info!(
      record_id = anchor.record_id,
      "resolved the GO reference source"
    );

    Ok(Reconciler {
      store,
      ctx: RunContext::new(stamp, anchor.record_id),
    })
  }

  /// Run the full reconciliation. Per-record store failures are recorded in
  /// the report and skipped; only index loads abort the run.
  pub async fn run(
    &self,
    terms: &HashMap<String, ParsedTerm>,
    ec_index: &HashMap<String, Vec<String>>,
  ) -> Result<RunReport> {
    let mutator = InstanceMutator::new(self.store, &self.ctx);
    let mut report = RunReport::default();
    let mut deletions: Vec<DeletionItem> = Vec::new();

    let index = TermIndex::load(self.store).await?;

    // ── Pass 1: classification ──────────────────────────────────────────
    for (accession, term) in terms {
      if !term.is_obsolete && !term.pending_obsolete {
        self
          .classify_live(&mutator, term, ec_index, &index, &mut report)
          .await;
      } else if term.pending_obsolete {
        if index.contains(accession) {
          report.pending_obsolete += 1;
          let consider = if term.consider.is_empty() {
            String::new()
          } else {
            format!(" Consider: {}", term.consider.join(", "))
          };
          report.obsoletion_warnings.push(format!(
            "GO:{accession} is marked as PENDING obsolete. Consider \
             searching for a replacement.{consider}"
          ));
        }
      } else if let Some(records) = index.records_for(accession) {
        report.obsolete += 1;
        self
          .classify_obsolete(term, records, &mut deletions, &mut report)
          .await;
      }
    }

    // ── Pass 2: deferred deletions ──────────────────────────────────────
    tracing::info!(count = deletions.len(), "deleting flagged records");
    self
      .delete_flagged(&mutator, terms, &index, deletions, &mut report)
      .await;

    // Reload: records were created and deleted above, and the relationship
    // pass must only ever see survivors.
    let index = TermIndex::load(self.store).await?;

    // ── Pass 3: relationship rebuild ────────────────────────────────────
    tracing::info!("updating relationships of GO records");
    self
      .rebuild_relationships(&mutator, terms, &index, &mut report)
      .await;

    Ok(report)
  }

  // ── Classification ────────────────────────────────────────────────────────

  /// Handle one term that carries no obsolescence flag: create, update, or
  /// correct the category, then fold away secondary-accession records.
  async fn classify_live(
    &self,
    mutator: &InstanceMutator<'_, S>,
    term: &ParsedTerm,
    ec_index: &HashMap<String, Vec<String>>,
    index: &TermIndex,
    report: &mut RunReport,
  ) {
    let Some(namespace) = term.namespace else {
      let message =
        format!("GO:{} has no namespace; term skipped", term.accession);
      tracing::error!("{message}");
      report.errors.push(message);
      return;
    };

    match index.records_for(&term.accession) {
      None => {
        report.new_terms += 1;
        self
          .create_term(mutator, term, namespace, ec_index, report)
          .await;
      }
      Some(records) => {
        for record in records {
          let matches = record
            .subtype()
            .is_some_and(|subtype| subtype.matches(namespace));
          if matches {
            match mutator.update_term(record, term, ec_index, report).await {
              Ok(true) => report.updated += 1,
              Ok(false) => {}
              Err(err) => note_error(
                report,
                &format!("updating GO:{} failed", term.accession),
                &err,
              ),
            }
          } else {
            report.mismatches += 1;
            report.category_mismatches.push(format!(
              "category mismatch for GO:{}: stored class {:?}, file says \
               {}",
              term.accession,
              record.class.as_str(),
              namespace,
            ));
            // The wrong-typed record goes away without referrer
            // redirection; the correctly-typed replacement is created in
            // its stead.
            if let Err(err) = self
              .store
              .delete_record(record.record_id)
              .await
              .map_err(Error::store)
            {
              note_error(
                report,
                &format!(
                  "deleting mismatched record {} (GO:{}) failed",
                  record.record_id, term.accession
                ),
                &err,
              );
              continue;
            }
            report.new_terms += 1;
            self
              .create_term(mutator, term, namespace, ec_index, report)
              .await;
          }
        }
      }
    }

    self.merge_secondaries(mutator, term, index, report).await;
  }

  /// Create one term, logging it under the new-term (and, for molecular
  /// functions, new-MF) report categories.
  async fn create_term(
    &self,
    mutator: &InstanceMutator<'_, S>,
    term: &ParsedTerm,
    namespace: GoNamespace,
    ec_index: &HashMap<String, Vec<String>>,
    report: &mut RunReport,
  ) {
    match mutator.create_term(term, namespace, ec_index).await {
      Ok(id) => {
        let name = term.name.as_deref().unwrap_or("");
        report
          .new_term_log
          .push(format!("{id}\tGO:{}\t{name}", term.accession));
        if namespace == GoNamespace::MolecularFunction {
          report
            .new_molecular_functions
            .push(format!("{id}\tGO:{}\t{name}", term.accession));
        }
      }
      Err(err) => note_error(
        report,
        &format!("creating GO:{} failed", term.accession),
        &err,
      ),
    }
  }

  /// Fold records stored under this term's secondary accessions into the
  /// primary record: redirect their referrers, then delete them.
  async fn merge_secondaries(
    &self,
    mutator: &InstanceMutator<'_, S>,
    term: &ParsedTerm,
    index: &TermIndex,
    report: &mut RunReport,
  ) {
    if term.alt_ids.is_empty() {
      return;
    }
    let Some(primaries) = index.records_for(&term.accession) else {
      return;
    };

    for primary in primaries {
      for secondary_accession in &term.alt_ids {
        let Some(secondaries) = index.records_for(secondary_accession)
        else {
          continue;
        };
        tracing::info!(
          secondary = %secondary_accession,
          primary = %term.accession,
          "secondary accession in use; its records will be merged away"
        );
        for secondary in secondaries {
          if let Err(err) =
            mutator.delete_secondary(secondary, primary, report).await
          {
            note_error(
              report,
              &format!(
                "merging secondary record {} (GO:{}) into GO:{} failed",
                secondary.record_id, secondary_accession, term.accession
              ),
              &err,
            );
          }
        }
      }
    }
  }

  /// Decide which records of an obsolete term can be queued for deletion.
  async fn classify_obsolete(
    &self,
    term: &ParsedTerm,
    records: &[StoredRecord],
    deletions: &mut Vec<DeletionItem>,
    report: &mut RunReport,
  ) {
    let mut note = String::new();

    if !term.replaced_by.is_empty() {
      // A stated successor makes deletion unconditional.
      for record in records {
        deletions.push(DeletionItem {
          record:    record.clone(),
          accession: term.accession.clone(),
        });
      }
      note = format!(" Replacement accession: GO:{}", term.replaced_by[0]);
    } else {
      for record in records {
        if deletions.iter().any(|d| d.record.record_id == record.record_id) {
          continue;
        }
        match self.store.referrer_counts(record.record_id).await {
          Ok(counts) if counts.is_empty() => {
            deletions.push(DeletionItem {
              record:    record.clone(),
              accession: term.accession.clone(),
            });
            note.push_str(&format!(
              " No replacement accession, but record {} has no referrers \
               and will be safely deleted.",
              record.record_id
            ));
          }
          Ok(counts) => {
            // Left in place; surfaced with its blocking referrers so an
            // operator can intervene.
            let referrers = self
              .collect_referrers(record.record_id, &counts, &term.accession, report)
              .await;
            report.undeletable.push(UndeletableRecord {
              record_id: record.record_id,
              accession: term.accession.clone(),
              referrers,
            });
          }
          Err(err) => {
            let err = Error::store(err);
            note_error(
              report,
              &format!(
                "counting referrers of record {} (GO:{}) failed; it will \
                 not be deleted",
                record.record_id, term.accession
              ),
              &err,
            );
          }
        }
      }
      if note.is_empty() {
        note = " ** Manual cleanup for this term may be necessary! ** No \
                replacement was suggested and referring records exist, so \
                the term will NOT be deleted."
          .to_string();
      }
    }

    let warning = format!("GO:{} is marked as OBSOLETE!{note}", term.accession);
    tracing::warn!("{warning}");
    report.obsoletion_warnings.push(warning);
  }

  /// Fetch every record pointing at `record_id`, across the attributes
  /// `counts` says are populated. Per-attribute failures are noted and the
  /// rest still collected.
  async fn collect_referrers(
    &self,
    record_id: i64,
    counts: &HashMap<LinkAttr, usize>,
    accession: &str,
    report: &mut RunReport,
  ) -> Vec<StoredRecord> {
    let mut referrers = Vec::new();
    for attr in counts.keys() {
      match self.store.referrers_via(record_id, *attr).await {
        Ok(records) => referrers.extend(records),
        Err(err) => {
          let err = Error::store(err);
          note_error(
            report,
            &format!(
              "listing referrers of record {record_id} (GO:{accession}) \
               failed"
            ),
            &err,
          );
        }
      }
    }
    referrers
  }

  // ── Deletion pass ─────────────────────────────────────────────────────────

  /// Execute the queued deletions, re-checking deletability now that
  /// earlier deletions may have changed referrer counts.
  async fn delete_flagged(
    &self,
    mutator: &InstanceMutator<'_, S>,
    terms: &HashMap<String, ParsedTerm>,
    index: &TermIndex,
    deletions: Vec<DeletionItem>,
    report: &mut RunReport,
  ) {
    for item in deletions {
      let Some(term) = terms.get(&item.accession) else {
        // Queued items always come from the term map; a miss means the
        // caller handed us inconsistent inputs.
        continue;
      };

      let counts = match self.store.referrer_counts(item.record.record_id).await
      {
        Ok(counts) => counts,
        Err(err) => {
          let err = Error::store(err);
          note_error(
            report,
            &format!(
              "re-checking referrers of record {} (GO:{}) failed; it will \
               not be deleted",
              item.record.record_id, item.accession
            ),
            &err,
          );
          continue;
        }
      };

      let deletable = !term.replaced_by.is_empty() || counts.is_empty();
      if deletable {
        if !counts.is_empty() {
          tracing::info!(
            record_id = item.record.record_id,
            accession = %item.accession,
            referrer_attrs = counts.len(),
            "record has referrers but a replacement exists; deleting"
          );
        }
        match mutator.delete_term(&item.record, term, index, report).await {
          Ok(()) => report.deleted += 1,
          Err(err) => note_error(
            report,
            &format!(
              "deleting record {} (GO:{}) failed",
              item.record.record_id, item.accession
            ),
            &err,
          ),
        }
      } else {
        let referrers = self
          .collect_referrers(
            item.record.record_id,
            &counts,
            &item.accession,
            report,
          )
          .await;
        tracing::warn!(
          record_id = item.record.record_id,
          accession = %item.accession,
          referrers = referrers.len(),
          "record cannot be deleted; flagged for manual cleanup"
        );
        report.undeletable.push(UndeletableRecord {
          record_id: item.record.record_id,
          accession: item.accession,
          referrers,
        });
      }
    }
  }

  // ── Relationship rebuild ──────────────────────────────────────────────────

  /// Clear and rebuild the typed edges of every surviving record that has
  /// file-derived properties, stamping each one and refreshing the display
  /// names of its direct referrers.
  async fn rebuild_relationships(
    &self,
    mutator: &InstanceMutator<'_, S>,
    terms: &HashMap<String, ParsedTerm>,
    index: &TermIndex,
    report: &mut RunReport,
  ) {
    for (accession, term) in terms {
      let Some(records) = index.records_for(accession) else {
        continue;
      };

      for record in records {
        for kind in RelationshipKind::ALL {
          if let Err(err) = mutator
            .update_relationship(
              record,
              term.targets(kind),
              LinkAttr::for_kind(kind),
              index,
              report,
            )
            .await
          {
            note_error(
              report,
              &format!(
                "rebuilding {} of record {} (GO:{accession}) failed",
                LinkAttr::for_kind(kind),
                record.record_id
              ),
              &err,
            );
          }
        }

        if let Err(err) = self
          .store
          .touch(record.record_id, self.ctx.stamp.run_id)
          .await
          .map_err(Error::store)
        {
          note_error(
            report,
            &format!(
              "stamping record {} (GO:{accession}) failed",
              record.record_id
            ),
            &err,
          );
        }
        if let Err(err) =
          mutator.refresh_referrer_display_names(record.record_id).await
        {
          note_error(
            report,
            &format!(
              "refreshing referrer display names of record {} \
               (GO:{accession}) failed",
              record.record_id
            ),
            &err,
          );
        }
      }
    }
  }
}

/// Log a recoverable per-record failure and keep going.
fn note_error(report: &mut RunReport, context: &str, err: &Error) {
  tracing::error!(error = %err, "{context}");
  report.errors.push(format!("{context}: {err}"));
}
