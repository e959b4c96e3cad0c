//! Per-record store operations: create, update, delete, relink.
//!
//! Each method performs one record's worth of work and returns `Err` on the
//! first store failure; the reconciler decides whether that failure aborts
//! the run or just this record.

use std::collections::HashMap;

use gosync_core::{
  context::RunContext,
  record::{
    GoSubtype, LinkAttr, NewRecord, RecordClass, ScalarAttr, StoredRecord,
    derive_display_name,
  },
  store::TermStore,
  term::{GoNamespace, ParsedTerm},
};

use crate::{Error, Result, TermIndex, report::RunReport};

pub struct InstanceMutator<'a, S> {
  store: &'a S,
  ctx:   &'a RunContext,
}

impl<'a, S: TermStore> InstanceMutator<'a, S> {
  pub fn new(store: &'a S, ctx: &'a RunContext) -> Self {
    InstanceMutator { store, ctx }
  }

  // ── Create ────────────────────────────────────────────────────────────────

  /// Create a record for `term` and return its store-assigned id.
  ///
  /// The subtype follows the namespace; EC numbers are attached only to
  /// molecular-function records; every new record links to the run's
  /// reference-source anchor.
  pub async fn create_term(
    &self,
    term: &ParsedTerm,
    namespace: GoNamespace,
    ec_index: &HashMap<String, Vec<String>>,
  ) -> Result<i64> {
    let subtype = GoSubtype::for_namespace(namespace);

    let mut record = NewRecord::new(RecordClass::Go(subtype));
    record.accession = Some(term.accession.clone());
    record.name = term.name.clone();
    record.definition = term.definition.clone();
    record.display_name = derive_display_name(term.name.as_deref());
    record.created_by = Some(self.ctx.stamp.run_id);
    if subtype == GoSubtype::MolecularFunction
      && let Some(numbers) = ec_index.get(&term.accession)
    {
      record.ec_numbers = numbers.clone();
    }

    let id = self
      .store
      .create_record(record)
      .await
      .map_err(Error::store)?;
    self
      .store
      .add_links(id, LinkAttr::ReferenceDatabase, &[self.ctx.reference_source])
      .await
      .map_err(Error::store)?;

    Ok(id)
  }

  // ── Update ────────────────────────────────────────────────────────────────

  /// Bring an existing record up to date with `term`.
  ///
  /// A name or definition difference overwrites both scalars and clears the
  /// instance_of/component_of edges; the relationship pass rebuilds them
  /// from the file. EC numbers on molecular-function records are refreshed
  /// whenever the file carries any. Returns `true` when anything changed.
  pub async fn update_term(
    &self,
    record: &StoredRecord,
    term: &ParsedTerm,
    ec_index: &HashMap<String, Vec<String>>,
    report: &mut RunReport,
  ) -> Result<bool> {
    let mut modified = false;

    let name_changed = term.name.is_some() && term.name != record.name;
    let definition_changed =
      term.definition.is_some() && term.definition != record.definition;

    if name_changed || definition_changed {
      report.name_or_definition_changes.push(format!(
        "GO:{}: name {:?} -> {:?}, definition {:?} -> {:?}; \
         instance_of and component_of cleared pending the relationship pass",
        term.accession,
        record.name.as_deref().unwrap_or(""),
        term.name.as_deref().unwrap_or(""),
        record.definition.as_deref().unwrap_or(""),
        term.definition.as_deref().unwrap_or(""),
      ));

      self
        .store
        .clear_links(record.record_id, LinkAttr::InstanceOf)
        .await
        .map_err(Error::store)?;
      self
        .store
        .clear_links(record.record_id, LinkAttr::ComponentOf)
        .await
        .map_err(Error::store)?;
      self
        .store
        .set_scalar(record.record_id, ScalarAttr::Name, term.name.as_deref())
        .await
        .map_err(Error::store)?;
      self
        .store
        .set_scalar(
          record.record_id,
          ScalarAttr::Definition,
          term.definition.as_deref(),
        )
        .await
        .map_err(Error::store)?;
      modified = true;
    }

    if record.subtype() == Some(GoSubtype::MolecularFunction)
      && let Some(numbers) = ec_index.get(&term.accession)
    {
      // Wholesale replacement: only the file's numbers survive.
      self
        .store
        .set_ec_numbers(record.record_id, numbers)
        .await
        .map_err(Error::store)?;
      modified = true;
    }

    if modified {
      let name = term.name.as_deref().or(record.name.as_deref());
      self
        .store
        .set_scalar(
          record.record_id,
          ScalarAttr::DisplayName,
          derive_display_name(name).as_deref(),
        )
        .await
        .map_err(Error::store)?;
      self
        .store
        .touch(record.record_id, self.ctx.stamp.run_id)
        .await
        .map_err(Error::store)?;
    }

    Ok(modified)
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  /// Delete `record`, redirecting its referrers to the replacement record
  /// resolved from `term` (replaced_by, then consider, then alt_id) when
  /// one exists in the index.
  pub async fn delete_term(
    &self,
    record: &StoredRecord,
    term: &ParsedTerm,
    index: &TermIndex,
    report: &mut RunReport,
  ) -> Result<()> {
    if let Some(replacement_accession) = term.replacement_accession() {
      match index
        .records_for(replacement_accession)
        .and_then(<[StoredRecord]>::first)
      {
        Some(replacement) => {
          self.redirect_referrers(record, replacement, report).await?;
        }
        None => {
          tracing::warn!(
            accession = %term.accession,
            replacement = %replacement_accession,
            "replacement record not found; record will still be deleted \
             but its referrers will have nothing to refer to"
          );
        }
      }
    }

    self
      .store
      .delete_record(record.record_id)
      .await
      .map_err(Error::store)?;
    report.deletions.push(format!(
      "deleted record {} (GO:{})",
      record.record_id, term.accession
    ));
    Ok(())
  }

  /// Delete a record stored under a secondary accession, pointing its
  /// referrers at the primary record first.
  pub async fn delete_secondary(
    &self,
    record: &StoredRecord,
    primary: &StoredRecord,
    report: &mut RunReport,
  ) -> Result<()> {
    self.redirect_referrers(record, primary, report).await?;
    self
      .store
      .delete_record(record.record_id)
      .await
      .map_err(Error::store)?;
    report.deletions.push(format!(
      "deleted secondary record {} (GO:{}); referrers now point at \
       record {} (GO:{})",
      record.record_id,
      record.accession.as_deref().unwrap_or("?"),
      primary.record_id,
      primary.accession.as_deref().unwrap_or("?"),
    ));
    Ok(())
  }

  /// Point every redirectable edge aimed at `from` to `to` instead,
  /// matching edges by record id.
  async fn redirect_referrers(
    &self,
    from: &StoredRecord,
    to: &StoredRecord,
    report: &mut RunReport,
  ) -> Result<()> {
    for attr in LinkAttr::REDIRECTABLE {
      let referrers = self
        .store
        .referrers_via(from.record_id, attr)
        .await
        .map_err(Error::store)?;
      for referrer in referrers {
        self
          .store
          .relink(referrer.record_id, attr, from.record_id, to.record_id)
          .await
          .map_err(Error::store)?;
        report.deletions.push(format!(
          "record {} now refers to record {} (GO:{}) via {}",
          referrer.record_id,
          to.record_id,
          to.accession.as_deref().unwrap_or("?"),
          attr,
        ));
      }
    }
    Ok(())
  }

  // ── Relationships ─────────────────────────────────────────────────────────

  /// Clear one edge attribute and repopulate it from target accessions
  /// resolved through the index. Unresolvable targets are logged and
  /// reported, never fatal.
  pub async fn update_relationship(
    &self,
    record: &StoredRecord,
    targets: &[String],
    attr: LinkAttr,
    index: &TermIndex,
    report: &mut RunReport,
  ) -> Result<()> {
    if targets.is_empty() {
      return Ok(());
    }

    self
      .store
      .clear_links(record.record_id, attr)
      .await
      .map_err(Error::store)?;

    for target_accession in targets {
      match index.records_for(target_accession) {
        Some(others) if !others.is_empty() => {
          let ids: Vec<i64> = others.iter().map(|r| r.record_id).collect();
          self
            .store
            .add_links(record.record_id, attr, &ids)
            .await
            .map_err(Error::store)?;
          report.relationship_log.push(format!(
            "record {} (GO:{}) now has {} referring to GO:{} ({} record(s))",
            record.record_id,
            record.accession.as_deref().unwrap_or("?"),
            attr,
            target_accession,
            ids.len(),
          ));
        }
        _ => {
          let message = format!(
            "cannot set {} on record {} (GO:{}): no record with \
             GO:{} exists",
            attr,
            record.record_id,
            record.accession.as_deref().unwrap_or("?"),
            target_accession,
          );
          tracing::warn!("{message}");
          report.relationship_log.push(message);
        }
      }
    }
    Ok(())
  }

  /// Recompute the display name of every record pointing at `record_id`
  /// through a display-relevant attribute, stamping them modified.
  pub async fn refresh_referrer_display_names(
    &self,
    record_id: i64,
  ) -> Result<()> {
    for attr in LinkAttr::DISPLAY_REFRESH {
      let referrers = self
        .store
        .referrers_via(record_id, attr)
        .await
        .map_err(Error::store)?;
      for referrer in referrers {
        let display = derive_display_name(referrer.name.as_deref());
        self
          .store
          .set_scalar(
            referrer.record_id,
            ScalarAttr::DisplayName,
            display.as_deref(),
          )
          .await
          .map_err(Error::store)?;
        self
          .store
          .touch(referrer.record_id, self.ctx.stamp.run_id)
          .await
          .map_err(Error::store)?;
      }
    }
    Ok(())
  }
}
