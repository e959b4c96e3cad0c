//! The `TermStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `gosync-store-sqlite`).
//! The reconciliation engine depends on this abstraction, not on any
//! concrete backend, and assumes the caller has arranged a transaction
//! spanning the whole run: every write must be visible to later reads.

use std::{collections::HashMap, future::Future};

use uuid::Uuid;

use crate::record::{
  LinkAttr, NewRecord, RecordClass, ScalarAttr, StoredRecord,
};

/// Abstraction over the backing store of cross-referencing records.
///
/// All methods return `Send` futures; callers await them strictly in
/// sequence (the engine is single-writer for the duration of a run).
pub trait TermStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Queries ───────────────────────────────────────────────────────────

  /// All records of one class.
  fn list_records(
    &self,
    class: RecordClass,
  ) -> impl Future<Output = Result<Vec<StoredRecord>, Self::Error>> + Send + '_;

  /// All records of one class whose `name` attribute equals `name` exactly.
  fn find_by_name<'a>(
    &'a self,
    class: RecordClass,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<StoredRecord>, Self::Error>> + Send + 'a;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get_record(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<StoredRecord>, Self::Error>> + Send + '_;

  // ── Record mutation ───────────────────────────────────────────────────

  /// Persist a new record and return its store-assigned id.
  fn create_record(
    &self,
    record: NewRecord,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Overwrite one scalar attribute (`None` clears it).
  fn set_scalar<'a>(
    &'a self,
    id: i64,
    attr: ScalarAttr,
    value: Option<&'a str>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Replace the EC-number list wholesale.
  fn set_ec_numbers<'a>(
    &'a self,
    id: i64,
    numbers: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Append a run stamp to the record's modification history.
  fn touch(
    &self,
    id: i64,
    stamp: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a record. Edges from and to it are removed with it.
  fn delete_record(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Typed relationship edges ──────────────────────────────────────────

  /// Target record ids linked from `id` under `attr`.
  fn links_from(
    &self,
    id: i64,
    attr: LinkAttr,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  /// Remove every edge from `id` under `attr`.
  fn clear_links(
    &self,
    id: i64,
    attr: LinkAttr,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append edges from `id` under `attr` to each target.
  fn add_links<'a>(
    &'a self,
    id: i64,
    attr: LinkAttr,
    targets: &'a [i64],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Referrers ─────────────────────────────────────────────────────────

  /// The records holding an edge pointing at `id` under `attr`.
  fn referrers_via(
    &self,
    id: i64,
    attr: LinkAttr,
  ) -> impl Future<Output = Result<Vec<StoredRecord>, Self::Error>> + Send + '_;

  /// Referrer counts per attribute; attributes with zero referrers are
  /// absent from the map.
  fn referrer_counts(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<HashMap<LinkAttr, usize>, Self::Error>> + Send + '_;

  /// Redirect the edge `referrer --attr--> from` to point at `to` instead.
  ///
  /// Matches by record id: only edges whose target is exactly `from` move.
  fn relink(
    &self,
    referrer: i64,
    attr: LinkAttr,
    from: i64,
    to: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
