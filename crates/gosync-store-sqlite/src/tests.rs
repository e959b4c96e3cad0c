//! Integration tests for `SqliteStore` against an in-memory database.

use gosync_core::{
  record::{
    GoSubtype, LinkAttr, NewRecord, RecordClass, ScalarAttr, StoredRecord,
  },
  store::TermStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn go_term(subtype: GoSubtype, accession: &str, name: &str) -> NewRecord {
  let mut record = NewRecord::new(RecordClass::Go(subtype));
  record.accession = Some(accession.to_string());
  record.name = Some(name.to_string());
  record.display_name = Some(name.to_string());
  record
}

async fn fetch(s: &SqliteStore, id: i64) -> StoredRecord {
  s.get_record(id).await.unwrap().expect("record exists")
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_record() {
  let s = store().await;

  let mut input = go_term(GoSubtype::BiologicalProcess, "0000001", "mitosis");
  input.definition = Some("def".to_string());
  input.created_by = Some(Uuid::new_v4());

  let id = s.create_record(input).await.unwrap();
  let record = fetch(&s, id).await;

  assert_eq!(record.record_id, id);
  assert_eq!(record.class, RecordClass::Go(GoSubtype::BiologicalProcess));
  assert_eq!(record.accession.as_deref(), Some("0000001"));
  assert_eq!(record.name.as_deref(), Some("mitosis"));
  assert_eq!(record.definition.as_deref(), Some("def"));
  assert!(record.ec_numbers.is_empty());
  assert!(record.modified.is_empty());
}

#[tokio::test]
async fn get_record_missing_returns_none() {
  let s = store().await;
  assert!(s.get_record(999).await.unwrap().is_none());
}

#[tokio::test]
async fn list_records_filters_by_class() {
  let s = store().await;
  s.create_record(go_term(GoSubtype::BiologicalProcess, "1", "a"))
    .await
    .unwrap();
  s.create_record(go_term(GoSubtype::BiologicalProcess, "2", "b"))
    .await
    .unwrap();
  s.create_record(go_term(GoSubtype::MolecularFunction, "3", "c"))
    .await
    .unwrap();

  let processes = s
    .list_records(RecordClass::Go(GoSubtype::BiologicalProcess))
    .await
    .unwrap();
  assert_eq!(processes.len(), 2);
  let functions = s
    .list_records(RecordClass::Go(GoSubtype::MolecularFunction))
    .await
    .unwrap();
  assert_eq!(functions.len(), 1);
  assert!(
    s.list_records(RecordClass::Go(GoSubtype::Compartment))
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn find_by_name_matches_exactly() {
  let s = store().await;
  let mut anchor = NewRecord::new(RecordClass::ReferenceSource);
  anchor.name = Some("GO".to_string());
  let id = s.create_record(anchor).await.unwrap();

  let hits = s
    .find_by_name(RecordClass::ReferenceSource, "GO")
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].record_id, id);

  assert!(
    s.find_by_name(RecordClass::ReferenceSource, "go")
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn set_scalar_overwrites_and_clears() {
  let s = store().await;
  let id = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "1", "old"))
    .await
    .unwrap();

  s.set_scalar(id, ScalarAttr::Name, Some("new")).await.unwrap();
  s.set_scalar(id, ScalarAttr::Definition, Some("d")).await.unwrap();
  let record = fetch(&s, id).await;
  assert_eq!(record.name.as_deref(), Some("new"));
  assert_eq!(record.definition.as_deref(), Some("d"));

  s.set_scalar(id, ScalarAttr::Definition, None).await.unwrap();
  assert_eq!(fetch(&s, id).await.definition, None);
}

#[tokio::test]
async fn set_scalar_missing_record_errors() {
  let s = store().await;
  let err = s
    .set_scalar(42, ScalarAttr::Name, Some("x"))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RecordNotFound(42)));
}

#[tokio::test]
async fn ec_numbers_round_trip() {
  let s = store().await;
  let mut input = go_term(GoSubtype::MolecularFunction, "9", "kinase");
  input.ec_numbers = vec!["2.7.1.1".to_string()];
  let id = s.create_record(input).await.unwrap();

  assert_eq!(fetch(&s, id).await.ec_numbers, ["2.7.1.1"]);

  // Replacement is wholesale, not additive.
  s.set_ec_numbers(id, &["1.2".to_string(), "1.3".to_string()])
    .await
    .unwrap();
  assert_eq!(fetch(&s, id).await.ec_numbers, ["1.2", "1.3"]);
}

#[tokio::test]
async fn touch_appends_stamps_in_order() {
  let s = store().await;
  let id = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "1", "a"))
    .await
    .unwrap();

  let first = Uuid::new_v4();
  let second = Uuid::new_v4();
  s.touch(id, first).await.unwrap();
  s.touch(id, second).await.unwrap();

  assert_eq!(fetch(&s, id).await.modified, [first, second]);

  let err = s.touch(999, first).await.unwrap_err();
  assert!(matches!(err, crate::Error::RecordNotFound(999)));
}

// ─── Links ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn links_set_clear_and_order() {
  let s = store().await;
  let a = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "1", "a"))
    .await
    .unwrap();
  let b = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "2", "b"))
    .await
    .unwrap();
  let c = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "3", "c"))
    .await
    .unwrap();

  s.add_links(a, LinkAttr::InstanceOf, &[b, c]).await.unwrap();
  assert_eq!(s.links_from(a, LinkAttr::InstanceOf).await.unwrap(), [b, c]);
  assert!(s.links_from(a, LinkAttr::HasPart).await.unwrap().is_empty());

  s.clear_links(a, LinkAttr::InstanceOf).await.unwrap();
  assert!(
    s.links_from(a, LinkAttr::InstanceOf)
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn delete_record_cascades_links_both_ways() {
  let s = store().await;
  let a = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "1", "a"))
    .await
    .unwrap();
  let b = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "2", "b"))
    .await
    .unwrap();
  let c = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "3", "c"))
    .await
    .unwrap();

  s.add_links(a, LinkAttr::InstanceOf, &[b]).await.unwrap();
  s.add_links(b, LinkAttr::InstanceOf, &[c]).await.unwrap();

  s.delete_record(b).await.unwrap();

  assert!(s.get_record(b).await.unwrap().is_none());
  assert!(
    s.links_from(a, LinkAttr::InstanceOf)
      .await
      .unwrap()
      .is_empty()
  );
  assert!(s.referrer_counts(c).await.unwrap().is_empty());
}

// ─── Referrers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn referrers_via_returns_pointing_records() {
  let s = store().await;
  let term = s
    .create_record(go_term(GoSubtype::MolecularFunction, "9", "kinase"))
    .await
    .unwrap();

  let mut catalyst = NewRecord::new(RecordClass::External(
    "catalyst_activity".to_string(),
  ));
  catalyst.name = Some("kinase activity of X".to_string());
  let catalyst = s.create_record(catalyst).await.unwrap();

  s.add_links(catalyst, LinkAttr::Activity, &[term]).await.unwrap();

  let referrers = s.referrers_via(term, LinkAttr::Activity).await.unwrap();
  assert_eq!(referrers.len(), 1);
  assert_eq!(referrers[0].record_id, catalyst);
  assert!(
    s.referrers_via(term, LinkAttr::ComponentOf)
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn referrer_counts_group_by_attribute() {
  let s = store().await;
  let term = s
    .create_record(go_term(GoSubtype::CellularComponent, "5", "membrane"))
    .await
    .unwrap();
  let x = s
    .create_record(go_term(GoSubtype::CellularComponent, "6", "x"))
    .await
    .unwrap();
  let y = s
    .create_record(go_term(GoSubtype::CellularComponent, "7", "y"))
    .await
    .unwrap();

  s.add_links(x, LinkAttr::ComponentOf, &[term]).await.unwrap();
  s.add_links(y, LinkAttr::ComponentOf, &[term]).await.unwrap();
  s.add_links(y, LinkAttr::HasPart, &[term]).await.unwrap();

  let counts = s.referrer_counts(term).await.unwrap();
  assert_eq!(counts.len(), 2);
  assert_eq!(counts[&LinkAttr::ComponentOf], 2);
  assert_eq!(counts[&LinkAttr::HasPart], 1);

  assert!(s.referrer_counts(x).await.unwrap().is_empty());
}

#[tokio::test]
async fn relink_moves_only_matching_edges() {
  let s = store().await;
  let old = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "1", "old"))
    .await
    .unwrap();
  let other = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "2", "other"))
    .await
    .unwrap();
  let replacement = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "3", "new"))
    .await
    .unwrap();
  let referrer = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "4", "referrer"))
    .await
    .unwrap();

  s.add_links(referrer, LinkAttr::ComponentOf, &[old, other])
    .await
    .unwrap();

  s.relink(referrer, LinkAttr::ComponentOf, old, replacement)
    .await
    .unwrap();

  let targets = s.links_from(referrer, LinkAttr::ComponentOf).await.unwrap();
  assert!(targets.contains(&replacement));
  assert!(targets.contains(&other));
  assert!(!targets.contains(&old));
}

// ─── Transaction bracket ─────────────────────────────────────────────────────

#[tokio::test]
async fn rollback_discards_the_whole_run() {
  let s = store().await;
  s.begin_work().await.unwrap();
  let id = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "1", "a"))
    .await
    .unwrap();

  // Writes are visible inside the transaction.
  assert!(s.get_record(id).await.unwrap().is_some());

  s.rollback_work().await.unwrap();
  assert!(s.get_record(id).await.unwrap().is_none());
}

#[tokio::test]
async fn commit_keeps_the_run() {
  let s = store().await;
  s.begin_work().await.unwrap();
  let id = s
    .create_record(go_term(GoSubtype::BiologicalProcess, "1", "a"))
    .await
    .unwrap();
  s.commit_work().await.unwrap();
  assert!(s.get_record(id).await.unwrap().is_some());
}
