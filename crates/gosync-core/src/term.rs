//! The in-memory model of one GO term as read from the release file.
//!
//! A [`ParsedTerm`] is built up line by line while its stanza is being read
//! and is immutable afterwards: the reconciliation engine only ever reads it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// GO's three top-level categories, as they appear on `namespace:` lines.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GoNamespace {
  BiologicalProcess,
  MolecularFunction,
  CellularComponent,
}

/// The relationship kinds carried on `is_a:` and `relationship:` lines.
///
/// Kinds outside this set (e.g. `occurs_in`) are ignored by the parser.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
  IsA,
  HasPart,
  PartOf,
  Regulates,
  PositivelyRegulates,
  NegativelyRegulates,
}

impl RelationshipKind {
  /// All kinds, in the order the rebuild pass walks them.
  pub const ALL: [RelationshipKind; 6] = [
    RelationshipKind::IsA,
    RelationshipKind::HasPart,
    RelationshipKind::PartOf,
    RelationshipKind::Regulates,
    RelationshipKind::PositivelyRegulates,
    RelationshipKind::NegativelyRegulates,
  ];
}

/// One GO stanza's extracted attributes, keyed by accession.
///
/// Accessions are the bare digit string (`"0000099"`), never prefixed with
/// `GO:`. Multi-valued fields accumulate in file encounter order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedTerm {
  pub accession:  String,
  pub name:       Option<String>,
  pub namespace:  Option<GoNamespace>,
  pub definition: Option<String>,

  pub alt_ids:  Vec<String>,
  pub synonyms: Vec<String>,

  pub is_a:                 Vec<String>,
  pub has_part:             Vec<String>,
  pub part_of:              Vec<String>,
  pub regulates:            Vec<String>,
  pub positively_regulates: Vec<String>,
  pub negatively_regulates: Vec<String>,

  /// Successor accessions; only meaningful on obsolete terms.
  pub replaced_by: Vec<String>,
  pub consider:    Vec<String>,

  pub is_obsolete:      bool,
  pub pending_obsolete: bool,
}

impl ParsedTerm {
  pub fn new(accession: impl Into<String>) -> Self {
    ParsedTerm {
      accession: accession.into(),
      ..ParsedTerm::default()
    }
  }

  /// The target accessions recorded for one relationship kind.
  pub fn targets(&self, kind: RelationshipKind) -> &[String] {
    match kind {
      RelationshipKind::IsA => &self.is_a,
      RelationshipKind::HasPart => &self.has_part,
      RelationshipKind::PartOf => &self.part_of,
      RelationshipKind::Regulates => &self.regulates,
      RelationshipKind::PositivelyRegulates => &self.positively_regulates,
      RelationshipKind::NegativelyRegulates => &self.negatively_regulates,
    }
  }

  pub fn targets_mut(&mut self, kind: RelationshipKind) -> &mut Vec<String> {
    match kind {
      RelationshipKind::IsA => &mut self.is_a,
      RelationshipKind::HasPart => &mut self.has_part,
      RelationshipKind::PartOf => &mut self.part_of,
      RelationshipKind::Regulates => &mut self.regulates,
      RelationshipKind::PositivelyRegulates => {
        &mut self.positively_regulates
      }
      RelationshipKind::NegativelyRegulates => {
        &mut self.negatively_regulates
      }
    }
  }

  /// Resolve the accession referrers should be redirected to when a record
  /// for this term is deleted.
  ///
  /// Priority: `replaced_by`, then `consider`, then `alt_id`; the first
  /// entry wins when the winning field holds several.
  pub fn replacement_accession(&self) -> Option<&str> {
    self
      .replaced_by
      .first()
      .or_else(|| self.consider.first())
      .or_else(|| self.alt_ids.first())
      .map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn namespace_round_trips_through_snake_case() {
    let ns: GoNamespace = "biological_process".parse().unwrap();
    assert_eq!(ns, GoNamespace::BiologicalProcess);
    assert_eq!(ns.to_string(), "biological_process");
    assert!("biological process".parse::<GoNamespace>().is_err());
  }

  #[test]
  fn replacement_priority_is_replaced_by_then_consider_then_alt_id() {
    let mut term = ParsedTerm::new("0000001");
    assert_eq!(term.replacement_accession(), None);

    term.alt_ids = vec!["0000004".into()];
    assert_eq!(term.replacement_accession(), Some("0000004"));

    term.consider = vec!["0000003".into()];
    assert_eq!(term.replacement_accession(), Some("0000003"));

    term.replaced_by = vec!["0000002".into(), "0000005".into()];
    assert_eq!(term.replacement_accession(), Some("0000002"));
  }
}
