//! Stored record types: the persisted side of the reconciliation.
//!
//! A [`StoredRecord`] is identified by a store-assigned numeric id, never by
//! its accession; several records may (undesirably but legally) share one
//! accession, and the engine must tolerate that without merging them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::term::{GoNamespace, RelationshipKind};

// ─── GO subtypes ─────────────────────────────────────────────────────────────

/// The schema classes a stored GO term can have.
///
/// `Compartment` is a specialisation of the cellular-component class that the
/// upstream namespaces know nothing about; [`GoSubtype::matches`] is the one
/// place that exception lives.
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
pub enum GoSubtype {
  BiologicalProcess,
  MolecularFunction,
  CellularComponent,
  Compartment,
}

impl GoSubtype {
  /// Every class the existing-instance index loads.
  pub const ALL: [GoSubtype; 4] = [
    GoSubtype::BiologicalProcess,
    GoSubtype::MolecularFunction,
    GoSubtype::CellularComponent,
    GoSubtype::Compartment,
  ];

  /// The subtype used when creating a record for `namespace`.
  pub fn for_namespace(namespace: GoNamespace) -> GoSubtype {
    match namespace {
      GoNamespace::BiologicalProcess => GoSubtype::BiologicalProcess,
      GoNamespace::MolecularFunction => GoSubtype::MolecularFunction,
      GoNamespace::CellularComponent => GoSubtype::CellularComponent,
    }
  }

  /// Category predicate: does a record of this subtype satisfy `namespace`?
  ///
  /// `Compartment` records satisfy the cellular-component namespace even
  /// though no namespace maps to them directly.
  pub fn matches(self, namespace: GoNamespace) -> bool {
    match (self, namespace) {
      (GoSubtype::BiologicalProcess, GoNamespace::BiologicalProcess) => true,
      (GoSubtype::MolecularFunction, GoNamespace::MolecularFunction) => true,
      (GoSubtype::CellularComponent, GoNamespace::CellularComponent) => true,
      (GoSubtype::Compartment, GoNamespace::CellularComponent) => true,
      _ => false,
    }
  }
}

// ─── Record classes ──────────────────────────────────────────────────────────

/// The class of a stored record.
///
/// GO terms are the records the engine reconciles; `ReferenceSource` holds
/// the upstream-database anchor every GO term links to; `External` covers
/// anything else in the store that may refer to a GO term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
  Go(GoSubtype),
  ReferenceSource,
  External(String),
}

impl RecordClass {
  pub fn as_str(&self) -> &str {
    match self {
      RecordClass::Go(GoSubtype::BiologicalProcess) => "biological_process",
      RecordClass::Go(GoSubtype::MolecularFunction) => "molecular_function",
      RecordClass::Go(GoSubtype::CellularComponent) => "cellular_component",
      RecordClass::Go(GoSubtype::Compartment) => "compartment",
      RecordClass::ReferenceSource => "reference_source",
      RecordClass::External(name) => name,
    }
  }

  /// Decode a stored class string. Unknown names become [`External`]
  /// (referrer records can be of any class).
  ///
  /// [`External`]: RecordClass::External
  pub fn parse(s: &str) -> RecordClass {
    match s.parse::<GoSubtype>() {
      Ok(subtype) => RecordClass::Go(subtype),
      Err(_) if s == "reference_source" => RecordClass::ReferenceSource,
      Err(_) => RecordClass::External(s.to_string()),
    }
  }
}

// ─── Link attributes ─────────────────────────────────────────────────────────

/// The typed relationship attributes a record can hold edges under.
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
pub enum LinkAttr {
  InstanceOf,
  ComponentOf,
  HasPart,
  Regulates,
  PositivelyRegulates,
  NegativelyRegulates,
  /// An external record's pointer at a molecular-function term.
  Activity,
  /// An external record's pointer at a cellular-component term.
  GoCellularComponent,
  /// A GO term's pointer at the reference-source anchor record.
  ReferenceDatabase,
}

impl LinkAttr {
  /// Attributes whose edges are redirected to a replacement record before a
  /// deletion. `instance_of` is deliberately absent: those edges fall away
  /// with the deleted record.
  pub const REDIRECTABLE: [LinkAttr; 6] = [
    LinkAttr::Activity,
    LinkAttr::ComponentOf,
    LinkAttr::HasPart,
    LinkAttr::NegativelyRegulates,
    LinkAttr::PositivelyRegulates,
    LinkAttr::Regulates,
  ];

  /// Attributes whose referrers get a display-name refresh when the record
  /// they point at changes.
  pub const DISPLAY_REFRESH: [LinkAttr; 2] =
    [LinkAttr::Activity, LinkAttr::GoCellularComponent];

  /// The stored attribute the relationship-rebuild pass writes for a
  /// file-side relationship kind.
  pub fn for_kind(kind: RelationshipKind) -> LinkAttr {
    match kind {
      RelationshipKind::IsA => LinkAttr::InstanceOf,
      RelationshipKind::HasPart => LinkAttr::HasPart,
      RelationshipKind::PartOf => LinkAttr::ComponentOf,
      RelationshipKind::Regulates => LinkAttr::Regulates,
      RelationshipKind::PositivelyRegulates => LinkAttr::PositivelyRegulates,
      RelationshipKind::NegativelyRegulates => LinkAttr::NegativelyRegulates,
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The scalar attributes the store can overwrite on an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarAttr {
  Name,
  Definition,
  DisplayName,
}

impl ScalarAttr {
  pub fn column(self) -> &'static str {
    match self {
      ScalarAttr::Name => "name",
      ScalarAttr::Definition => "definition",
      ScalarAttr::DisplayName => "display_name",
    }
  }
}

/// A record as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
  pub record_id:    i64,
  pub class:        RecordClass,
  pub accession:    Option<String>,
  pub name:         Option<String>,
  pub definition:   Option<String>,
  pub display_name: Option<String>,
  /// EC numbers; only meaningful on molecular-function records.
  pub ec_numbers:   Vec<String>,
  pub created_at:   DateTime<Utc>,
  /// Run stamps of every reconciliation run that touched this record.
  pub modified:     Vec<Uuid>,
}

impl StoredRecord {
  /// The GO subtype, when this record is a GO term at all.
  pub fn subtype(&self) -> Option<GoSubtype> {
    match self.class {
      RecordClass::Go(subtype) => Some(subtype),
      _ => None,
    }
  }
}

/// Input for [`TermStore::create_record`](crate::store::TermStore).
#[derive(Debug, Clone)]
pub struct NewRecord {
  pub class:        RecordClass,
  pub accession:    Option<String>,
  pub name:         Option<String>,
  pub definition:   Option<String>,
  pub display_name: Option<String>,
  pub ec_numbers:   Vec<String>,
  pub created_by:   Option<Uuid>,
}

impl NewRecord {
  pub fn new(class: RecordClass) -> Self {
    NewRecord {
      class,
      accession: None,
      name: None,
      definition: None,
      display_name: None,
      ec_numbers: Vec::new(),
      created_by: None,
    }
  }
}

/// Derive a record's display name from its scalar attributes.
pub fn derive_display_name(name: Option<&str>) -> Option<String> {
  name.map(str::to_string)
}
