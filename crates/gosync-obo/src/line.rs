//! Stanza-line tokenizer.
//!
//! Pipeline:
//!   raw line
//!     └─ decode()          → Option<TagLine>   (match / no-match, no errors)
//!          └─ LineParser::apply() → one mutation of the term bag
//!
//! The parser knows nothing about stanza boundaries; the builder in `lib.rs`
//! tracks those and calls [`LineParser::reset`] when a stanza closes.

use std::{collections::HashMap, sync::LazyLock};

use gosync_core::term::{GoNamespace, ParsedTerm, RelationshipKind};
use regex::Regex;

use crate::error::{Error, Result};

// ─── Tag patterns ────────────────────────────────────────────────────────────

// Target-bearing lines may carry an optional `! comment` trailer after the
// accession; value-bearing lines are captured whole and trimmed.

static ID_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^id:\s*GO:(\d+)\s*$").unwrap());
static ALT_ID_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^alt_id:\s*GO:(\d+)\s*(?:!.*)?$").unwrap());
static NAME_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^name:\s*(\S.*?)\s*$").unwrap());
static NAMESPACE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^namespace:\s*(\S+)\s*$").unwrap());
static DEF_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"^def:\s*"(.*)"\s*\[.*\]\s*$"#).unwrap());
static SYNONYM_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"^synonym:\s*"(.*)".*$"#).unwrap());
static IS_A_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^is_a:\s*GO:(\d+)\s*(?:!.*)?$").unwrap());
static CONSIDER_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^consider:\s*GO:(\d+)\s*(?:!.*)?$").unwrap());
static REPLACED_BY_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^replaced_by:\s*GO:(\d+)\s*(?:!.*)?$").unwrap()
});
static IS_OBSOLETE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^is_obsolete:\s*true\s*$").unwrap());
static RELATIONSHIP_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^relationship:\s*([a-z_]+)\s+GO:(\d+)\s*(?:!.*)?$").unwrap()
});
// The pending-obsolescence marker is a bare line with no colon.
static PENDING_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^pending_obsoletion\s*$").unwrap());

// ─── Decoded lines ───────────────────────────────────────────────────────────

/// One recognized stanza line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TagLine {
  Id(String),
  AltId(String),
  Name(String),
  Namespace(GoNamespace),
  Def(String),
  Synonym(String),
  Consider(String),
  ReplacedBy(String),
  IsObsolete,
  PendingObsolete,
  Relationship(RelationshipKind, String),
}

/// Decode one raw line against the fixed tag vocabulary.
///
/// `None` means the line is not ours: unknown tags (`subset`, `xref`,
/// `comment`, `disjoint_from`, …), unknown relationship kinds, and values
/// that fail their pattern (e.g. a `def:` with no closing quote) are all
/// silently skipped, never errors.
pub(crate) fn decode(line: &str) -> Option<TagLine> {
  if let Some(c) = ID_RE.captures(line) {
    return Some(TagLine::Id(c[1].to_string()));
  }
  if let Some(c) = ALT_ID_RE.captures(line) {
    return Some(TagLine::AltId(c[1].to_string()));
  }
  if let Some(c) = NAMESPACE_RE.captures(line) {
    return c[1].parse::<GoNamespace>().ok().map(TagLine::Namespace);
  }
  if let Some(c) = DEF_RE.captures(line) {
    return Some(TagLine::Def(c[1].to_string()));
  }
  if let Some(c) = SYNONYM_RE.captures(line) {
    return Some(TagLine::Synonym(c[1].to_string()));
  }
  if let Some(c) = IS_A_RE.captures(line) {
    return Some(TagLine::Relationship(
      RelationshipKind::IsA,
      c[1].to_string(),
    ));
  }
  if let Some(c) = CONSIDER_RE.captures(line) {
    return Some(TagLine::Consider(c[1].to_string()));
  }
  if let Some(c) = REPLACED_BY_RE.captures(line) {
    return Some(TagLine::ReplacedBy(c[1].to_string()));
  }
  if IS_OBSOLETE_RE.is_match(line) {
    return Some(TagLine::IsObsolete);
  }
  if let Some(c) = RELATIONSHIP_RE.captures(line) {
    // `is_a` never appears as a relationship sub-kind; treat it (and any
    // other kind outside the vocabulary) as unrecognized.
    return match c[1].parse::<RelationshipKind>() {
      Ok(RelationshipKind::IsA) | Err(_) => None,
      Ok(kind) => Some(TagLine::Relationship(kind, c[2].to_string())),
    };
  }
  if PENDING_RE.is_match(line) {
    return Some(TagLine::PendingObsolete);
  }
  if let Some(c) = NAME_RE.captures(line) {
    return Some(TagLine::Name(c[1].to_string()));
  }
  None
}

// ─── Line parser ─────────────────────────────────────────────────────────────

/// Applies decoded lines to the accumulating term bag.
///
/// Tracks only which accession is currently open; stanza boundaries are the
/// caller's business.
#[derive(Default)]
pub(crate) struct LineParser {
  current: Option<String>,
}

impl LineParser {
  /// Forget the open accession. Called when the builder sees a stanza end,
  /// so stray tag lines in the next stanza cannot mutate a closed term.
  pub(crate) fn reset(&mut self) { self.current = None; }

  /// Apply exactly one mutation for `line`, or none if it is unrecognized.
  pub(crate) fn apply(
    &mut self,
    line: &str,
    terms: &mut HashMap<String, ParsedTerm>,
  ) -> Result<()> {
    let Some(tag) = decode(line) else {
      return Ok(());
    };

    match tag {
      TagLine::Id(accession) => {
        if terms.contains_key(&accession) {
          return Err(Error::DuplicateAccession(accession));
        }
        terms.insert(accession.clone(), ParsedTerm::new(&accession));
        self.current = Some(accession);
      }
      tag => {
        // Every other tag needs an open term; lines arriving before the
        // stanza's `id:` have nowhere to land and are dropped.
        let Some(term) = self.current.as_ref().and_then(|a| terms.get_mut(a))
        else {
          return Ok(());
        };

        match tag {
          TagLine::Id(_) => unreachable!("handled by the outer match"),
          TagLine::Name(name) => {
            if term.name.is_some() {
              return Err(Error::DuplicateName(term.accession.clone()));
            }
            term.name = Some(name);
          }
          TagLine::Namespace(ns) => term.namespace = Some(ns),
          TagLine::Def(def) => term.definition = Some(def),
          TagLine::AltId(accession) => term.alt_ids.push(accession),
          TagLine::Synonym(synonym) => term.synonyms.push(synonym),
          TagLine::Consider(accession) => term.consider.push(accession),
          TagLine::ReplacedBy(accession) => term.replaced_by.push(accession),
          TagLine::IsObsolete => term.is_obsolete = true,
          TagLine::PendingObsolete => term.pending_obsolete = true,
          TagLine::Relationship(kind, accession) => {
            term.targets_mut(kind).push(accession);
          }
        }
      }
    }
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
