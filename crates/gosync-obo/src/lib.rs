//! GO release-file parser for gosync.
//!
//! Handles the subset of the GO flat-file stanza format the reconciliation
//! engine consumes, plus the `ec2go` cross-reference file. Pure synchronous;
//! no database dependencies.
//!
//! Pipeline:
//!   raw lines
//!     └─ parse_go_file()       → stanza state machine
//!          └─ LineParser::apply() → accession-keyed term bag
//!               └─ GoFile          → handed to the reconciliation engine

mod ec2go;
mod line;

pub mod error;

pub use ec2go::parse_ec_index;
pub use error::{Error, Result};

use std::collections::HashMap;

use gosync_core::term::ParsedTerm;

use line::LineParser;

// ─── Public types ────────────────────────────────────────────────────────────

/// The completed in-memory model of one GO release file.
#[derive(Debug)]
pub struct GoFile {
  /// Accession → parsed term. Read-only once built.
  pub terms:      HashMap<String, ParsedTerm>,
  /// Total raw lines consumed, header included.
  pub lines_read: usize,
  /// Number of `[Term]` stanzas seen.
  pub terms_read: usize,
}

// ─── Term model builder ──────────────────────────────────────────────────────

/// Parse a full GO file into its term model.
///
/// A blank line ends the current stanza (its data has already landed in the
/// term bag line by line); a `[Term]` line begins one; every other line
/// inside a stanza goes through the line parser. Lines outside any stanza
/// (the file header, `[Typedef]` blocks) are skipped.
pub fn parse_go_file<'a>(
  lines: impl IntoIterator<Item = &'a str>,
) -> Result<GoFile> {
  let mut parser = LineParser::default();
  let mut terms: HashMap<String, ParsedTerm> = HashMap::new();
  let mut lines_read = 0;
  let mut terms_read = 0;
  let mut in_term = false;

  for line in lines {
    lines_read += 1;
    if line.trim().is_empty() {
      in_term = false;
      parser.reset();
    } else if line == "[Term]" {
      in_term = true;
      terms_read += 1;
    } else if in_term {
      parser.apply(line, &mut terms)?;
    }
  }

  Ok(GoFile {
    terms,
    lines_read,
    terms_read,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
