//! EC-to-GO cross-reference parser.
//!
//! The `ec2go` file maps enzyme-classification numbers to GO accessions, one
//! per line:
//!
//! ```text
//! EC:1.2 > GO:epoxyqueuosine reductase activity ; GO:0000003
//! ```
//!
//! Parsing is best-effort: `!`-prefixed comments and lines that fail the
//! pattern are skipped without error.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

static EC_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^EC:([0-9.\-]+)\s*>\s*GO:.*;\s*GO:(\d+)\s*$").unwrap()
});

/// Build the accession → EC-number index from the raw `ec2go` lines.
pub fn parse_ec_index<'a>(
  lines: impl IntoIterator<Item = &'a str>,
) -> HashMap<String, Vec<String>> {
  let mut index: HashMap<String, Vec<String>> = HashMap::new();
  for line in lines {
    if line.starts_with('!') {
      continue;
    }
    let Some(caps) = EC_LINE_RE.captures(line) else {
      tracing::debug!(line, "skipping unmatched ec2go line");
      continue;
    };
    index
      .entry(caps[2].to_string())
      .or_default()
      .push(caps[1].to_string());
  }
  index
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = "\
! Generated from the ontology 'go' with data version: 'releases/2025-06-01'
!
EC:1 > GO:N-ethylmaleimide reductase activity ; GO:0000099
EC:1 > GO:oxidoreductase activity ; GO:0000003
EC:1.2 > GO:epoxyqueuosine reductase activity ; GO:0000003
EC:1.14.13.39 > GO:nitric-oxide synthase activity ; GO:0004517
this line matches nothing at all
EC:malformed";

  #[test]
  fn comments_and_malformed_lines_are_skipped() {
    let index = parse_ec_index(SAMPLE.lines());
    assert_eq!(index.len(), 3);
    assert!(!index.contains_key("malformed"));
  }

  #[test]
  fn ec_numbers_accumulate_per_accession() {
    let index = parse_ec_index(SAMPLE.lines());
    assert_eq!(index["0000099"], ["1"]);
    assert_eq!(index["0000003"], ["1", "1.2"]);
    assert_eq!(index["0004517"], ["1.14.13.39"]);
  }
}
