//! Row ↔ domain-type conversions for the SQLite store.

use chrono::{DateTime, Utc};
use gosync_core::record::{LinkAttr, RecordClass, StoredRecord};
use uuid::Uuid;

use crate::{Error, Result};

pub(crate) fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub(crate) fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub(crate) fn encode_attr(attr: LinkAttr) -> String { attr.to_string() }

pub(crate) fn decode_attr(s: &str) -> Result<LinkAttr> {
  s.parse()
    .map_err(|_| gosync_core::Error::UnknownLinkAttr(s.to_string()).into())
}

pub(crate) fn encode_strings(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub(crate) fn encode_stamps(stamps: &[Uuid]) -> Result<String> {
  Ok(serde_json::to_string(stamps)?)
}

pub(crate) fn decode_stamps(s: &str) -> Result<Vec<Uuid>> {
  Ok(serde_json::from_str(s)?)
}

/// A `records` row before decoding.
pub(crate) struct RawRecord {
  pub record_id:    i64,
  pub class:        String,
  pub accession:    Option<String>,
  pub name:         Option<String>,
  pub definition:   Option<String>,
  pub display_name: Option<String>,
  pub ec_numbers:   String,
  pub created_at:   String,
  pub modified:     String,
}

impl RawRecord {
  /// The column list matching [`RawRecord::from_row`].
  pub(crate) const COLUMNS: &'static str = "record_id, class, accession, \
     name, definition, display_name, ec_numbers, created_at, modified";

  pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawRecord {
      record_id:    row.get(0)?,
      class:        row.get(1)?,
      accession:    row.get(2)?,
      name:         row.get(3)?,
      definition:   row.get(4)?,
      display_name: row.get(5)?,
      ec_numbers:   row.get(6)?,
      created_at:   row.get(7)?,
      modified:     row.get(8)?,
    })
  }

  pub(crate) fn into_record(self) -> Result<StoredRecord> {
    Ok(StoredRecord {
      record_id:    self.record_id,
      class:        RecordClass::parse(&self.class),
      accession:    self.accession,
      name:         self.name,
      definition:   self.definition,
      display_name: self.display_name,
      ec_numbers:   serde_json::from_str(&self.ec_numbers)?,
      created_at:   decode_dt(&self.created_at)?,
      modified:     decode_stamps(&self.modified)?,
    })
  }
}
