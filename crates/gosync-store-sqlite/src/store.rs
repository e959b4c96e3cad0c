//! [`SqliteStore`] — the SQLite implementation of [`TermStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use gosync_core::{
  record::{LinkAttr, NewRecord, RecordClass, ScalarAttr, StoredRecord},
  store::TermStore,
};

use crate::{
  Error, Result,
  encode::{
    RawRecord, decode_attr, decode_stamps, encode_attr, encode_dt,
    encode_stamps, encode_strings,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A gosync record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Transaction bracket ───────────────────────────────────────────────────
  // The caller owns the transaction boundary: the engine's reads must see
  // its own writes, but durability is decided once, at the end of the run.

  pub async fn begin_work(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("BEGIN")?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn commit_work(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("COMMIT")?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn rollback_work(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("ROLLBACK")?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TermStore impl ──────────────────────────────────────────────────────────

impl TermStore for SqliteStore {
  type Error = Error;

  // ── Queries ───────────────────────────────────────────────────────────────

  async fn list_records(&self, class: RecordClass) -> Result<Vec<StoredRecord>> {
    let class_str = class.as_str().to_owned();

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM records WHERE class = ?1",
          RawRecord::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![class_str], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn find_by_name(
    &self,
    class: RecordClass,
    name: &str,
  ) -> Result<Vec<StoredRecord>> {
    let class_str = class.as_str().to_owned();
    let name = name.to_owned();

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM records WHERE class = ?1 AND name = ?2",
          RawRecord::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![class_str, name], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn get_record(&self, id: i64) -> Result<Option<StoredRecord>> {
    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM records WHERE record_id = ?1",
                RawRecord::COLUMNS
              ),
              rusqlite::params![id],
              RawRecord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  // ── Record mutation ───────────────────────────────────────────────────────

  async fn create_record(&self, record: NewRecord) -> Result<i64> {
    let class_str      = record.class.as_str().to_owned();
    let ec_json        = encode_strings(&record.ec_numbers)?;
    let created_by_str = record.created_by.map(|u| u.to_string());
    let created_at_str = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (
             class, accession, name, definition, display_name,
             ec_numbers, created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            class_str,
            record.accession,
            record.name,
            record.definition,
            record.display_name,
            ec_json,
            created_by_str,
            created_at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(id)
  }

  async fn set_scalar(
    &self,
    id: i64,
    attr: ScalarAttr,
    value: Option<&str>,
  ) -> Result<()> {
    let value = value.map(str::to_owned);
    // `column()` yields a fixed identifier, never user input.
    let sql = format!(
      "UPDATE records SET {} = ?1 WHERE record_id = ?2",
      attr.column()
    );

    let affected = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![value, id])?))
      .await?;

    if affected == 0 {
      return Err(Error::RecordNotFound(id));
    }
    Ok(())
  }

  async fn set_ec_numbers(&self, id: i64, numbers: &[String]) -> Result<()> {
    let ec_json = encode_strings(numbers)?;

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE records SET ec_numbers = ?1 WHERE record_id = ?2",
          rusqlite::params![ec_json, id],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RecordNotFound(id));
    }
    Ok(())
  }

  async fn touch(&self, id: i64, stamp: Uuid) -> Result<()> {
    let current: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT modified FROM records WHERE record_id = ?1",
              rusqlite::params![id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    let Some(current) = current else {
      return Err(Error::RecordNotFound(id));
    };

    let mut stamps = decode_stamps(&current)?;
    stamps.push(stamp);
    let stamps_json = encode_stamps(&stamps)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE records SET modified = ?1 WHERE record_id = ?2",
          rusqlite::params![stamps_json, id],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn delete_record(&self, id: i64) -> Result<()> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM records WHERE record_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RecordNotFound(id));
    }
    Ok(())
  }

  // ── Typed relationship edges ──────────────────────────────────────────────

  async fn links_from(&self, id: i64, attr: LinkAttr) -> Result<Vec<i64>> {
    let attr_str = encode_attr(attr);

    let targets = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT target_id FROM links
           WHERE source_id = ?1 AND attribute = ?2
           ORDER BY link_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id, attr_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(targets)
  }

  async fn clear_links(&self, id: i64, attr: LinkAttr) -> Result<()> {
    let attr_str = encode_attr(attr);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM links WHERE source_id = ?1 AND attribute = ?2",
          rusqlite::params![id, attr_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn add_links(
    &self,
    id: i64,
    attr: LinkAttr,
    targets: &[i64],
  ) -> Result<()> {
    let attr_str = encode_attr(attr);
    let targets = targets.to_vec();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT INTO links (source_id, attribute, target_id)
           VALUES (?1, ?2, ?3)",
        )?;
        for target in targets {
          stmt.execute(rusqlite::params![id, attr_str, target])?;
        }
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Referrers ─────────────────────────────────────────────────────────────

  async fn referrers_via(
    &self,
    id: i64,
    attr: LinkAttr,
  ) -> Result<Vec<StoredRecord>> {
    let attr_str = encode_attr(attr);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT r.record_id, r.class, r.accession, r.name,
                  r.definition, r.display_name, r.ec_numbers, r.created_at,
                  r.modified
           FROM records r
           JOIN links l ON l.source_id = r.record_id
           WHERE l.target_id = ?1 AND l.attribute = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id, attr_str], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn referrer_counts(&self, id: i64) -> Result<HashMap<LinkAttr, usize>> {
    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT attribute, COUNT(*) FROM links
           WHERE target_id = ?1
           GROUP BY attribute",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut counts = HashMap::new();
    for (attr_str, count) in rows {
      counts.insert(decode_attr(&attr_str)?, count as usize);
    }
    Ok(counts)
  }

  async fn relink(
    &self,
    referrer: i64,
    attr: LinkAttr,
    from: i64,
    to: i64,
  ) -> Result<()> {
    let attr_str = encode_attr(attr);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE links SET target_id = ?1
           WHERE source_id = ?2 AND attribute = ?3 AND target_id = ?4",
          rusqlite::params![to, referrer, attr_str, from],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
