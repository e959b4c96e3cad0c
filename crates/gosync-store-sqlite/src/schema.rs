//! SQL schema for the gosync SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per stored record, GO terms and everything that may refer to
-- them alike. `record_id` is the store-assigned identity; accessions are
-- attributes and may repeat across rows.
CREATE TABLE IF NOT EXISTS records (
    record_id    INTEGER PRIMARY KEY,
    class        TEXT NOT NULL,
    accession    TEXT,
    name         TEXT,
    definition   TEXT,
    display_name TEXT,
    ec_numbers   TEXT NOT NULL DEFAULT '[]',  -- JSON list of strings
    created_by   TEXT,                        -- run stamp UUID
    created_at   TEXT NOT NULL,               -- ISO 8601 UTC
    modified     TEXT NOT NULL DEFAULT '[]'   -- JSON list of run stamp UUIDs
);

-- Typed relationship edges. Deleting a record takes its edges with it in
-- both directions.
CREATE TABLE IF NOT EXISTS links (
    link_id   INTEGER PRIMARY KEY,
    source_id INTEGER NOT NULL REFERENCES records(record_id) ON DELETE CASCADE,
    attribute TEXT NOT NULL,
    target_id INTEGER NOT NULL REFERENCES records(record_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS records_class_idx     ON records(class);
CREATE INDEX IF NOT EXISTS records_accession_idx ON records(accession);
CREATE INDEX IF NOT EXISTS links_source_idx      ON links(source_id, attribute);
CREATE INDEX IF NOT EXISTS links_target_idx      ON links(target_id, attribute);

PRAGMA user_version = 1;
";
