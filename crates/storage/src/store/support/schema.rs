use super::super::StoreError;
use mb_core::MAIN_BRANCH;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::collections::BTreeSet;

pub(in crate::store) const SCHEMA_VERSION: i64 = 1;

const REQUIRED_TABLES: [&str; 3] = ["store_state", "refs", "commits"];

/// Refuses databases that carry foreign tables or another schema version.
pub(in crate::store) fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    if tables
        .iter()
        .any(|table| !REQUIRED_TABLES.contains(&table.as_str()))
    {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported tables detected",
        ));
    }

    for table in REQUIRED_TABLES {
        if !tables.contains(table) {
            return Err(StoreError::InvalidInput(
                "RESET_REQUIRED: required table is missing",
            ));
        }
    }

    let version = conn
        .query_row(
            "SELECT schema_version FROM store_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        )),
    }
}

pub(in crate::store) fn install_schema(conn: &mut Connection, now_ms: i64) -> Result<(), StoreError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          last_seq INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS refs (
          ref_id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          base_ref_id INTEGER REFERENCES refs(ref_id) ON DELETE RESTRICT,
          base_seq INTEGER,
          merged_seq INTEGER,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          closed_at_ms INTEGER,
          CHECK(base_ref_id IS NULL OR base_ref_id <> ref_id),
          CHECK((base_ref_id IS NULL) = (base_seq IS NULL))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_refs_open_name
          ON refs(name) WHERE closed_at_ms IS NULL;

        CREATE INDEX IF NOT EXISTS idx_refs_base
          ON refs(base_ref_id) WHERE closed_at_ms IS NULL;

        CREATE TABLE IF NOT EXISTS commits (
          seq INTEGER PRIMARY KEY,
          commit_id TEXT NOT NULL UNIQUE,
          ref_id INTEGER NOT NULL REFERENCES refs(ref_id) ON DELETE RESTRICT,
          ns TEXT NOT NULL,
          name TEXT NOT NULL,
          parent_commit_id TEXT,
          merge_parent_id TEXT,
          author TEXT NOT NULL,
          message TEXT NOT NULL,
          row_json TEXT,
          created_at_ms INTEGER NOT NULL,
          CHECK(parent_commit_id IS NULL OR parent_commit_id <> commit_id)
        );

        CREATE INDEX IF NOT EXISTS idx_commits_key
          ON commits(ns, name, seq);

        CREATE INDEX IF NOT EXISTS idx_commits_ref_key
          ON commits(ref_id, ns, name, seq);
        "#,
    )?;

    tx.execute(
        "INSERT INTO store_state(singleton, schema_version, last_seq, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, 0, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    tx.execute(
        "INSERT INTO refs(name, base_ref_id, base_seq, merged_seq, created_at_ms, updated_at_ms, closed_at_ms) \
         SELECT ?1, NULL, NULL, NULL, ?2, ?2, NULL \
         WHERE NOT EXISTS (SELECT 1 FROM refs WHERE name=?1 AND closed_at_ms IS NULL)",
        params![MAIN_BRANCH, now_ms],
    )?;

    tx.commit()?;
    Ok(())
}
