use super::super::{StoreError, validate_agent_id};
use super::refs_tx::{RefSource, RefState, ref_sources_tx, touch_ref_tx};
use super::sources_clause::append_sources_clause;
use mb_core::{Author, RowKey, VersionRecord};
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, Row, Transaction, params, params_from_iter};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

const COMMIT_ID_HEX_LEN: usize = 40;

pub(in crate::store) const COMMIT_COLUMNS: &str = "c.seq, c.commit_id, c.ref_id, r.name, c.ns, c.name, \
     c.parent_commit_id, c.merge_parent_id, c.author, c.message, c.row_json, c.created_at_ms";

pub(in crate::store) const COMMIT_FROM: &str = "FROM commits c JOIN refs r ON r.ref_id=c.ref_id";

#[derive(Clone, Debug)]
pub(in crate::store) struct CommitRow {
    pub seq: i64,
    pub commit_id: String,
    pub ref_id: i64,
    pub branch: String,
    pub key: RowKey,
    pub parent_commit_id: Option<String>,
    pub merge_parent_id: Option<String>,
    pub author: String,
    pub message: String,
    pub row: Option<String>,
    pub created_at_ms: i64,
}

impl CommitRow {
    pub fn to_record(&self, is_current: bool) -> Result<VersionRecord, StoreError> {
        let author = Author::parse(&self.author)
            .ok_or(StoreError::InvalidInput("invalid author row"))?;
        Ok(VersionRecord {
            seq: self.seq,
            commit_id: self.commit_id.clone(),
            branch: self.branch.clone(),
            key: self.key.clone(),
            author,
            message: self.message.clone(),
            parent_commit_id: self.parent_commit_id.clone(),
            merge_parent_id: self.merge_parent_id.clone(),
            deleted: self.row.is_none(),
            created_at_ms: self.created_at_ms,
            is_current,
        })
    }
}

pub(in crate::store) fn commit_from_row(row: &Row<'_>) -> rusqlite::Result<CommitRow> {
    Ok(CommitRow {
        seq: row.get(0)?,
        commit_id: row.get(1)?,
        ref_id: row.get(2)?,
        branch: row.get(3)?,
        key: RowKey::new(row.get::<_, String>(4)?, row.get::<_, String>(5)?),
        parent_commit_id: row.get(6)?,
        merge_parent_id: row.get(7)?,
        author: row.get(8)?,
        message: row.get(9)?,
        row: row.get(10)?,
        created_at_ms: row.get(11)?,
    })
}

/// Everything a commit needs besides its position in the log.
pub(in crate::store) struct NewCommit<'a> {
    pub key: &'a RowKey,
    pub row: Option<&'a str>,
    pub author: &'a Author,
    pub message: &'a str,
    pub merge_parent_id: Option<&'a str>,
    pub now_ms: i64,
}

pub(in crate::store) fn current_seq_tx(tx: &Transaction<'_>) -> Result<i64, StoreError> {
    Ok(tx.query_row(
        "SELECT last_seq FROM store_state WHERE singleton=1",
        [],
        |row| row.get::<_, i64>(0),
    )?)
}

/// Sequence numbers are never reused, even after unmerged commits are discarded.
fn next_seq_tx(tx: &Transaction<'_>, now_ms: i64) -> Result<i64, StoreError> {
    tx.execute(
        "UPDATE store_state SET last_seq=last_seq + 1, updated_at_ms=?1 WHERE singleton=1",
        params![now_ms],
    )?;
    current_seq_tx(tx)
}

pub(in crate::store) fn load_commit_tx(
    tx: &Transaction<'_>,
    commit_id: &str,
) -> Result<Option<CommitRow>, StoreError> {
    Ok(tx
        .query_row(
            &format!("SELECT {COMMIT_COLUMNS} {COMMIT_FROM} WHERE c.commit_id=?1"),
            params![commit_id],
            commit_from_row,
        )
        .optional()?)
}

/// Newest commit for `key` visible through `sources`, optionally as of a sequence.
pub(in crate::store) fn visible_commit_tx(
    tx: &Transaction<'_>,
    sources: &[RefSource],
    key: &RowKey,
    as_of_seq: Option<i64>,
) -> Result<Option<CommitRow>, StoreError> {
    let mut sql = format!("SELECT {COMMIT_COLUMNS} {COMMIT_FROM} WHERE c.ns=? AND c.name=? AND ");
    let mut values = vec![
        SqlValue::Text(key.namespace.clone()),
        SqlValue::Text(key.name.clone()),
    ];
    append_sources_clause(&mut sql, &mut values, sources);
    if let Some(as_of_seq) = as_of_seq {
        sql.push_str(" AND c.seq <= ?");
        values.push(SqlValue::Integer(as_of_seq));
    }
    sql.push_str(" ORDER BY c.seq DESC LIMIT 1");

    Ok(tx
        .query_row(&sql, params_from_iter(values), commit_from_row)
        .optional()?)
}

pub(in crate::store) fn visible_names_tx(
    tx: &Transaction<'_>,
    sources: &[RefSource],
    namespace: &str,
) -> Result<Vec<String>, StoreError> {
    let mut sql = String::from("SELECT DISTINCT c.name FROM commits c WHERE c.ns=? AND ");
    let mut values = vec![SqlValue::Text(namespace.to_string())];
    append_sources_clause(&mut sql, &mut values, sources);
    sql.push_str(" ORDER BY c.name ASC");

    let mut stmt = tx.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Commits made directly on a ref for one key, oldest first.
pub(in crate::store) fn own_commits_tx(
    tx: &Transaction<'_>,
    ref_id: i64,
    key: &RowKey,
) -> Result<Vec<CommitRow>, StoreError> {
    let mut stmt = tx.prepare(&format!(
        "SELECT {COMMIT_COLUMNS} {COMMIT_FROM} \
         WHERE c.ref_id=?1 AND c.ns=?2 AND c.name=?3 \
         ORDER BY c.seq ASC"
    ))?;
    let rows = stmt.query_map(params![ref_id, key.namespace, key.name], commit_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Keys with commits on the ref above `floor_seq`.
pub(in crate::store) fn touched_keys_tx(
    tx: &Transaction<'_>,
    ref_id: i64,
    floor_seq: i64,
) -> Result<Vec<RowKey>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT DISTINCT ns, name FROM commits WHERE ref_id=?1 AND seq > ?2 ORDER BY ns ASC, name ASC",
    )?;
    let rows = stmt.query_map(params![ref_id, floor_seq], |row| {
        Ok(RowKey::new(
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// A commit is part of main-line when it was written there or merged in from its branch.
pub(in crate::store) fn is_main_line_commit_tx(
    tx: &Transaction<'_>,
    commit: &CommitRow,
) -> Result<bool, StoreError> {
    let (base_ref_id, merged_seq) = tx.query_row(
        "SELECT base_ref_id, merged_seq FROM refs WHERE ref_id=?1",
        params![commit.ref_id],
        |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?)),
    )?;
    Ok(base_ref_id.is_none() || merged_seq.is_some_and(|merged| commit.seq <= merged))
}

pub(in crate::store) fn last_own_seq_tx(
    tx: &Transaction<'_>,
    ref_id: i64,
) -> Result<Option<i64>, StoreError> {
    Ok(tx.query_row(
        "SELECT MAX(seq) FROM commits WHERE ref_id=?1",
        params![ref_id],
        |row| row.get::<_, Option<i64>>(0),
    )?)
}

/// Appends one commit to `target`, parented on the key's currently visible commit.
pub(in crate::store) fn write_row_tx(
    tx: &Transaction<'_>,
    target: &RefState,
    commit: NewCommit<'_>,
) -> Result<CommitRow, StoreError> {
    // Authors must read back through `Author::parse`.
    if let Some(agent_id) = commit.author.agent_id() {
        validate_agent_id(agent_id)?;
    }
    let sources = ref_sources_tx(tx, target.ref_id)?;
    let parent = visible_commit_tx(tx, &sources, commit.key, None)?;
    let parent_commit_id = parent.map(|p| p.commit_id);
    let author = commit.author.to_string();
    let seq = next_seq_tx(tx, commit.now_ms)?;

    let commit_id = commit_hash(&[
        target.name.as_str(),
        commit.key.namespace.as_str(),
        commit.key.name.as_str(),
        parent_commit_id.as_deref().unwrap_or(""),
        commit.merge_parent_id.unwrap_or(""),
        commit.row.unwrap_or("\u{0}tombstone"),
        author.as_str(),
        commit.message,
        &commit.now_ms.to_string(),
        &seq.to_string(),
    ]);

    tx.execute(
        "INSERT INTO commits(seq, commit_id, ref_id, ns, name, parent_commit_id, merge_parent_id, author, message, row_json, created_at_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            seq,
            commit_id,
            target.ref_id,
            commit.key.namespace,
            commit.key.name,
            parent_commit_id,
            commit.merge_parent_id,
            author,
            commit.message,
            commit.row,
            commit.now_ms,
        ],
    )?;
    touch_ref_tx(tx, target.ref_id, commit.now_ms)?;

    log::debug!(
        "commit {commit_id} on {} ({}/{}) seq={seq}",
        target.name,
        commit.key.namespace,
        commit.key.name
    );

    Ok(CommitRow {
        seq,
        commit_id,
        ref_id: target.ref_id,
        branch: target.name.clone(),
        key: commit.key.clone(),
        parent_commit_id,
        merge_parent_id: commit.merge_parent_id.map(str::to_string),
        author,
        message: commit.message.to_string(),
        row: commit.row.map(str::to_string),
        created_at_ms: commit.now_ms,
    })
}

fn commit_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(&mut out, "{b:02x}");
    }
    out.truncate(COMMIT_ID_HEX_LEN);
    out
}
