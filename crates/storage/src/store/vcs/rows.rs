use super::super::*;
use mb_core::{RowKey, VersionRecord};

impl SqliteStore {
    pub fn read(&self, branch: &str, key: &RowKey) -> Result<Option<String>, StoreError> {
        let tx = self.read_tx()?;
        let state = require_ref_tx(&tx, branch)?;
        Ok(read_commit_tx(&tx, &state, key)?.and_then(|commit| commit.row))
    }

    /// Appends a commit for `request.key` on `request.branch` and returns its id.
    pub fn write(&mut self, request: WriteRequest) -> Result<String, StoreError> {
        let WriteRequest {
            branch,
            key,
            row,
            author,
            message,
        } = request;

        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let state = require_ref_tx(&tx, &branch)?;
        let commit = write_row_tx(
            &tx,
            &state,
            NewCommit {
                key: &key,
                row: row.as_deref(),
                author: &author,
                message: &message,
                merge_parent_id: None,
                now_ms,
            },
        )?;
        tx.commit()?;
        Ok(commit.commit_id)
    }

    /// Live rows of `namespace` visible on `branch`, ordered by name.
    pub fn scan(&self, branch: &str, namespace: &str) -> Result<Vec<ScannedRow>, StoreError> {
        let tx = self.read_tx()?;
        let state = require_ref_tx(&tx, branch)?;
        scan_tx(&tx, &state, namespace)
    }

    pub fn show_commit(&self, commit_id: &str) -> Result<Option<VersionRecord>, StoreError> {
        let tx = self.read_tx()?;
        match load_commit_tx(&tx, commit_id)? {
            Some(commit) => Ok(Some(commit.to_record(false)?)),
            None => Ok(None),
        }
    }

    /// Value of `key` as the commit's branch saw it right after `commit_id`.
    pub fn read_at(&self, commit_id: &str, key: &RowKey) -> Result<Option<String>, StoreError> {
        let tx = self.read_tx()?;
        let Some(commit) = load_commit_tx(&tx, commit_id)? else {
            return Err(StoreError::UnknownCommit);
        };
        read_row_at_tx(&tx, &commit, key)
    }
}

pub(in crate::store) fn read_commit_tx(
    tx: &Transaction<'_>,
    state: &RefState,
    key: &RowKey,
) -> Result<Option<CommitRow>, StoreError> {
    let sources = ref_sources_tx(tx, state.ref_id)?;
    visible_commit_tx(tx, &sources, key, None)
}

pub(in crate::store) fn read_row_at_tx(
    tx: &Transaction<'_>,
    commit: &CommitRow,
    key: &RowKey,
) -> Result<Option<String>, StoreError> {
    if &commit.key == key {
        return Ok(commit.row.clone());
    }
    let sources = ref_sources_tx(tx, commit.ref_id)?;
    Ok(visible_commit_tx(tx, &sources, key, Some(commit.seq))?.and_then(|c| c.row))
}

pub(in crate::store) fn scan_tx(
    tx: &Transaction<'_>,
    state: &RefState,
    namespace: &str,
) -> Result<Vec<ScannedRow>, StoreError> {
    let sources = ref_sources_tx(tx, state.ref_id)?;
    let mut out = Vec::new();
    for name in visible_names_tx(tx, &sources, namespace)? {
        let key = RowKey::new(namespace, name.as_str());
        let Some(commit) = visible_commit_tx(tx, &sources, &key, None)? else {
            continue;
        };
        if let Some(row) = commit.row {
            out.push(ScannedRow {
                name,
                row,
                commit_id: commit.commit_id,
            });
        }
    }
    Ok(out)
}
