use super::super::*;
use mb_core::Author;
use rusqlite::params;

impl SqliteStore {
    /// Folds every unmerged key of `branch` into `into` (one commit per key).
    pub fn merge(
        &mut self,
        branch: &str,
        into: &str,
        author: &Author,
        message: &str,
    ) -> Result<Vec<String>, StoreError> {
        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let commits = merge_tx(&tx, branch, into, author, message, now_ms)?;
        tx.commit()?;
        Ok(commits.into_iter().map(|c| c.commit_id).collect())
    }
}

pub(in crate::store) fn merge_tx(
    tx: &Transaction<'_>,
    branch: &str,
    into: &str,
    author: &Author,
    message: &str,
    now_ms: i64,
) -> Result<Vec<CommitRow>, StoreError> {
    let source = require_ref_tx(tx, branch)?;
    let target = require_ref_tx(tx, into)?;
    if source.ref_id == target.ref_id {
        return Err(StoreError::InvalidInput("cannot merge a branch into itself"));
    }

    let keys = touched_keys_tx(tx, source.ref_id, source.merged_floor())?;
    if keys.is_empty() {
        return Err(StoreError::NothingToMerge);
    }

    let mut merged = Vec::with_capacity(keys.len());
    for key in keys.iter() {
        let Some(head) = read_commit_tx(tx, &source, key)? else {
            continue;
        };
        merged.push(write_row_tx(
            tx,
            &target,
            NewCommit {
                key,
                row: head.row.as_deref(),
                author,
                message,
                merge_parent_id: Some(head.commit_id.as_str()),
                now_ms,
            },
        )?);
    }

    let last_own = last_own_seq_tx(tx, source.ref_id)?;
    tx.execute(
        "UPDATE refs SET merged_seq=?2, updated_at_ms=max(updated_at_ms, ?3) WHERE ref_id=?1",
        params![source.ref_id, last_own, now_ms],
    )?;

    log::debug!("merged {} key(s) from {branch} into {into}", merged.len());
    Ok(merged)
}
