use super::super::*;
use mb_core::{RowKey, VersionRecord};
use rusqlite::params;

impl SqliteStore {
    /// Creates `name` on top of `from`. Re-creating an open branch with the
    /// same base is a no-op; any other owner of the name is a conflict.
    pub fn create_branch(&mut self, name: &str, from: &str) -> Result<BranchInfo, StoreError> {
        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let (state, _created) = create_branch_tx(&tx, name, from, now_ms)?;
        let info = branch_info_tx(&tx, &state)?;
        tx.commit()?;
        Ok(info)
    }

    pub fn delete_branch(&mut self, name: &str, force: bool) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.write_tx()?;
        delete_branch_tx(&tx, name, force, now_ms)?;
        tx.commit()?;
        Ok(())
    }

    /// Moves the branch cut-off to the current store sequence.
    pub fn rebase_branch(&mut self, name: &str) -> Result<BranchInfo, StoreError> {
        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let state = rebase_branch_tx(&tx, name, now_ms)?;
        let info = branch_info_tx(&tx, &state)?;
        tx.commit()?;
        Ok(info)
    }

    pub fn branch_exists(&self, name: &str) -> Result<bool, StoreError> {
        let tx = self.read_tx()?;
        Ok(open_ref_tx(&tx, name)?.is_some())
    }

    pub fn get_branch(&self, name: &str) -> Result<Option<BranchInfo>, StoreError> {
        let tx = self.read_tx()?;
        match open_ref_tx(&tx, name)? {
            Some(state) => Ok(Some(branch_info_tx(&tx, &state)?)),
            None => Ok(None),
        }
    }

    /// Open branches whose name starts with `prefix`, ordered by name.
    pub fn list_branches(&self, prefix: &str) -> Result<Vec<BranchInfo>, StoreError> {
        let tx = self.read_tx()?;
        let refs = list_open_refs_tx(&tx, prefix)?;
        let mut out = Vec::with_capacity(refs.len());
        for state in refs.iter() {
            out.push(branch_info_tx(&tx, state)?);
        }
        Ok(out)
    }

    /// Commits made directly on an open branch for one key, oldest first.
    pub fn branch_commits(
        &self,
        name: &str,
        key: &RowKey,
    ) -> Result<Vec<VersionRecord>, StoreError> {
        let tx = self.read_tx()?;
        let state = require_ref_tx(&tx, name)?;
        let commits = own_commits_tx(&tx, state.ref_id, key)?;
        let last = commits.len().saturating_sub(1);
        commits
            .iter()
            .enumerate()
            .map(|(index, commit)| commit.to_record(index == last))
            .collect()
    }
}

pub(in crate::store) fn create_branch_tx(
    tx: &Transaction<'_>,
    name: &str,
    from: &str,
    now_ms: i64,
) -> Result<(RefState, bool), StoreError> {
    validate_branch_name(name)?;
    let base = require_ref_tx(tx, from)?;

    if let Some(existing) = open_ref_tx(tx, name)? {
        if existing.base_ref_id == Some(base.ref_id) {
            return Ok((existing, false));
        }
        return Err(StoreError::BranchAlreadyExists);
    }

    if ref_sources_tx(tx, base.ref_id)?.len() > MAX_BRANCH_DEPTH {
        return Err(StoreError::BranchDepthExceeded);
    }

    let base_seq = current_seq_tx(tx)?;
    let state = create_ref_tx(tx, name, Some(&base), Some(base_seq), now_ms)?;
    log::debug!("created branch {name} from {from} at seq={base_seq}");
    Ok((state, true))
}

pub(in crate::store) fn rebase_branch_tx(
    tx: &Transaction<'_>,
    name: &str,
    now_ms: i64,
) -> Result<RefState, StoreError> {
    let mut state = require_ref_tx(tx, name)?;
    if state.base_ref_id.is_none() {
        return Err(StoreError::InvalidInput("branch has no base to rebase onto"));
    }
    let base_seq = current_seq_tx(tx)?;
    tx.execute(
        "UPDATE refs SET base_seq=?2, updated_at_ms=max(updated_at_ms, ?3) WHERE ref_id=?1",
        params![state.ref_id, base_seq, now_ms],
    )?;
    state.base_seq = Some(base_seq);
    state.updated_at_ms = state.updated_at_ms.max(now_ms);
    Ok(state)
}

/// Closes a branch. Without `force` every commit must already be merged;
/// with `force` unmerged commits are discarded first.
pub(in crate::store) fn delete_branch_tx(
    tx: &Transaction<'_>,
    name: &str,
    force: bool,
    now_ms: i64,
) -> Result<(), StoreError> {
    let state = require_ref_tx(tx, name)?;
    if state.base_ref_id.is_none() {
        return Err(StoreError::InvalidInput("main-line ref cannot be deleted"));
    }
    if has_open_dependents_tx(tx, state.ref_id)? {
        return Err(StoreError::InvalidInput(
            "branch has dependent branches; delete them first",
        ));
    }

    let floor = state.merged_floor();
    let unmerged = last_own_seq_tx(tx, state.ref_id)?.is_some_and(|last| last > floor);
    if unmerged {
        if !force {
            return Err(StoreError::BranchNotMerged);
        }
        let discarded = tx.execute(
            "DELETE FROM commits WHERE ref_id=?1 AND seq > ?2",
            params![state.ref_id, floor],
        )?;
        log::debug!("discarded {discarded} unmerged commits from {name}");
    }

    tx.execute(
        "UPDATE refs SET closed_at_ms=?2, updated_at_ms=max(updated_at_ms, ?2) WHERE ref_id=?1",
        params![state.ref_id, now_ms],
    )?;
    log::debug!("closed branch {name} (force={force})");
    Ok(())
}
