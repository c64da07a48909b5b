use super::super::*;
use mb_core::{RowKey, VersionRecord};

impl SqliteStore {
    /// First-parent history of `key` as seen from `branch`, newest first.
    pub fn log(
        &self,
        branch: &str,
        key: &RowKey,
        limit: usize,
    ) -> Result<Vec<VersionRecord>, StoreError> {
        let limit = self.config.history_limit(limit);
        let tx = self.read_tx()?;
        let state = require_ref_tx(&tx, branch)?;
        log_tx(&tx, &state, key, limit)
    }
}

pub(in crate::store) fn log_tx(
    tx: &Transaction<'_>,
    state: &RefState,
    key: &RowKey,
    limit: usize,
) -> Result<Vec<VersionRecord>, StoreError> {
    let mut out = Vec::new();
    let mut next = read_commit_tx(tx, state, key)?;

    while let Some(commit) = next {
        if out.len() >= limit {
            break;
        }
        out.push(commit.to_record(out.is_empty())?);
        next = match commit.parent_commit_id.as_deref() {
            // Parents discarded with a rejected branch end the walk.
            Some(parent_id) => load_commit_tx(tx, parent_id)?,
            None => None,
        };
    }

    Ok(out)
}
