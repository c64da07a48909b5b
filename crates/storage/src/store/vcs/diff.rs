use super::super::*;
use mb_core::RowKey;

impl SqliteStore {
    /// Row-level difference of `key` between two refs; `None` when both sides agree.
    pub fn diff(
        &self,
        from_branch: &str,
        to_branch: &str,
        key: &RowKey,
    ) -> Result<Option<RowDiff>, StoreError> {
        let tx = self.read_tx()?;
        let from = require_ref_tx(&tx, from_branch)?;
        let to = require_ref_tx(&tx, to_branch)?;
        row_diff_tx(&tx, &from, &to, key)
    }
}

pub(in crate::store) fn row_diff_tx(
    tx: &Transaction<'_>,
    from: &RefState,
    to: &RefState,
    key: &RowKey,
) -> Result<Option<RowDiff>, StoreError> {
    let from_commit = read_commit_tx(tx, from, key)?;
    let to_commit = read_commit_tx(tx, to, key)?;

    let from_row = from_commit.as_ref().and_then(|c| c.row.clone());
    let to_row = to_commit.as_ref().and_then(|c| c.row.clone());
    if from_row == to_row {
        return Ok(None);
    }

    Ok(Some(RowDiff {
        from_row,
        to_row,
        from_commit_id: from_commit.map(|c| c.commit_id),
        to_commit_id: to_commit.map(|c| c.commit_id),
    }))
}
