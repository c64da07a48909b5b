use super::super::*;
use mb_core::{Author, BlockRow, CommitMessage, MAIN_BRANCH};

impl SqliteStore {
    /// Re-applies the snapshot stored by `commit_id` as a new main-line commit.
    /// History is never rewritten; restoring a tombstone deletes the block.
    /// Only main-line snapshots qualify, so open proposals cannot bypass approval.
    pub fn restore_block(
        &mut self,
        user_id: &str,
        label: &str,
        commit_id: &str,
        author: &Author,
    ) -> Result<String, StoreError> {
        let key = block_key(user_id, label)?;
        let now_ms = now_ms();
        let tx = self.write_tx()?;

        let Some(source) = load_commit_tx(&tx, commit_id)? else {
            return Err(StoreError::UnknownCommit);
        };
        if source.key != key {
            return Err(StoreError::CommitKeyMismatch);
        }
        if !is_main_line_commit_tx(&tx, &source)? {
            return Err(StoreError::UnmergedCommit);
        }

        let restored = match source.row.as_deref() {
            Some(raw) => {
                let mut row = BlockRow::decode(raw)?;
                row.updated_at_ms = now_ms;
                Some(row.encode()?)
            }
            None => None,
        };

        let message = CommitMessage::restore(user_id, label, commit_id).encode()?;
        let main = require_ref_tx(&tx, MAIN_BRANCH)?;
        let commit = write_row_tx(
            &tx,
            &main,
            NewCommit {
                key: &key,
                row: restored.as_deref(),
                author,
                message: &message,
                merge_parent_id: None,
                now_ms,
            },
        )?;
        tx.commit()?;

        log::info!("restored block {user_id}/{label} to {commit_id} as {}", commit.commit_id);
        Ok(commit.commit_id)
    }
}
