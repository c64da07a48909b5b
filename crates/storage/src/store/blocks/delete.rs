use super::super::*;
use super::read_block_tx;
use mb_core::{Author, MAIN_BRANCH};

impl SqliteStore {
    /// Writes a tombstone on main-line; `None` when the block does not exist.
    pub fn delete_block(
        &mut self,
        user_id: &str,
        label: &str,
        author: &Author,
    ) -> Result<Option<String>, StoreError> {
        let key = block_key(user_id, label)?;
        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let main = require_ref_tx(&tx, MAIN_BRANCH)?;
        if read_block_tx(&tx, &main, &key)?.is_none() {
            return Ok(None);
        }

        let message = format!("delete {label}");
        let commit = write_row_tx(
            &tx,
            &main,
            NewCommit {
                key: &key,
                row: None,
                author,
                message: &message,
                merge_parent_id: None,
                now_ms,
            },
        )?;
        tx.commit()?;

        log::debug!("deleted block {user_id}/{label} by {author}");
        Ok(Some(commit.commit_id))
    }
}
