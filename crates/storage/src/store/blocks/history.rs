use super::super::*;
use super::decode_block;
use mb_core::{MAIN_BRANCH, MemoryBlock, VersionRecord};

impl SqliteStore {
    /// Main-line history of a block, newest first; the first entry is current.
    pub fn get_block_history(
        &self,
        user_id: &str,
        label: &str,
        limit: usize,
    ) -> Result<Vec<VersionRecord>, StoreError> {
        let key = block_key(user_id, label)?;
        let limit = self.config.history_limit(limit);
        let tx = self.read_tx()?;
        let main = require_ref_tx(&tx, MAIN_BRANCH)?;
        log_tx(&tx, &main, &key, limit)
    }

    /// Read-only snapshot of the block as of `commit_id`. `None` when the
    /// commit is unknown or never reached main-line, and when the block did
    /// not exist at that point.
    pub fn get_block_at_version(
        &self,
        user_id: &str,
        label: &str,
        commit_id: &str,
    ) -> Result<Option<MemoryBlock>, StoreError> {
        let key = block_key(user_id, label)?;
        let tx = self.read_tx()?;
        let Some(commit) = load_commit_tx(&tx, commit_id)? else {
            return Ok(None);
        };
        if !is_main_line_commit_tx(&tx, &commit)? {
            return Ok(None);
        }
        match read_row_at_tx(&tx, &commit, &key)? {
            Some(raw) => Ok(Some(decode_block(&key, &raw)?)),
            None => Ok(None),
        }
    }
}
