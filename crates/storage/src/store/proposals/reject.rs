use super::super::*;
use mb_core::proposal_branch_name;

impl SqliteStore {
    /// Discards the open proposal; main-line is never touched. `false` when
    /// no proposal was open.
    pub fn reject_proposal(&mut self, user_id: &str, label: &str) -> Result<bool, StoreError> {
        block_key(user_id, label)?;
        let branch = proposal_branch_name(user_id, label);
        let now_ms = now_ms();
        let tx = self.write_tx()?;

        if open_ref_tx(&tx, &branch)?.is_none() {
            return Ok(false);
        }
        delete_branch_tx(&tx, &branch, true, now_ms)?;
        tx.commit()?;

        log::info!("rejected proposal {branch}");
        Ok(true)
    }
}
