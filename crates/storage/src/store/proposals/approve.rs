use super::super::*;
use super::find_proposal_tx;
use mb_core::{Author, CommitMessage, MAIN_BRANCH};

impl SqliteStore {
    /// Merges the open proposal into main-line and closes its branch, all in
    /// one transaction. `None` when there is nothing to approve.
    pub fn approve_proposal(
        &mut self,
        user_id: &str,
        label: &str,
    ) -> Result<Option<String>, StoreError> {
        block_key(user_id, label)?;
        let now_ms = now_ms();
        let tx = self.write_tx()?;

        let Some(open) = find_proposal_tx(&tx, user_id, label)? else {
            return Ok(None);
        };

        if open.is_stale() {
            let main_seq = open.main_seq().unwrap_or(0);
            log::warn!(
                "refusing stale proposal {} (base_seq={}, main_seq={main_seq})",
                open.state.name,
                open.base_seq()
            );
            return Err(StoreError::StaleProposal {
                base_seq: open.base_seq(),
                main_seq,
            });
        }

        let message = CommitMessage::approved(open.meta.clone()).encode()?;
        let merged = merge_tx(
            &tx,
            &open.state.name,
            MAIN_BRANCH,
            &Author::User,
            &message,
            now_ms,
        )?;
        delete_branch_tx(&tx, &open.state.name, false, now_ms)?;

        let Some(commit) = merged.into_iter().find(|c| c.key == open.key) else {
            return Err(StoreError::NothingToMerge);
        };
        tx.commit()?;

        log::info!(
            "approved proposal {} by agent:{} as {}",
            open.state.name,
            open.meta.agent_id,
            commit.commit_id
        );
        Ok(Some(commit.commit_id))
    }
}
