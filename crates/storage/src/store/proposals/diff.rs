use super::super::*;
use super::find_proposal_tx;
use mb_core::{BlockRow, MAIN_BRANCH, ProposalDiff};

impl SqliteStore {
    /// Cumulative change of the open proposal against the main-line tip as of now.
    pub fn get_proposal_diff(
        &self,
        user_id: &str,
        label: &str,
    ) -> Result<Option<ProposalDiff>, StoreError> {
        block_key(user_id, label)?;
        let tx = self.read_tx()?;
        let Some(open) = find_proposal_tx(&tx, user_id, label)? else {
            return Ok(None);
        };

        let main = require_ref_tx(&tx, MAIN_BRANCH)?;
        let (current, proposed) = match row_diff_tx(&tx, &main, &open.state, &open.key)? {
            Some(diff) => (diff.from_row, diff.to_row),
            None => {
                let row = open.main_head.as_ref().and_then(|c| c.row.clone());
                (row.clone(), row)
            }
        };

        let current = current.as_deref().map(BlockRow::decode).transpose()?;
        let Some(proposed) = proposed.as_deref().map(BlockRow::decode).transpose()? else {
            return Err(StoreError::InvalidInput("proposal tip has no block row"));
        };

        Ok(Some(ProposalDiff {
            user_id: open.user_id.clone(),
            label: open.label.clone(),
            branch: open.state.name.clone(),
            current_title: current.as_ref().and_then(|row| row.title.clone()),
            current_body: current.as_ref().map(|row| row.body.clone()),
            current_schema_ref: current.as_ref().and_then(|row| row.schema_ref.clone()),
            proposed_title: proposed.title,
            proposed_body: proposed.body,
            proposed_schema_ref: proposed.schema_ref,
            agent_id: open.meta.agent_id.clone(),
            reasoning: open.meta.reasoning.clone(),
            confidence: open.meta.confidence,
            is_stale: open.is_stale(),
            base_seq: open.base_seq(),
            main_seq: open.main_seq(),
        }))
    }
}
