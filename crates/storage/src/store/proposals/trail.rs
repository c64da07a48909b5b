use super::super::*;
use super::find_proposal_tx;
use mb_core::{BlockRow, CommitMessage, ProposalStep};

impl SqliteStore {
    /// Every revision of the open proposal, oldest first, so earlier
    /// reasoning stays reviewable after later revisions supersede it.
    pub fn get_proposal_trail(
        &self,
        user_id: &str,
        label: &str,
    ) -> Result<Vec<ProposalStep>, StoreError> {
        block_key(user_id, label)?;
        let tx = self.read_tx()?;
        let Some(open) = find_proposal_tx(&tx, user_id, label)? else {
            return Ok(Vec::new());
        };

        let mut steps = Vec::with_capacity(open.commits.len());
        for commit in open.commits.iter() {
            let Some(meta) = CommitMessage::parse(&commit.message).into_proposal_meta() else {
                return Err(StoreError::InvalidInput("proposal commit is missing metadata"));
            };
            let Some(raw) = commit.row.as_deref() else {
                return Err(StoreError::InvalidInput("proposal commit has no block row"));
            };
            let row = BlockRow::decode(raw)?;
            steps.push(ProposalStep {
                commit_id: commit.commit_id.clone(),
                agent_id: meta.agent_id,
                reasoning: meta.reasoning,
                confidence: meta.confidence,
                body: row.body,
                created_at_ms: commit.created_at_ms,
            });
        }
        Ok(steps)
    }
}
