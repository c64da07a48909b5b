use super::super::blocks::{BlockUpsert, read_block_tx, upsert_block_tx};
use super::super::*;
use mb_core::{Author, CommitMessage, MAIN_BRANCH, ProposalMeta, proposal_branch_name};

impl SqliteStore {
    /// Records an agent's proposed edit on the key's proposal branch and
    /// returns the branch name. Main-line is never touched.
    ///
    /// The first call creates the branch from the main-line tip; later calls
    /// append to the same branch and re-anchor it on the current tip, so the
    /// branch tip always equals the latest call's arguments.
    pub fn create_proposal(&mut self, request: CreateProposalRequest) -> Result<String, StoreError> {
        let CreateProposalRequest {
            user_id,
            label,
            body,
            agent_id,
            reasoning,
            confidence,
            title,
            schema_ref,
        } = request;

        let key = block_key(&user_id, &label)?;
        validate_agent_id(&agent_id)?;

        let branch = proposal_branch_name(&user_id, &label);
        let author = Author::agent(agent_id.as_str());
        let message = CommitMessage::proposal(ProposalMeta {
            agent_id,
            reasoning,
            confidence,
            label: label.clone(),
            user_id: user_id.clone(),
        })
        .encode()?;

        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let (state, created) = create_branch_tx(&tx, &branch, MAIN_BRANCH, now_ms)?;
        // Omitted fields follow the proposal tip, read before re-anchoring.
        let previous = read_block_tx(&tx, &state, &key)?.map(|(row, _)| row);
        let state = if created {
            state
        } else {
            rebase_branch_tx(&tx, &branch, now_ms)?
        };
        let commit = upsert_block_tx(
            &tx,
            &state,
            &key,
            previous.as_ref(),
            BlockUpsert {
                body: &body,
                title: title.as_deref(),
                schema_ref: schema_ref.as_deref(),
                author: &author,
                message: &message,
            },
            now_ms,
        )?;
        tx.commit()?;

        log::info!(
            "{author} proposed {} for {user_id}/{label} on {branch} ({})",
            if created { "a new edit" } else { "a revision" },
            commit.commit_id
        );
        Ok(branch)
    }
}
