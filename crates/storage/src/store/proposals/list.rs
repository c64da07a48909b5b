use super::super::*;
use super::{find_proposal_tx, load_proposal_tx};
use mb_core::{Proposal, parse_proposal_branch, proposal_branch_prefix};

impl SqliteStore {
    /// One entry per open proposal of the user, ordered by label.
    pub fn list_proposals(&self, user_id: &str) -> Result<Vec<Proposal>, StoreError> {
        validate_user_id(user_id)?;
        let tx = self.read_tx()?;

        let mut out = Vec::new();
        for state in list_open_refs_tx(&tx, &proposal_branch_prefix(user_id))? {
            let Some((owner, label)) = parse_proposal_branch(&state.name) else {
                continue;
            };
            if owner != user_id {
                continue;
            }
            if let Some(open) = load_proposal_tx(&tx, state, user_id, &label)? {
                out.push(open.to_proposal());
            }
        }
        out.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(out)
    }

    pub fn get_proposal(&self, user_id: &str, label: &str) -> Result<Option<Proposal>, StoreError> {
        block_key(user_id, label)?;
        let tx = self.read_tx()?;
        Ok(find_proposal_tx(&tx, user_id, label)?.map(|open| open.to_proposal()))
    }

    pub fn count_pending_proposals(&self, user_id: &str) -> Result<usize, StoreError> {
        validate_user_id(user_id)?;
        let tx = self.read_tx()?;
        count_open_refs_tx(&tx, &proposal_branch_prefix(user_id))
    }
}
