#![forbid(unsafe_code)]

//! Branch-as-proposal workflow. Each (user_id, label) owns at most one open
//! branch named by [`mb_core::proposal_branch_name`]; every proposal commit
//! carries its metadata as a structured [`CommitMessage`].

mod approve;
mod create;
mod diff;
mod list;
mod reject;
mod trail;

use super::*;
use mb_core::{CommitMessage, MAIN_BRANCH, Proposal, ProposalMeta, proposal_branch_name};

/// An open proposal branch together with what is needed to describe it.
pub(in crate::store) struct OpenProposal {
    pub state: RefState,
    pub user_id: String,
    pub label: String,
    pub key: RowKey,
    /// Commits on the branch for this key, oldest first.
    pub commits: Vec<CommitRow>,
    /// Metadata of the latest commit.
    pub meta: ProposalMeta,
    pub main_head: Option<CommitRow>,
}

impl OpenProposal {
    pub fn base_seq(&self) -> i64 {
        self.state.base_seq.unwrap_or(0)
    }

    pub fn main_seq(&self) -> Option<i64> {
        self.main_head.as_ref().map(|c| c.seq)
    }

    /// Main-line moved for this key after the proposal was last anchored.
    pub fn is_stale(&self) -> bool {
        self.main_seq().is_some_and(|seq| seq > self.base_seq())
    }

    pub fn latest(&self) -> &CommitRow {
        &self.commits[self.commits.len() - 1]
    }

    pub fn to_proposal(&self) -> Proposal {
        Proposal {
            user_id: self.user_id.clone(),
            label: self.label.clone(),
            branch: self.state.name.clone(),
            agent_id: self.meta.agent_id.clone(),
            reasoning: self.meta.reasoning.clone(),
            confidence: self.meta.confidence,
            created_at_ms: self.commits[0].created_at_ms,
            updated_at_ms: self.latest().created_at_ms,
            commit_count: self.commits.len(),
            is_stale: self.is_stale(),
        }
    }
}

pub(in crate::store) fn find_proposal_tx(
    tx: &Transaction<'_>,
    user_id: &str,
    label: &str,
) -> Result<Option<OpenProposal>, StoreError> {
    let branch = proposal_branch_name(user_id, label);
    let Some(state) = open_ref_tx(tx, &branch)? else {
        return Ok(None);
    };
    load_proposal_tx(tx, state, user_id, label)
}

pub(in crate::store) fn load_proposal_tx(
    tx: &Transaction<'_>,
    state: RefState,
    user_id: &str,
    label: &str,
) -> Result<Option<OpenProposal>, StoreError> {
    let key = RowKey::new(user_id, label);
    let commits = own_commits_tx(tx, state.ref_id, &key)?;
    let Some(latest) = commits.last() else {
        return Ok(None);
    };
    let meta = CommitMessage::parse(&latest.message)
        .into_proposal_meta()
        .ok_or(StoreError::InvalidInput("proposal commit is missing metadata"))?;

    let main = require_ref_tx(tx, MAIN_BRANCH)?;
    let main_head = read_commit_tx(tx, &main, &key)?;

    Ok(Some(OpenProposal {
        state,
        user_id: user_id.to_string(),
        label: label.to_string(),
        key,
        commits,
        meta,
        main_head,
    }))
}
