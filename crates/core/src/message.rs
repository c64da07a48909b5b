#![forbid(unsafe_code)]

//! Commit message codec.
//!
//! Messages are either free text or a JSON object tagged by `kind`. Proposal
//! metadata travels only inside these messages, so every structured variant
//! must round-trip through [`CommitMessage::parse`].

use crate::model::Confidence;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalMeta {
    pub agent_id: String,
    pub reasoning: String,
    pub confidence: Confidence,
    pub label: String,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuredMessage {
    Proposal(ProposalMeta),
    ProposalApproved(ProposalMeta),
    Restore {
        user_id: String,
        label: String,
        restored_from: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitMessage {
    Structured(StructuredMessage),
    Text(String),
}

impl CommitMessage {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn proposal(meta: ProposalMeta) -> Self {
        Self::Structured(StructuredMessage::Proposal(meta))
    }

    pub fn approved(meta: ProposalMeta) -> Self {
        Self::Structured(StructuredMessage::ProposalApproved(meta))
    }

    pub fn restore(user_id: &str, label: &str, restored_from: &str) -> Self {
        Self::Structured(StructuredMessage::Restore {
            user_id: user_id.to_string(),
            label: label.to_string(),
            restored_from: restored_from.to_string(),
        })
    }

    /// Anything that is not a recognised structured object is free text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        if trimmed.starts_with('{') {
            if let Ok(structured) = serde_json::from_str::<StructuredMessage>(raw) {
                return Self::Structured(structured);
            }
        }
        Self::Text(raw.to_string())
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Structured(structured) => serde_json::to_string(structured),
            Self::Text(text) => Ok(text.clone()),
        }
    }

    /// Proposal metadata carried by a proposal commit or an approval merge.
    pub fn proposal_meta(&self) -> Option<&ProposalMeta> {
        match self {
            Self::Structured(StructuredMessage::Proposal(meta))
            | Self::Structured(StructuredMessage::ProposalApproved(meta)) => Some(meta),
            _ => None,
        }
    }

    pub fn into_proposal_meta(self) -> Option<ProposalMeta> {
        match self {
            Self::Structured(StructuredMessage::Proposal(meta))
            | Self::Structured(StructuredMessage::ProposalApproved(meta)) => Some(meta),
            _ => None,
        }
    }
}
