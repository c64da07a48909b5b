#![forbid(unsafe_code)]

use mb_core::{Author, Confidence, RowKey};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRequest {
    pub branch: String,
    pub key: RowKey,
    /// `None` writes a tombstone.
    pub row: Option<String>,
    pub author: Author,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateBlockRequest {
    pub user_id: String,
    pub label: String,
    pub body: String,
    pub title: Option<String>,
    pub schema_ref: Option<String>,
    pub author: Author,
    pub message: Option<String>,
}

impl UpdateBlockRequest {
    pub fn new(
        user_id: impl Into<String>,
        label: impl Into<String>,
        body: impl Into<String>,
        author: Author,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            label: label.into(),
            body: body.into(),
            title: None,
            schema_ref: None,
            author,
            message: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateProposalRequest {
    pub user_id: String,
    pub label: String,
    pub body: String,
    pub agent_id: String,
    pub reasoning: String,
    pub confidence: Confidence,
    pub title: Option<String>,
    pub schema_ref: Option<String>,
}
