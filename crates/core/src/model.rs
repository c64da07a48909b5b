#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

const AGENT_AUTHOR_PREFIX: &str = "agent:";

/// Key of a row in the versioned store: a namespace plus a name inside it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub namespace: String,
    pub name: String,
}

impl RowKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Author {
    User,
    Agent(String),
}

impl Author {
    pub fn agent(agent_id: impl Into<String>) -> Self {
        Self::Agent(agent_id.into())
    }

    pub fn parse(value: &str) -> Option<Self> {
        if value == "user" {
            return Some(Self::User);
        }
        let agent_id = value.strip_prefix(AGENT_AUTHOR_PREFIX)?;
        if agent_id.is_empty() {
            return None;
        }
        Some(Self::Agent(agent_id.to_string()))
    }

    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Self::User => None,
            Self::Agent(agent_id) => Some(agent_id),
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent(_))
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Agent(agent_id) => write!(f, "{AGENT_AUTHOR_PREFIX}{agent_id}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Persisted payload of a memory block. The key lives outside the row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,
    pub updated_at_ms: i64,
}

impl BlockRow {
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Applies a partial update: omitted title/schema_ref keep their previous values.
    pub fn upsert(
        previous: Option<&BlockRow>,
        body: String,
        title: Option<String>,
        schema_ref: Option<String>,
        updated_at_ms: i64,
    ) -> Self {
        Self {
            title: title.or_else(|| previous.and_then(|row| row.title.clone())),
            body,
            schema_ref: schema_ref.or_else(|| previous.and_then(|row| row.schema_ref.clone())),
            updated_at_ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryBlock {
    pub user_id: String,
    pub label: String,
    pub title: Option<String>,
    pub body: String,
    pub schema_ref: Option<String>,
    pub updated_at_ms: i64,
}

impl MemoryBlock {
    pub fn from_row(user_id: impl Into<String>, label: impl Into<String>, row: BlockRow) -> Self {
        Self {
            user_id: user_id.into(),
            label: label.into(),
            title: row.title,
            body: row.body,
            schema_ref: row.schema_ref,
            updated_at_ms: row.updated_at_ms,
        }
    }
}

/// One immutable entry of a key's history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionRecord {
    pub seq: i64,
    pub commit_id: String,
    pub branch: String,
    pub key: RowKey,
    pub author: Author,
    pub message: String,
    pub parent_commit_id: Option<String>,
    pub merge_parent_id: Option<String>,
    pub deleted: bool,
    pub created_at_ms: i64,
    pub is_current: bool,
}

impl VersionRecord {
    pub fn is_merge(&self) -> bool {
        self.merge_parent_id.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    pub user_id: String,
    pub label: String,
    pub branch: String,
    pub agent_id: String,
    pub reasoning: String,
    pub confidence: Confidence,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub commit_count: usize,
    pub is_stale: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalDiff {
    pub user_id: String,
    pub label: String,
    pub branch: String,
    pub current_title: Option<String>,
    pub current_body: Option<String>,
    pub current_schema_ref: Option<String>,
    pub proposed_title: Option<String>,
    pub proposed_body: String,
    pub proposed_schema_ref: Option<String>,
    pub agent_id: String,
    pub reasoning: String,
    pub confidence: Confidence,
    pub is_stale: bool,
    pub base_seq: i64,
    pub main_seq: Option<i64>,
}

impl ProposalDiff {
    pub fn changes_body(&self) -> bool {
        self.current_body.as_deref() != Some(self.proposed_body.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalStep {
    pub commit_id: String,
    pub agent_id: String,
    pub reasoning: String,
    pub confidence: Confidence,
    pub body: String,
    pub created_at_ms: i64,
}
