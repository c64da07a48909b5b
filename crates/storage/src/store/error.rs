#![forbid(unsafe_code)]

/// Coarse classification used by callers that translate errors for users.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ValidationFailure,
    StoreFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("unknown branch")]
    UnknownBranch,
    #[error("unknown commit")]
    UnknownCommit,
    #[error("branch already exists")]
    BranchAlreadyExists,
    #[error("branch has unmerged commits")]
    BranchNotMerged,
    #[error("branch base cycle")]
    BranchCycle,
    #[error("branch base depth exceeded")]
    BranchDepthExceeded,
    #[error("nothing to merge")]
    NothingToMerge,
    #[error("commit does not belong to the requested key")]
    CommitKeyMismatch,
    #[error("commit never reached main-line")]
    UnmergedCommit,
    #[error("stale proposal (base_seq={base_seq}, main_seq={main_seq})")]
    StaleProposal { base_seq: i64, main_seq: i64 },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownBranch | Self::UnknownCommit => ErrorKind::NotFound,
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                ErrorKind::StoreFailure
            }
            Self::InvalidInput(_)
            | Self::BranchAlreadyExists
            | Self::BranchNotMerged
            | Self::BranchCycle
            | Self::BranchDepthExceeded
            | Self::NothingToMerge
            | Self::CommitKeyMismatch
            | Self::UnmergedCommit
            | Self::StaleProposal { .. } => ErrorKind::ValidationFailure,
            Self::Io(_) | Self::Sql(_) | Self::Serde(_) => ErrorKind::StoreFailure,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQLITE",
            Self::Serde(_) => "SERDE",
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                "RESET_REQUIRED"
            }
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::UnknownBranch => "UNKNOWN_BRANCH",
            Self::UnknownCommit => "UNKNOWN_COMMIT",
            Self::BranchAlreadyExists => "BRANCH_ALREADY_EXISTS",
            Self::BranchNotMerged => "BRANCH_NOT_MERGED",
            Self::BranchCycle => "BRANCH_CYCLE",
            Self::BranchDepthExceeded => "BRANCH_DEPTH_EXCEEDED",
            Self::NothingToMerge => "NOTHING_TO_MERGE",
            Self::CommitKeyMismatch => "COMMIT_KEY_MISMATCH",
            Self::UnmergedCommit => "UNMERGED_COMMIT",
            Self::StaleProposal { .. } => "STALE_PROPOSAL",
        }
    }
}
