#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub base_branch: Option<String>,
    /// Store sequence up to which the branch sees its base.
    pub base_seq: Option<i64>,
    pub merged_seq: Option<i64>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowDiff {
    pub from_row: Option<String>,
    pub to_row: Option<String>,
    pub from_commit_id: Option<String>,
    pub to_commit_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedRow {
    pub name: String,
    pub row: String,
    pub commit_id: String,
}
