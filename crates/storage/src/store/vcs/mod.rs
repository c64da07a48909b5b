#![forbid(unsafe_code)]

mod branches;
mod diff;
mod history;
mod merge;
mod rows;

pub(in crate::store) use branches::{create_branch_tx, delete_branch_tx, rebase_branch_tx};
pub(in crate::store) use diff::row_diff_tx;
pub(in crate::store) use history::log_tx;
pub(in crate::store) use merge::merge_tx;
pub(in crate::store) use rows::{read_commit_tx, read_row_at_tx, scan_tx};
