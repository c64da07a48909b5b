#![forbid(unsafe_code)]

//! Memory-block schema over the versioned store: namespace = user_id,
//! name = label, row = JSON-encoded [`BlockRow`].

mod delete;
mod get;
mod history;
mod list;
mod restore;
mod update;

use super::*;
use mb_core::{Author, BlockRow, MemoryBlock};

/// Inputs of a block upsert, shared by direct edits and proposals.
pub(in crate::store) struct BlockUpsert<'a> {
    pub body: &'a str,
    pub title: Option<&'a str>,
    pub schema_ref: Option<&'a str>,
    pub author: &'a Author,
    pub message: &'a str,
}

/// Writes the block on `target`, keeping omitted title/schema_ref from
/// `previous` (the row the caller read before writing).
pub(in crate::store) fn upsert_block_tx(
    tx: &Transaction<'_>,
    target: &RefState,
    key: &RowKey,
    previous: Option<&BlockRow>,
    upsert: BlockUpsert<'_>,
    now_ms: i64,
) -> Result<CommitRow, StoreError> {
    let row = BlockRow::upsert(
        previous,
        upsert.body.to_string(),
        upsert.title.map(str::to_string),
        upsert.schema_ref.map(str::to_string),
        now_ms,
    );
    let encoded = row.encode()?;
    write_row_tx(
        tx,
        target,
        NewCommit {
            key,
            row: Some(encoded.as_str()),
            author: upsert.author,
            message: upsert.message,
            merge_parent_id: None,
            now_ms,
        },
    )
}

pub(in crate::store) fn decode_block(key: &RowKey, raw: &str) -> Result<MemoryBlock, StoreError> {
    Ok(MemoryBlock::from_row(
        key.namespace.as_str(),
        key.name.as_str(),
        BlockRow::decode(raw)?,
    ))
}

pub(in crate::store) fn read_block_tx(
    tx: &Transaction<'_>,
    state: &RefState,
    key: &RowKey,
) -> Result<Option<(BlockRow, CommitRow)>, StoreError> {
    let Some(commit) = read_commit_tx(tx, state, key)? else {
        return Ok(None);
    };
    match commit.row.as_deref() {
        Some(raw) => Ok(Some((BlockRow::decode(raw)?, commit))),
        None => Ok(None),
    }
}
