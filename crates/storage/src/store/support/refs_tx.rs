use super::super::{BranchInfo, StoreError};
use rusqlite::{OptionalExtension, Row, Transaction, params};
use std::collections::HashSet;

pub(in crate::store) const MAX_BRANCH_DEPTH: usize = 32;
const MAX_BRANCH_NAME_LEN: usize = mb_core::MAX_PROPOSAL_BRANCH_LEN;

/// An open ref as stored in `refs`.
#[derive(Clone, Debug)]
pub(in crate::store) struct RefState {
    pub ref_id: i64,
    pub name: String,
    pub base_ref_id: Option<i64>,
    pub base_seq: Option<i64>,
    pub merged_seq: Option<i64>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl RefState {
    /// Commits at or below this sequence have already been merged somewhere.
    pub fn merged_floor(&self) -> i64 {
        self.merged_seq.unwrap_or(0)
    }
}

/// One ref contributing to a view, limited to commits at or below `cutoff_seq`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::store) struct RefSource {
    pub ref_id: i64,
    pub cutoff_seq: Option<i64>,
}

const REF_COLUMNS: &str =
    "ref_id, name, base_ref_id, base_seq, merged_seq, created_at_ms, updated_at_ms";

fn ref_from_row(row: &Row<'_>) -> rusqlite::Result<RefState> {
    Ok(RefState {
        ref_id: row.get(0)?,
        name: row.get(1)?,
        base_ref_id: row.get(2)?,
        base_seq: row.get(3)?,
        merged_seq: row.get(4)?,
        created_at_ms: row.get(5)?,
        updated_at_ms: row.get(6)?,
    })
}

pub(in crate::store) fn validate_branch_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidInput("branch name must not be empty"));
    }
    if name.len() > MAX_BRANCH_NAME_LEN {
        return Err(StoreError::InvalidInput("branch name is too long"));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(StoreError::InvalidInput(
            "branch name contains control characters",
        ));
    }
    Ok(())
}

pub(in crate::store) fn open_ref_tx(
    tx: &Transaction<'_>,
    name: &str,
) -> Result<Option<RefState>, StoreError> {
    Ok(tx
        .query_row(
            &format!("SELECT {REF_COLUMNS} FROM refs WHERE name=?1 AND closed_at_ms IS NULL"),
            params![name],
            ref_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn require_ref_tx(
    tx: &Transaction<'_>,
    name: &str,
) -> Result<RefState, StoreError> {
    open_ref_tx(tx, name)?.ok_or(StoreError::UnknownBranch)
}

pub(in crate::store) fn ref_name_tx(
    tx: &Transaction<'_>,
    ref_id: i64,
) -> Result<Option<String>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT name FROM refs WHERE ref_id=?1",
            params![ref_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?)
}

pub(in crate::store) fn list_open_refs_tx(
    tx: &Transaction<'_>,
    prefix: &str,
) -> Result<Vec<RefState>, StoreError> {
    let mut stmt = tx.prepare(&format!(
        "SELECT {REF_COLUMNS} FROM refs \
         WHERE closed_at_ms IS NULL AND substr(name, 1, length(?1))=?1 \
         ORDER BY name ASC"
    ))?;
    let rows = stmt.query_map(params![prefix], ref_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub(in crate::store) fn count_open_refs_tx(
    tx: &Transaction<'_>,
    prefix: &str,
) -> Result<usize, StoreError> {
    let count = tx.query_row(
        "SELECT COUNT(1) FROM refs WHERE closed_at_ms IS NULL AND substr(name, 1, length(?1))=?1",
        params![prefix],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(usize::try_from(count).unwrap_or(0))
}

pub(in crate::store) fn branch_info_tx(
    tx: &Transaction<'_>,
    state: &RefState,
) -> Result<BranchInfo, StoreError> {
    let base_branch = match state.base_ref_id {
        Some(base_ref_id) => ref_name_tx(tx, base_ref_id)?,
        None => None,
    };
    Ok(BranchInfo {
        name: state.name.clone(),
        base_branch,
        base_seq: state.base_seq,
        merged_seq: state.merged_seq,
        created_at_ms: state.created_at_ms,
        updated_at_ms: state.updated_at_ms,
    })
}

/// The ref itself followed by its base chain, each base limited by the
/// tightest cut-off inherited along the way.
pub(in crate::store) fn ref_sources_tx(
    tx: &Transaction<'_>,
    ref_id: i64,
) -> Result<Vec<RefSource>, StoreError> {
    let mut sources = vec![RefSource {
        ref_id,
        cutoff_seq: None,
    }];

    let mut seen = HashSet::new();
    seen.insert(ref_id);

    let mut current = ref_id;
    let mut inherited_cutoff: Option<i64> = None;

    for depth in 0..=MAX_BRANCH_DEPTH {
        let row = tx
            .query_row(
                "SELECT base_ref_id, base_seq FROM refs WHERE ref_id=?1",
                params![current],
                |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?;

        let Some((Some(base_ref_id), base_seq)) = row else {
            return Ok(sources);
        };

        if depth == MAX_BRANCH_DEPTH {
            return Err(StoreError::BranchDepthExceeded);
        }
        if !seen.insert(base_ref_id) {
            return Err(StoreError::BranchCycle);
        }

        let base_seq = base_seq.unwrap_or(0);
        let effective = match inherited_cutoff {
            None => base_seq,
            Some(prev) => prev.min(base_seq),
        };

        sources.push(RefSource {
            ref_id: base_ref_id,
            cutoff_seq: Some(effective),
        });

        current = base_ref_id;
        inherited_cutoff = Some(effective);
    }

    Ok(sources)
}

pub(in crate::store) fn create_ref_tx(
    tx: &Transaction<'_>,
    name: &str,
    base: Option<&RefState>,
    base_seq: Option<i64>,
    now_ms: i64,
) -> Result<RefState, StoreError> {
    tx.execute(
        "INSERT INTO refs(name, base_ref_id, base_seq, merged_seq, created_at_ms, updated_at_ms, closed_at_ms) \
         VALUES (?1, ?2, ?3, NULL, ?4, ?4, NULL)",
        params![name, base.map(|b| b.ref_id), base_seq, now_ms],
    )?;
    Ok(RefState {
        ref_id: tx.last_insert_rowid(),
        name: name.to_string(),
        base_ref_id: base.map(|b| b.ref_id),
        base_seq,
        merged_seq: None,
        created_at_ms: now_ms,
        updated_at_ms: now_ms,
    })
}

pub(in crate::store) fn has_open_dependents_tx(
    tx: &Transaction<'_>,
    ref_id: i64,
) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM refs WHERE base_ref_id=?1 AND closed_at_ms IS NULL LIMIT 1",
            params![ref_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

pub(in crate::store) fn touch_ref_tx(
    tx: &Transaction<'_>,
    ref_id: i64,
    now_ms: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "UPDATE refs SET updated_at_ms=max(updated_at_ms, ?2) WHERE ref_id=?1",
        params![ref_id, now_ms],
    )?;
    Ok(())
}
