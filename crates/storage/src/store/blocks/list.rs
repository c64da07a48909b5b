use super::super::*;
use super::decode_block;
use mb_core::{MAIN_BRANCH, MemoryBlock};

impl SqliteStore {
    /// Every live block of the user on main-line, ordered by label.
    pub fn list_blocks(&self, user_id: &str) -> Result<Vec<MemoryBlock>, StoreError> {
        validate_user_id(user_id)?;
        let tx = self.read_tx()?;
        let main = require_ref_tx(&tx, MAIN_BRANCH)?;
        scan_tx(&tx, &main, user_id)?
            .into_iter()
            .map(|scanned| decode_block(&RowKey::new(user_id, scanned.name), &scanned.row))
            .collect()
    }
}
