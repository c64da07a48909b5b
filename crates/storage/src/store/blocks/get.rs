use super::super::*;
use super::read_block_tx;
use mb_core::{MAIN_BRANCH, MemoryBlock};

impl SqliteStore {
    pub fn get_block(&self, user_id: &str, label: &str) -> Result<Option<MemoryBlock>, StoreError> {
        let key = block_key(user_id, label)?;
        let tx = self.read_tx()?;
        let main = require_ref_tx(&tx, MAIN_BRANCH)?;
        Ok(read_block_tx(&tx, &main, &key)?
            .map(|(row, _)| MemoryBlock::from_row(user_id, label, row)))
    }
}
