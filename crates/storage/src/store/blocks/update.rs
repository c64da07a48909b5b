use super::super::*;
use super::{BlockUpsert, read_block_tx, upsert_block_tx};
use mb_core::MAIN_BRANCH;

impl SqliteStore {
    /// Upserts a block on main-line. Omitted title/schema_ref keep their
    /// previous values; omission never erases.
    pub fn update_block(&mut self, request: UpdateBlockRequest) -> Result<String, StoreError> {
        let UpdateBlockRequest {
            user_id,
            label,
            body,
            title,
            schema_ref,
            author,
            message,
        } = request;

        let key = block_key(&user_id, &label)?;
        let message = message.unwrap_or_else(|| format!("update {label}"));

        let now_ms = now_ms();
        let tx = self.write_tx()?;
        let main = require_ref_tx(&tx, MAIN_BRANCH)?;
        let previous = read_block_tx(&tx, &main, &key)?.map(|(row, _)| row);
        let commit = upsert_block_tx(
            &tx,
            &main,
            &key,
            previous.as_ref(),
            BlockUpsert {
                body: &body,
                title: title.as_deref(),
                schema_ref: schema_ref.as_deref(),
                author: &author,
                message: &message,
            },
            now_ms,
        )?;
        tx.commit()?;

        log::debug!("updated block {user_id}/{label} by {author}");
        Ok(commit.commit_id)
    }
}
