use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use ulid::Ulid;

use crate::model::{noon_utc, slot_key, Block, NewBlock, Notification};
use crate::observability::{BLOCKS_CREATED_TOTAL, BLOCKS_DELETED_TOTAL};

use super::{Engine, EngineError};

/// What an administrator block operation actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Rows written: the days the mutation covered and how many blocks were
    /// inserted after de-duplication.
    Created { days: i64, inserted: usize },
    /// Everything in the requested scope was already blocked; nothing written.
    AlreadyBlocked,
}

impl Engine {
    /// Existing (date, slot) block keys, fetched once per operation. The
    /// store has no uniqueness constraint, so de-duplication happens here,
    /// before the write — and is therefore best-effort, like the booking
    /// pre-check.
    async fn existing_block_keys(&self) -> Result<HashSet<String>, EngineError> {
        let blocks = self
            .store_call(self.store.blocks())
            .await
            .map_err(|e| self.store_failure("fetch_blocks", e))?;
        Ok(blocks.iter().map(Block::key).collect())
    }

    /// Block a single (date, slot) pair.
    pub async fn block_slot(
        &self,
        date: NaiveDate,
        time: &str,
        reason: Option<String>,
    ) -> Result<BlockOutcome, EngineError> {
        let existing = self.existing_block_keys().await?;
        if existing.contains(&slot_key(date, time)) {
            return Ok(BlockOutcome::AlreadyBlocked);
        }
        let row = NewBlock {
            date: noon_utc(date),
            time: time.to_string(),
            reason,
        };
        self.write_blocks(vec![row], 1).await
    }

    /// Block every configured slot of one day that is not blocked yet.
    pub async fn block_day(&self, date: NaiveDate) -> Result<BlockOutcome, EngineError> {
        let existing = self.existing_block_keys().await?;
        let rows: Vec<NewBlock> = self
            .config
            .time_slots
            .iter()
            .filter(|time| !existing.contains(&slot_key(date, time)))
            .map(|time| NewBlock {
                date: noon_utc(date),
                time: time.clone(),
                reason: None,
            })
            .collect();
        if rows.is_empty() {
            return Ok(BlockOutcome::AlreadyBlocked);
        }
        self.write_blocks(rows, 1).await
    }

    /// Block every slot of every day in the inclusive range, as one batch
    /// write. Reports the day count of the range.
    pub async fn block_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BlockOutcome, EngineError> {
        if end < start {
            return Err(EngineError::Validation("range"));
        }
        let existing = self.existing_block_keys().await?;
        let days = (end - start).num_days() + 1;

        let mut rows = Vec::new();
        for offset in 0..days {
            let day = start + Duration::days(offset);
            for time in &self.config.time_slots {
                if !existing.contains(&slot_key(day, time)) {
                    rows.push(NewBlock {
                        date: noon_utc(day),
                        time: time.clone(),
                        reason: None,
                    });
                }
            }
        }
        if rows.is_empty() {
            return Ok(BlockOutcome::AlreadyBlocked);
        }
        self.write_blocks(rows, days).await
    }

    async fn write_blocks(&self, rows: Vec<NewBlock>, days: i64) -> Result<BlockOutcome, EngineError> {
        let inserted = self
            .store_call(self.store.insert_blocks(rows))
            .await
            .map_err(|e| self.store_failure("insert_blocks", e))?
            .len();
        self.cache.invalidate_all().await;
        self.notify.send(Notification::BlocksChanged);
        metrics::counter!(BLOCKS_CREATED_TOTAL).increment(inserted as u64);
        tracing::info!(days, inserted, "blocks created");
        Ok(BlockOutcome::Created { days, inserted })
    }

    /// Release one block.
    pub async fn unblock(&self, id: Ulid) -> Result<(), EngineError> {
        self.store_call(self.store.delete_block(id))
            .await
            .map_err(|e| self.store_failure("delete_block", e))?;
        self.cache.invalidate_all().await;
        self.notify.send(Notification::BlocksChanged);
        metrics::counter!(BLOCKS_DELETED_TOTAL).increment(1);
        tracing::info!(%id, "block released");
        Ok(())
    }

    /// Bulk release iterates single deletions; stops at the first failure and
    /// reports how many were deleted before it.
    pub async fn unblock_many(&self, ids: &[Ulid]) -> Result<usize, EngineError> {
        let mut deleted = 0;
        for id in ids {
            self.unblock(*id).await?;
            deleted += 1;
        }
        Ok(deleted)
    }

    /// The administrator's sibling delete for customer bookings.
    pub async fn delete_reservation(&self, id: Ulid) -> Result<(), EngineError> {
        self.store_call(self.store.delete_reservation(id))
            .await
            .map_err(|e| self.store_failure("delete_reservation", e))?;
        self.cache.invalidate_all().await;
        tracing::info!(%id, "reservation deleted by administrator");
        Ok(())
    }
}
