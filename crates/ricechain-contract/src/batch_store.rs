//! Rice batch persistence in public world state.
//!
//! Batches are stored as JSON under their batch id. Every scan drains a
//! scoped [`Cursor`]: an early return on a decode error drops the cursor,
//! a full drain closes it explicitly.

use ricechain_ledger::{Cursor, KeyValue, Ledger, RichQuery, SortOrder};
use ricechain_types::{AssetType, BatchId, HistoryRecord, Result, RiceBatch, RiceError};

/// World-state adapter for [`RiceBatch`] records.
#[derive(Debug, Clone)]
pub struct BatchStore {
    /// Selector for every batch document, highest batch id first.
    all_batches: RichQuery,
}

impl Default for BatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            all_batches: RichQuery::new()
                .eq("assetType", AssetType::RiceBatch.as_str())
                .sort_by("batchID", SortOrder::Desc),
        }
    }

    pub fn exists(&self, ledger: &dyn Ledger, batch_id: &BatchId) -> Result<bool> {
        Ok(ledger.get_state(batch_id.as_str())?.is_some())
    }

    /// # Errors
    /// `BatchNotFound` if absent, `DecodeFailure` if the stored value is not
    /// a batch.
    pub fn get(&self, ledger: &dyn Ledger, batch_id: &BatchId) -> Result<RiceBatch> {
        let bytes = ledger
            .get_state(batch_id.as_str())?
            .ok_or_else(|| RiceError::BatchNotFound(batch_id.clone()))?;
        let batch = RiceBatch::from_bytes(batch_id.as_str(), &bytes)?;
        tracing::debug!(batch_id = %batch_id, status = %batch.status, "Batch read");
        Ok(batch)
    }

    pub fn put(&self, ledger: &mut dyn Ledger, batch: &RiceBatch) -> Result<()> {
        ledger.put_state(batch.batch_id.as_str(), batch.to_bytes()?)?;
        Ok(())
    }

    pub fn delete(&self, ledger: &mut dyn Ledger, batch_id: &BatchId) -> Result<()> {
        ledger.del_state(batch_id.as_str())?;
        Ok(())
    }

    /// Every batch, highest batch id first.
    pub fn scan_all(&self, ledger: &dyn Ledger) -> Result<Vec<RiceBatch>> {
        decode_batches(ledger.get_query_result(&self.all_batches)?)
    }

    /// Batches with `start <= id < end`; an empty bound is open.
    pub fn scan_range(
        &self,
        ledger: &dyn Ledger,
        start: &str,
        end: &str,
    ) -> Result<Vec<RiceBatch>> {
        decode_batches(ledger.get_state_by_range(start, end)?)
    }

    /// Committed versions of the batch, oldest first. Deletes, and entries
    /// whose value the host has erased, appear as tombstones.
    pub fn history(
        &self,
        ledger: &dyn Ledger,
        batch_id: &BatchId,
    ) -> Result<Vec<HistoryRecord>> {
        let mut cursor = ledger.get_history_for_key(batch_id.as_str())?;
        let mut records = Vec::with_capacity(cursor.remaining());
        for entry in cursor.by_ref() {
            let entry = entry?;
            let record = if entry.is_delete || entry.value.is_empty() {
                HistoryRecord::tombstone(batch_id.clone(), entry.tx_id, entry.timestamp)
            } else {
                HistoryRecord {
                    batch_id: batch_id.clone(),
                    tx_id: entry.tx_id,
                    timestamp: entry.timestamp,
                    is_delete: false,
                    record: Some(RiceBatch::from_bytes(batch_id.as_str(), &entry.value)?),
                }
            };
            records.push(record);
        }
        cursor.close();
        Ok(records)
    }

    /// Whether the key has any committed history, including a delete.
    pub fn ever_existed(&self, ledger: &dyn Ledger, batch_id: &BatchId) -> Result<bool> {
        let cursor = ledger.get_history_for_key(batch_id.as_str())?;
        let seen = cursor.remaining() > 0;
        cursor.close();
        Ok(seen)
    }
}

fn decode_batches(mut cursor: Cursor<KeyValue>) -> Result<Vec<RiceBatch>> {
    let mut batches = Vec::with_capacity(cursor.remaining());
    for kv in cursor.by_ref() {
        let kv = kv?;
        batches.push(RiceBatch::from_bytes(&kv.key, &kv.value)?);
    }
    cursor.close();
    Ok(batches)
}
