//! Fault-injecting ledger for unit tests.

use chrono::{DateTime, Utc};
use ricechain_ledger::{
    Cursor, CursorTracker, KeyModification, KeyValue, Ledger, LedgerError, LedgerResult,
    RichQuery, TransientMap,
};

/// Wraps an invocation and injects one fault.
pub(crate) struct FaultyLedger<'a> {
    inner: &'a mut dyn Ledger,
    fault: Fault,
    cursors: CursorTracker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    /// Public writes fail as if the host were down.
    PutStateUnavailable,
    /// History entries come back with their value erased and no delete flag.
    ErasedHistory,
}

impl<'a> FaultyLedger<'a> {
    pub(crate) fn new(inner: &'a mut dyn Ledger, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            cursors: CursorTracker::new(),
        }
    }
}

impl Ledger for FaultyLedger<'_> {
    fn tx_id(&self) -> &str {
        self.inner.tx_id()
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.inner.tx_timestamp()
    }

    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        self.inner.get_state(key)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        if self.fault == Fault::PutStateUnavailable {
            return Err(LedgerError::Unavailable("disk".into()));
        }
        self.inner.put_state(key, value)
    }

    fn del_state(&mut self, key: &str) -> LedgerResult<()> {
        self.inner.del_state(key)
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> LedgerResult<Cursor<KeyValue>> {
        self.inner.get_state_by_range(start, end)
    }

    fn get_query_result(&self, query: &RichQuery) -> LedgerResult<Cursor<KeyValue>> {
        self.inner.get_query_result(query)
    }

    fn get_history_for_key(&self, key: &str) -> LedgerResult<Cursor<KeyModification>> {
        let cursor = self.inner.get_history_for_key(key)?;
        if self.fault != Fault::ErasedHistory {
            return Ok(cursor);
        }
        let erased = cursor
            .collect_all()?
            .into_iter()
            .map(|entry| KeyModification {
                is_delete: false,
                value: Vec::new(),
                ..entry
            })
            .collect();
        Ok(Cursor::new(erased, &self.cursors))
    }

    fn get_private_data(&self, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        self.inner.get_private_data(collection, key)
    }

    fn get_private_data_hash(
        &self,
        collection: &str,
        key: &str,
    ) -> LedgerResult<Option<[u8; 32]>> {
        self.inner.get_private_data_hash(collection, key)
    }

    fn put_private_data(
        &mut self,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> LedgerResult<()> {
        self.inner.put_private_data(collection, key, value)
    }

    fn del_private_data(&mut self, collection: &str, key: &str) -> LedgerResult<()> {
        self.inner.del_private_data(collection, key)
    }

    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> LedgerResult<Cursor<KeyValue>> {
        self.inner.get_private_data_by_range(collection, start, end)
    }

    fn get_private_data_query_result(
        &self,
        collection: &str,
        query: &RichQuery,
    ) -> LedgerResult<Cursor<KeyValue>> {
        self.inner.get_private_data_query_result(collection, query)
    }

    fn transient(&self) -> &TransientMap {
        self.inner.transient()
    }
}
