//! Read-only history and query service.
//!
//! Nothing here checks roles: world state is readable by every
//! organization and the host enforces collection membership for order
//! contents.

use ricechain_ledger::{Ledger, RichQuery};
use ricechain_types::{
    AssetType, BatchId, HistoryRecord, OrderId, ProcessingOrder, Result, RiceBatch,
};

use crate::{BatchStore, OrderStore};

#[derive(Debug, Clone, Copy)]
pub struct QueryService<'a> {
    batches: &'a BatchStore,
    orders: &'a OrderStore,
}

impl<'a> QueryService<'a> {
    #[must_use]
    pub fn new(batches: &'a BatchStore, orders: &'a OrderStore) -> Self {
        Self { batches, orders }
    }

    pub fn batch(&self, ledger: &dyn Ledger, batch_id: &BatchId) -> Result<RiceBatch> {
        self.batches.get(ledger, batch_id)
    }

    pub fn order(&self, ledger: &dyn Ledger, order_id: &OrderId) -> Result<ProcessingOrder> {
        self.orders.get(ledger, order_id)
    }

    pub fn batch_exists(&self, ledger: &dyn Ledger, batch_id: &BatchId) -> Result<bool> {
        self.batches.exists(ledger, batch_id)
    }

    pub fn order_exists(&self, ledger: &dyn Ledger, order_id: &OrderId) -> Result<bool> {
        self.orders.exists(ledger, order_id)
    }

    /// Every committed version of the batch, oldest first.
    pub fn history(&self, ledger: &dyn Ledger, batch_id: &BatchId) -> Result<Vec<HistoryRecord>> {
        let history = self.batches.history(ledger, batch_id)?;
        tracing::debug!(batch_id = %batch_id, entries = history.len(), "Batch history read");
        Ok(history)
    }

    /// Orders asking for the batch's variety, regardless of quantity.
    ///
    /// # Errors
    /// `BatchNotFound` if the batch is absent.
    pub fn matching_orders(
        &self,
        ledger: &dyn Ledger,
        batch_id: &BatchId,
    ) -> Result<Vec<ProcessingOrder>> {
        let batch = self.batches.get(ledger, batch_id)?;
        let query = RichQuery::new()
            .eq("assetType", AssetType::ProcessingOrder.as_str())
            .eq("variety", batch.variety.as_str());
        let orders = self.orders.query_by_selector(ledger, &query)?;
        tracing::debug!(
            batch_id = %batch_id,
            variety = %batch.variety,
            matches = orders.len(),
            "Matching orders listed"
        );
        Ok(orders)
    }

    pub fn all_batches(&self, ledger: &dyn Ledger) -> Result<Vec<RiceBatch>> {
        self.batches.scan_all(ledger)
    }

    pub fn all_orders(&self, ledger: &dyn Ledger) -> Result<Vec<ProcessingOrder>> {
        self.orders.scan_all(ledger)
    }

    pub fn batches_by_range(
        &self,
        ledger: &dyn Ledger,
        start: &str,
        end: &str,
    ) -> Result<Vec<RiceBatch>> {
        self.batches.scan_range(ledger, start, end)
    }

    pub fn orders_by_range(
        &self,
        ledger: &dyn Ledger,
        start: &str,
        end: &str,
    ) -> Result<Vec<ProcessingOrder>> {
        self.orders.scan_range(ledger, start, end)
    }
}
