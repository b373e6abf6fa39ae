//! The `RiceContract` facade.
//!
//! One method per contract operation. Each takes the caller identity and
//! the invocation-scoped ledger explicitly; the facade keeps no state
//! between invocations beyond its configuration.

use ricechain_ledger::{ClientIdentity, Ledger};
use ricechain_types::{
    BatchId, ContractConfig, HistoryRecord, NewBatch, OrderId, ProcessingOrder, Result, RiceBatch,
};

use crate::{AssetLifecycle, BatchStore, IdentityGuard, MatchingEngine, OrderStore, QueryService};

/// Rice supply-chain contract.
#[derive(Debug, Clone)]
pub struct RiceContract {
    config: ContractConfig,
    batches: BatchStore,
    orders: OrderStore,
}

impl Default for RiceContract {
    fn default() -> Self {
        let config = ContractConfig::default();
        Self {
            orders: OrderStore::from_config(&config),
            batches: BatchStore::new(),
            config,
        }
    }
}

impl RiceContract {
    /// Build a contract from a validated configuration.
    ///
    /// # Errors
    /// `Configuration` if the configuration is invalid.
    pub fn new(config: ContractConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            orgs = config.roles.len(),
            collection = %config.order_collection,
            quantity_policy = ?config.quantity_policy,
            allow_batch_id_reuse = config.allow_batch_id_reuse,
            "Rice contract configured"
        );
        Ok(Self {
            orders: OrderStore::from_config(&config),
            batches: BatchStore::new(),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    #[must_use]
    pub fn guard(&self) -> IdentityGuard<'_> {
        IdentityGuard::new(&self.config)
    }

    fn lifecycle(&self) -> AssetLifecycle<'_> {
        AssetLifecycle::new(
            self.guard(),
            &self.batches,
            &self.orders,
            self.config.allow_batch_id_reuse,
        )
    }

    fn matching(&self) -> MatchingEngine<'_> {
        MatchingEngine::new(&self.batches, &self.orders)
    }

    fn queries(&self) -> QueryService<'_> {
        QueryService::new(&self.batches, &self.orders)
    }

    // --- batches ---

    pub fn create_rice_batch(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        new: NewBatch,
    ) -> Result<String> {
        let batch = self.lifecycle().create_batch(caller, ledger, new)?;
        Ok(format!("successfully added rice batch {}", batch.batch_id))
    }

    pub fn read_rice_batch(&self, ledger: &dyn Ledger, batch_id: &BatchId) -> Result<RiceBatch> {
        self.queries().batch(ledger, batch_id)
    }

    pub fn delete_rice_batch(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        batch_id: &BatchId,
    ) -> Result<String> {
        self.lifecycle().delete_batch(caller, ledger, batch_id)?;
        Ok(format!("Rice batch {batch_id} deleted"))
    }

    pub fn rice_batch_exists(&self, ledger: &dyn Ledger, batch_id: &BatchId) -> Result<bool> {
        self.queries().batch_exists(ledger, batch_id)
    }

    pub fn get_all_rice_batches(&self, ledger: &dyn Ledger) -> Result<Vec<RiceBatch>> {
        self.queries().all_batches(ledger)
    }

    pub fn get_rice_batch_history(
        &self,
        ledger: &dyn Ledger,
        batch_id: &BatchId,
    ) -> Result<Vec<HistoryRecord>> {
        self.queries().history(ledger, batch_id)
    }

    pub fn get_rice_batch_by_range(
        &self,
        ledger: &dyn Ledger,
        start_key: &str,
        end_key: &str,
    ) -> Result<Vec<RiceBatch>> {
        self.queries().batches_by_range(ledger, start_key, end_key)
    }

    pub fn dispatch_to_retailer(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        batch_id: &BatchId,
        retailer: &str,
    ) -> Result<String> {
        self.lifecycle().dispatch(caller, ledger, batch_id, retailer)?;
        Ok(format!("Batch {batch_id} dispatched to {retailer}"))
    }

    // --- orders ---

    /// Order fields come from the invocation's transient map.
    pub fn create_processing_order(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        order_id: &OrderId,
    ) -> Result<String> {
        self.lifecycle().create_order(caller, ledger, order_id)?;
        Ok(format!("Processing order {order_id} created"))
    }

    pub fn read_processing_order(
        &self,
        ledger: &dyn Ledger,
        order_id: &OrderId,
    ) -> Result<ProcessingOrder> {
        self.queries().order(ledger, order_id)
    }

    pub fn processing_order_exists(&self, ledger: &dyn Ledger, order_id: &OrderId) -> Result<bool> {
        self.queries().order_exists(ledger, order_id)
    }

    pub fn match_processing_order(
        &self,
        ledger: &mut dyn Ledger,
        batch_id: &BatchId,
        order_id: &OrderId,
    ) -> Result<String> {
        self.matching().match_order(ledger, batch_id, order_id)?;
        Ok(format!("Order {order_id} fulfilled by batch {batch_id}"))
    }

    pub fn get_matching_orders(
        &self,
        ledger: &dyn Ledger,
        batch_id: &BatchId,
    ) -> Result<Vec<ProcessingOrder>> {
        self.queries().matching_orders(ledger, batch_id)
    }

    pub fn get_all_processing_orders(&self, ledger: &dyn Ledger) -> Result<Vec<ProcessingOrder>> {
        self.queries().all_orders(ledger)
    }

    pub fn get_processing_orders_by_range(
        &self,
        ledger: &dyn Ledger,
        start_key: &str,
        end_key: &str,
    ) -> Result<Vec<ProcessingOrder>> {
        self.queries().orders_by_range(ledger, start_key, end_key)
    }
}
