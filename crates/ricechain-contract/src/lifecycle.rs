//! Asset lifecycle engine.
//!
//! Creation, deletion and dispatch of rice batches, and creation of
//! processing orders. Each operation authorizes the caller first, then
//! checks existence, then writes.
//!
//! ```text
//!   create_batch ──► Harvested ──match──► Assigned to Miller <m>
//!                        │                        │
//!                        └──────dispatch──────────┴──► Dispatched to <r>
//! ```

use ricechain_ledger::{ClientIdentity, Ledger};
use ricechain_types::{
    BatchId, NewBatch, OrderId, ProcessingOrder, Result, RiceBatch, RiceError, Role,
};

use crate::{BatchStore, IdentityGuard, OrderStore};

/// Mutations of batch and order records.
#[derive(Debug, Clone, Copy)]
pub struct AssetLifecycle<'a> {
    guard: IdentityGuard<'a>,
    batches: &'a BatchStore,
    orders: &'a OrderStore,
    allow_batch_id_reuse: bool,
}

impl<'a> AssetLifecycle<'a> {
    #[must_use]
    pub fn new(
        guard: IdentityGuard<'a>,
        batches: &'a BatchStore,
        orders: &'a OrderStore,
        allow_batch_id_reuse: bool,
    ) -> Self {
        Self {
            guard,
            batches,
            orders,
            allow_batch_id_reuse,
        }
    }

    /// Register a harvested batch.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is a farmer
    /// - `InvalidArgument` for an empty batch id
    /// - `BatchAlreadyExists` if the id is taken (or was ever used, when
    ///   id reuse is disabled)
    pub fn create_batch(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        new: NewBatch,
    ) -> Result<RiceBatch> {
        let org = self.guard.authorize(caller, Role::Farmer, "create rice batches")?;
        if new.batch_id.is_empty() {
            return Err(RiceError::InvalidArgument {
                reason: "batch id must not be empty".to_string(),
            });
        }
        if self.batches.exists(ledger, &new.batch_id)?
            || (!self.allow_batch_id_reuse && self.batches.ever_existed(ledger, &new.batch_id)?)
        {
            return Err(RiceError::BatchAlreadyExists(new.batch_id));
        }

        let batch = RiceBatch::harvested(new);
        self.batches.put(ledger, &batch)?;
        tracing::info!(
            batch_id = %batch.batch_id,
            variety = %batch.variety,
            quantity_in_kg = batch.quantity_in_kg,
            org = %org,
            "Rice batch created"
        );
        Ok(batch)
    }

    /// Remove a batch from world state. Its history is kept.
    ///
    /// # Errors
    /// `Unauthorized` unless the caller is a farmer; `BatchNotFound` if absent.
    pub fn delete_batch(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        batch_id: &BatchId,
    ) -> Result<()> {
        let org = self.guard.authorize(caller, Role::Farmer, "delete rice batches")?;
        if !self.batches.exists(ledger, batch_id)? {
            return Err(RiceError::BatchNotFound(batch_id.clone()));
        }
        self.batches.delete(ledger, batch_id)?;
        tracing::info!(batch_id = %batch_id, org = %org, "Rice batch deleted");
        Ok(())
    }

    /// Hand a batch to a retailer.
    ///
    /// Allowed from any state; the custodian becomes the retailer.
    ///
    /// # Errors
    /// `Unauthorized` unless the caller is a retailer; `BatchNotFound` if absent.
    pub fn dispatch(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        batch_id: &BatchId,
        retailer: &str,
    ) -> Result<RiceBatch> {
        let org = self.guard.authorize(caller, Role::Retailer, "dispatch batches")?;
        let mut batch = self.batches.get(ledger, batch_id)?;
        let from = batch.status.clone();
        batch.mark_dispatched(retailer)?;
        self.batches.put(ledger, &batch)?;
        tracing::info!(
            batch_id = %batch_id,
            from = %from,
            retailer,
            org = %org,
            "Rice batch dispatched"
        );
        Ok(batch)
    }

    /// Place a processing order from the invocation's transient fields.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is a miller
    /// - `MissingTransientData` if no order field was supplied
    /// - `InvalidArgument` for an empty order id
    /// - `OrderAlreadyExists` if the id is taken
    /// - `InvalidQuantity` if the strict policy rejects the quantity
    pub fn create_order(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        order_id: &OrderId,
    ) -> Result<ProcessingOrder> {
        let org = self.guard.authorize(caller, Role::Miller, "create processing orders")?;
        if !crate::order_store::has_order_fields(ledger.transient()) {
            return Err(RiceError::MissingTransientData);
        }
        if order_id.is_empty() {
            return Err(RiceError::InvalidArgument {
                reason: "order id must not be empty".to_string(),
            });
        }
        if self.orders.exists(ledger, order_id)? {
            return Err(RiceError::OrderAlreadyExists(order_id.clone()));
        }

        let order = self.orders.from_transient(order_id, ledger.transient())?;
        self.orders.put(ledger, &order)?;
        tracing::info!(
            order_id = %order_id,
            collection = self.orders.collection(),
            org = %org,
            "Processing order created"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use ricechain_ledger::{MemoryLedger, OrgIdentity, TransientMap};
    use ricechain_types::{BatchStatus, ContractConfig, QuantityPolicy};

    use super::*;

    struct Fixture {
        config: ContractConfig,
        batches: BatchStore,
        orders: OrderStore,
        ledger: MemoryLedger,
    }

    impl Fixture {
        fn new(config: ContractConfig) -> Self {
            let ledger = MemoryLedger::new().with_collection(&config.order_collection, ["Org2MSP"]);
            Self {
                batches: BatchStore::new(),
                orders: OrderStore::from_config(&config),
                config,
                ledger,
            }
        }

        fn run<T>(
            &mut self,
            org: &str,
            transient: TransientMap,
            op: impl FnOnce(&AssetLifecycle<'_>, &dyn ClientIdentity, &mut dyn Ledger) -> Result<T>,
        ) -> Result<T> {
            let lifecycle = AssetLifecycle::new(
                IdentityGuard::new(&self.config),
                &self.batches,
                &self.orders,
                self.config.allow_batch_id_reuse,
            );
            let caller = OrgIdentity::new(org);
            self.ledger
                .submit(&caller, transient, |inv| op(&lifecycle, &caller, inv))
        }
    }

    fn new_batch(id: &str) -> NewBatch {
        NewBatch::new(id, "Basmati", "2024-01-01", 1000, "Farmer A")
    }

    #[test]
    fn farmer_creates_harvested_batch() {
        let mut fx = Fixture::new(ContractConfig::default());
        let batch = fx
            .run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.create_batch(who, l, new_batch("B1"))
            })
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Harvested);
        assert_eq!(batch.produced_by, "Farmer A");
        assert!(fx.ledger.state("B1").is_some());
    }

    #[test]
    fn duplicate_batch_rejected() {
        let mut fx = Fixture::new(ContractConfig::default());
        fx.run("Org1MSP", TransientMap::new(), |lc, who, l| {
            lc.create_batch(who, l, new_batch("B1"))
        })
        .unwrap();
        let err = fx
            .run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.create_batch(who, l, new_batch("B1"))
            })
            .unwrap_err();
        assert!(matches!(err, RiceError::BatchAlreadyExists(_)));
    }

    #[test]
    fn empty_batch_id_rejected() {
        let mut fx = Fixture::new(ContractConfig::default());
        let err = fx
            .run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.create_batch(who, l, new_batch(""))
            })
            .unwrap_err();
        assert!(matches!(err, RiceError::InvalidArgument { .. }));
    }

    #[test]
    fn reuse_after_delete_follows_config() {
        for (allow, expect_ok) in [(true, true), (false, false)] {
            let config = ContractConfig {
                allow_batch_id_reuse: allow,
                ..ContractConfig::default()
            };
            let mut fx = Fixture::new(config);
            fx.run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.create_batch(who, l, new_batch("B1"))
            })
            .unwrap();
            fx.run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.delete_batch(who, l, &BatchId::from("B1"))
            })
            .unwrap();
            let again = fx.run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.create_batch(who, l, new_batch("B1"))
            });
            assert_eq!(again.is_ok(), expect_ok, "allow_batch_id_reuse = {allow}");
        }
    }

    #[test]
    fn delete_missing_batch_is_not_found() {
        let mut fx = Fixture::new(ContractConfig::default());
        let err = fx
            .run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.delete_batch(who, l, &BatchId::from("B1"))
            })
            .unwrap_err();
        assert!(matches!(err, RiceError::BatchNotFound(_)));
    }

    #[test]
    fn dispatch_moves_custody() {
        let mut fx = Fixture::new(ContractConfig::default());
        fx.run("Org1MSP", TransientMap::new(), |lc, who, l| {
            lc.create_batch(who, l, new_batch("B1"))
        })
        .unwrap();
        let batch = fx
            .run("Org3MSP", TransientMap::new(), |lc, who, l| {
                lc.dispatch(who, l, &BatchId::from("B1"), "RetailerCo")
            })
            .unwrap();
        assert_eq!(batch.status.to_string(), "Dispatched to RetailerCo");
        assert_eq!(batch.produced_by, "RetailerCo");
    }

    #[test]
    fn farmer_cannot_dispatch() {
        let mut fx = Fixture::new(ContractConfig::default());
        fx.run("Org1MSP", TransientMap::new(), |lc, who, l| {
            lc.create_batch(who, l, new_batch("B1"))
        })
        .unwrap();
        let err = fx
            .run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.dispatch(who, l, &BatchId::from("B1"), "RetailerCo")
            })
            .unwrap_err();
        assert!(matches!(err, RiceError::Unauthorized { .. }));
    }

    #[test]
    fn order_checks_run_in_order() {
        let config = ContractConfig {
            quantity_policy: QuantityPolicy::Strict,
            ..ContractConfig::default()
        };
        let mut fx = Fixture::new(config);
        let fields: TransientMap = [
            ("variety".to_string(), b"Basmati".to_vec()),
            ("millerName".to_string(), b"Miller X".to_vec()),
            ("quantityInKg".to_string(), b"500".to_vec()),
        ]
        .into_iter()
        .collect();

        // Role before transient data.
        let err = fx
            .run("Org1MSP", TransientMap::new(), |lc, who, l| {
                lc.create_order(who, l, &OrderId::from("O1"))
            })
            .unwrap_err();
        assert!(matches!(err, RiceError::Unauthorized { .. }));

        let err = fx
            .run("Org2MSP", TransientMap::new(), |lc, who, l| {
                lc.create_order(who, l, &OrderId::from("O1"))
            })
            .unwrap_err();
        assert!(matches!(err, RiceError::MissingTransientData));

        let order = fx
            .run("Org2MSP", fields.clone(), |lc, who, l| {
                lc.create_order(who, l, &OrderId::from("O1"))
            })
            .unwrap();
        assert_eq!(order.quantity_in_kg, 500);

        let err = fx
            .run("Org2MSP", fields, |lc, who, l| {
                lc.create_order(who, l, &OrderId::from("O1"))
            })
            .unwrap_err();
        assert!(matches!(err, RiceError::OrderAlreadyExists(_)));
    }
}
