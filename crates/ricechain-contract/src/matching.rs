//! Matching engine: fulfil a private processing order with a public batch.
//!
//! 1. Resolve the batch (`BatchNotFound`)
//! 2. Resolve the order (`OrderNotFound`; the host refuses non-members)
//! 3. Apply the pairing rule in MatchCore; a refusal writes nothing
//! 4. Delete the order, then write the assigned batch
//!
//! Both writes land in the same invocation, so the host commits them
//! together or not at all.

use ricechain_ledger::Ledger;
use ricechain_matchcore::{Pairing, pair};
use ricechain_types::{BatchId, OrderId, Result};

use crate::{BatchStore, OrderStore};

#[derive(Debug, Clone, Copy)]
pub struct MatchingEngine<'a> {
    batches: &'a BatchStore,
    orders: &'a OrderStore,
}

impl<'a> MatchingEngine<'a> {
    #[must_use]
    pub fn new(batches: &'a BatchStore, orders: &'a OrderStore) -> Self {
        Self { batches, orders }
    }

    /// Pair `order_id` with `batch_id` and persist the outcome.
    pub fn match_order(
        &self,
        ledger: &mut dyn Ledger,
        batch_id: &BatchId,
        order_id: &OrderId,
    ) -> Result<Pairing> {
        let batch = self.batches.get(ledger, batch_id)?;
        let order = self.orders.get(ledger, order_id)?;

        let pairing = match pair(&batch, &order) {
            Ok(pairing) => pairing,
            Err(err) => {
                tracing::warn!(
                    batch_id = %batch_id,
                    order_id = %order_id,
                    error = %err,
                    "Pairing refused"
                );
                return Err(err);
            }
        };

        self.orders.delete(ledger, &pairing.consumed_order)?;
        self.batches.put(ledger, &pairing.batch)?;

        tracing::info!(
            batch_id = %batch_id,
            order_id = %order_id,
            miller = %pairing.miller_name,
            tx_id = ledger.tx_id(),
            "Order fulfilled"
        );
        Ok(pairing)
    }
}

#[cfg(test)]
mod tests {
    use ricechain_ledger::{MemoryLedger, OrgIdentity, TransientMap};
    use ricechain_types::{
        BatchStatus, ErrorKind, ProcessingOrder, QuantityPolicy, RiceBatch, RiceError,
    };

    use super::*;
    use crate::testing::{Fault, FaultyLedger};

    const COLLECTION: &str = "ProcessingOrderCollection";

    fn seeded(batch: RiceBatch, order: ProcessingOrder) -> (MemoryLedger, BatchStore, OrderStore) {
        let mut ledger = MemoryLedger::new().with_collection(COLLECTION, ["Org2MSP"]);
        let batches = BatchStore::new();
        let orders = OrderStore::new(COLLECTION, QuantityPolicy::Strict);
        ledger
            .submit(&OrgIdentity::new("Org2MSP"), TransientMap::new(), |inv| {
                batches.put(inv, &batch)?;
                orders.put(inv, &order)
            })
            .unwrap();
        (ledger, batches, orders)
    }

    fn run_match(
        ledger: &mut MemoryLedger,
        batches: &BatchStore,
        orders: &OrderStore,
        org: &str,
    ) -> Result<Pairing> {
        let engine = MatchingEngine::new(batches, orders);
        ledger.submit(&OrgIdentity::new(org), TransientMap::new(), |inv| {
            engine.match_order(inv, &BatchId::from("B1"), &OrderId::from("O1"))
        })
    }

    #[test]
    fn match_consumes_order_and_assigns_batch() {
        let (mut ledger, batches, orders) = seeded(
            RiceBatch::dummy("B1", "Basmati", 1000),
            ProcessingOrder::dummy("O1", "Basmati", 500),
        );
        let pairing = run_match(&mut ledger, &batches, &orders, "Org2MSP").unwrap();
        assert_eq!(pairing.miller_name, "Miller X");

        assert!(ledger.private_state(COLLECTION, "O1").is_none());
        let stored = RiceBatch::from_bytes("B1", ledger.state("B1").unwrap()).unwrap();
        assert_eq!(
            stored.status,
            BatchStatus::Assigned {
                miller: "Miller X".into()
            }
        );
    }

    #[test]
    fn mismatch_leaves_both_records() {
        let (mut ledger, batches, orders) = seeded(
            RiceBatch::dummy("B1", "Basmati", 1000),
            ProcessingOrder::dummy("O1", "Jasmine", 500),
        );
        let before = ledger.state("B1").map(<[u8]>::to_vec);
        let err = run_match(&mut ledger, &batches, &orders, "Org2MSP").unwrap_err();
        assert!(matches!(err, RiceError::VarietyOrQuantityMismatch { .. }));
        assert_eq!(ledger.state("B1").map(<[u8]>::to_vec), before);
        assert!(ledger.private_state(COLLECTION, "O1").is_some());
    }

    #[test]
    fn failed_batch_write_keeps_the_order() {
        let (mut ledger, batches, orders) = seeded(
            RiceBatch::dummy("B1", "Basmati", 1000),
            ProcessingOrder::dummy("O1", "Basmati", 500),
        );
        let before = ledger.state("B1").map(<[u8]>::to_vec);
        let height = ledger.height();
        let engine = MatchingEngine::new(&batches, &orders);

        let err = ledger
            .submit(&OrgIdentity::new("Org2MSP"), TransientMap::new(), |inv| {
                let mut faulty = FaultyLedger::new(inv, Fault::PutStateUnavailable);
                engine.match_order(&mut faulty, &BatchId::from("B1"), &OrderId::from("O1"))
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(err.to_string().contains("disk"));
        assert_eq!(ledger.height(), height);
        assert!(ledger.private_state(COLLECTION, "O1").is_some());
        assert_eq!(ledger.state("B1").map(<[u8]>::to_vec), before);
    }

    #[test]
    fn missing_batch_reported_before_order() {
        let mut ledger = MemoryLedger::new().with_collection(COLLECTION, ["Org2MSP"]);
        let batches = BatchStore::new();
        let orders = OrderStore::new(COLLECTION, QuantityPolicy::Strict);
        let err = run_match(&mut ledger, &batches, &orders, "Org2MSP").unwrap_err();
        assert!(matches!(err, RiceError::BatchNotFound(_)));
    }

    #[test]
    fn non_member_cannot_match() {
        let (mut ledger, batches, orders) = seeded(
            RiceBatch::dummy("B1", "Basmati", 1000),
            ProcessingOrder::dummy("O1", "Basmati", 500),
        );
        let err = run_match(&mut ledger, &batches, &orders, "Org3MSP").unwrap_err();
        assert!(matches!(err, RiceError::Unauthorized { .. }));
        assert!(ledger.private_state(COLLECTION, "O1").is_some());
    }
}
