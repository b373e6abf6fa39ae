//! Pairing of one order with one batch.
//!
//! ```text
//! pair(batch, order) -> Pairing { batch': Assigned to Miller <m>, consumed order }
//! ```
//!
//! The inputs are borrowed; on refusal the caller still holds them exactly
//! as they were read.

use ricechain_types::{OrderId, ProcessingOrder, Result, RiceBatch};

use crate::check_eligibility;

/// Result of a successful pairing: the batch to write back and the order
/// to remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub batch: RiceBatch,
    pub consumed_order: OrderId,
    pub miller_name: String,
}

/// Pair `order` with `batch`.
///
/// # Errors
/// - `VarietyOrQuantityMismatch` if the pairing rule fails
/// - `InvalidTransition` if the batch has already been dispatched
pub fn pair(batch: &RiceBatch, order: &ProcessingOrder) -> Result<Pairing> {
    check_eligibility(batch, order).into_result()?;

    let mut assigned = batch.clone();
    assigned.mark_assigned(&order.miller_name)?;

    tracing::debug!(
        batch_id = %batch.batch_id,
        order_id = %order.order_id,
        miller = %order.miller_name,
        quantity_in_kg = order.quantity_in_kg,
        "Order paired with batch"
    );

    Ok(Pairing {
        batch: assigned,
        consumed_order: order.order_id.clone(),
        miller_name: order.miller_name.clone(),
    })
}
