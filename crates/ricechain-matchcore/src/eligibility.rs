//! Eligibility of a batch to fulfil an order.
//!
//! A batch can fulfil an order when both name the same variety and the
//! batch holds at least the ordered quantity. Varieties compare exactly:
//! `"Basmati"` and `"basmati"` are different varieties.

use ricechain_types::{ProcessingOrder, Result, RiceBatch, RiceError};

/// Outcome of the pairing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    VarietyMismatch { batch: String, order: String },
    InsufficientQuantity { available: u64, requested: u64 },
}

impl Eligibility {
    /// Convert a refusal into `VarietyOrQuantityMismatch`.
    pub fn into_result(self) -> Result<()> {
        let reason = match self {
            Self::Eligible => return Ok(()),
            Self::VarietyMismatch { batch, order } => {
                format!("batch variety {batch} does not match order variety {order}")
            }
            Self::InsufficientQuantity {
                available,
                requested,
            } => format!("batch holds {available} kg, order requests {requested} kg"),
        };
        Err(RiceError::VarietyOrQuantityMismatch { reason })
    }
}

/// Apply the pairing rule. Variety is checked before quantity.
#[must_use]
pub fn check_eligibility(batch: &RiceBatch, order: &ProcessingOrder) -> Eligibility {
    if batch.variety != order.variety {
        return Eligibility::VarietyMismatch {
            batch: batch.variety.clone(),
            order: order.variety.clone(),
        };
    }
    if batch.quantity_in_kg < order.quantity_in_kg {
        return Eligibility::InsufficientQuantity {
            available: batch.quantity_in_kg,
            requested: order.quantity_in_kg,
        };
    }
    Eligibility::Eligible
}
