//! Processing order types.
//!
//! Orders are placed by millers and live only in the restricted order
//! collection; organizations outside the collection never see their
//! contents, only a hash proving existence.

use serde::{Deserialize, Serialize};

use crate::{AssetType, OrderId, Result, RiceError};

/// A miller's request to process a quantity of a given rice variety.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOrder {
    pub asset_type: AssetType,
    #[serde(rename = "orderID")]
    pub order_id: OrderId,
    pub variety: String,
    pub miller_name: String,
    pub quantity_in_kg: u64,
}

impl ProcessingOrder {
    #[must_use]
    pub fn new(
        order_id: OrderId,
        variety: impl Into<String>,
        miller_name: impl Into<String>,
        quantity_in_kg: u64,
    ) -> Self {
        Self {
            asset_type: AssetType::ProcessingOrder,
            order_id,
            variety: variety.into(),
            miller_name: miller_name.into(),
            quantity_in_kg,
        }
    }

    /// Encode for storage in the restricted collection.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a stored value read under `key`.
    ///
    /// # Errors
    /// Returns `DecodeFailure` if the bytes are not a processing order document.
    pub fn from_bytes(key: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| RiceError::decode(key, &e))
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl ProcessingOrder {
    pub fn dummy(order_id: &str, variety: &str, quantity_in_kg: u64) -> Self {
        Self::new(OrderId::from(order_id), variety, "Miller X", quantity_in_kg)
    }
}
