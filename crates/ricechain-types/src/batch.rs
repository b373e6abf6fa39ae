//! Rice batch types.
//!
//! A [`RiceBatch`] lives in public world state under its [`BatchId`].
//!
//! ## State Machine
//!
//! ```text
//!   ┌───────────┐  match   ┌──────────────────────┐  dispatch  ┌─────────────────────────┐
//!   │ HARVESTED ├─────────▶│ ASSIGNED(miller)     ├───────────▶│ DISPATCHED(retailer)    │
//!   └─────┬─────┘          └──────────────────────┘            └─────────────────────────┘
//!         │                          dispatch                              ▲
//!         └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transitions never lower the rank of a status. Re-assigning an assigned
//! batch and re-dispatching a dispatched batch keep the rank and are allowed.
//!
//! The status is persisted in its legacy string form (`Harvested`,
//! `Assigned to Miller <name>`, `Dispatched to <retailer>`); the variant is
//! converted only at the serde boundary.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{BatchId, Result, RiceError, constants};

/// `assetType` discriminator stored on every document, used by selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "riceBatch")]
    RiceBatch,
    #[serde(rename = "processingOrder")]
    ProcessingOrder,
}

impl AssetType {
    /// The tag as stored in the document.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RiceBatch => constants::ASSET_TYPE_RICE_BATCH,
            Self::ProcessingOrder => constants::ASSET_TYPE_PROCESSING_ORDER,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a rice batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BatchStatus {
    /// Freshly registered by the farmer.
    Harvested,
    /// Paired with a miller's processing order.
    Assigned { miller: String },
    /// Handed over to a retailer, who becomes the custodian.
    Dispatched { retailer: String },
}

impl BatchStatus {
    /// Position in the forward-only lifecycle.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Harvested => 0,
            Self::Assigned { .. } => 1,
            Self::Dispatched { .. } => 2,
        }
    }

    /// Can a batch in this status move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: &Self) -> bool {
        !matches!(target, Self::Harvested) && target.rank() >= self.rank()
    }

    /// Miller name, if assigned.
    #[must_use]
    pub fn miller(&self) -> Option<&str> {
        match self {
            Self::Assigned { miller } => Some(miller),
            _ => None,
        }
    }

    /// Retailer name, if dispatched.
    #[must_use]
    pub fn retailer(&self) -> Option<&str> {
        match self {
            Self::Dispatched { retailer } => Some(retailer),
            _ => None,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Harvested => f.write_str(constants::STATUS_HARVESTED),
            Self::Assigned { miller } => {
                write!(f, "{}{miller}", constants::STATUS_ASSIGNED_PREFIX)
            }
            Self::Dispatched { retailer } => {
                write!(f, "{}{retailer}", constants::STATUS_DISPATCHED_PREFIX)
            }
        }
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == constants::STATUS_HARVESTED {
            return Ok(Self::Harvested);
        }
        if let Some(miller) = s.strip_prefix(constants::STATUS_ASSIGNED_PREFIX) {
            return Ok(Self::Assigned {
                miller: miller.to_string(),
            });
        }
        if let Some(retailer) = s.strip_prefix(constants::STATUS_DISPATCHED_PREFIX) {
            return Ok(Self::Dispatched {
                retailer: retailer.to_string(),
            });
        }
        Err(format!("unrecognised batch status {s:?}"))
    }
}

impl Serialize for BatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Fields supplied by the farmer when registering a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    #[serde(rename = "batchID")]
    pub batch_id: BatchId,
    pub variety: String,
    pub harvest_date: String,
    pub quantity_in_kg: u64,
    pub farmer_name: String,
}

impl NewBatch {
    #[must_use]
    pub fn new(
        batch_id: impl Into<String>,
        variety: impl Into<String>,
        harvest_date: impl Into<String>,
        quantity_in_kg: u64,
        farmer_name: impl Into<String>,
    ) -> Self {
        Self {
            batch_id: BatchId::new(batch_id),
            variety: variety.into(),
            harvest_date: harvest_date.into(),
            quantity_in_kg,
            farmer_name: farmer_name.into(),
        }
    }
}

/// A physical rice batch as recorded in world state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiceBatch {
    pub asset_type: AssetType,
    #[serde(rename = "batchID")]
    pub batch_id: BatchId,
    pub variety: String,
    pub harvest_date: String,
    pub quantity_in_kg: u64,
    /// Current custodian: the farmer, then the retailer after dispatch.
    pub produced_by: String,
    pub status: BatchStatus,
}

impl RiceBatch {
    /// A new batch in the `Harvested` state.
    #[must_use]
    pub fn harvested(new: NewBatch) -> Self {
        Self {
            asset_type: AssetType::RiceBatch,
            batch_id: new.batch_id,
            variety: new.variety,
            harvest_date: new.harvest_date,
            quantity_in_kg: new.quantity_in_kg,
            produced_by: new.farmer_name,
            status: BatchStatus::Harvested,
        }
    }

    /// Move to `Assigned to Miller <miller>`.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the batch was already dispatched.
    pub fn mark_assigned(&mut self, miller: &str) -> Result<()> {
        self.transition(BatchStatus::Assigned {
            miller: miller.to_string(),
        })
    }

    /// Move to `Dispatched to <retailer>` and hand custody to the retailer.
    ///
    /// Dispatch is reachable from every state, so this never fails today;
    /// it still goes through the transition table.
    pub fn mark_dispatched(&mut self, retailer: &str) -> Result<()> {
        self.transition(BatchStatus::Dispatched {
            retailer: retailer.to_string(),
        })?;
        self.produced_by = retailer.to_string();
        Ok(())
    }

    fn transition(&mut self, target: BatchStatus) -> Result<()> {
        if !self.status.can_transition_to(&target) {
            return Err(RiceError::InvalidTransition {
                from: self.status.clone(),
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a stored value read under `key`.
    ///
    /// # Errors
    /// Returns `DecodeFailure` if the bytes are not a rice batch document.
    pub fn from_bytes(key: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| RiceError::decode(key, &e))
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl RiceBatch {
    pub fn dummy(batch_id: &str, variety: &str, quantity_in_kg: u64) -> Self {
        Self::harvested(NewBatch::new(
            batch_id,
            variety,
            "2024-01-01",
            quantity_in_kg,
            "Farmer A",
        ))
    }
}
