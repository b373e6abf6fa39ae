//! Batch history records, reconstructed from the ledger's per-key log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BatchId, RiceBatch};

/// The value of a batch at one committed transaction.
///
/// `record` is `None` for a tombstone: the transaction deleted the key or
/// the stored value was erased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(rename = "batchID")]
    pub batch_id: BatchId,
    pub tx_id: String,
    #[serde(with = "rfc2822")]
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
    pub record: Option<RiceBatch>,
}

impl HistoryRecord {
    /// Placeholder for a deleted or erased value.
    #[must_use]
    pub fn tombstone(batch_id: BatchId, tx_id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            batch_id,
            tx_id,
            timestamp,
            is_delete: true,
            record: None,
        }
    }

    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.record.is_none()
    }
}

/// Timestamps travel in RFC 2822 form (`Mon, 15 Jan 2024 09:30:00 +0000`).
mod rfc2822 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc2822())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc2822(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
