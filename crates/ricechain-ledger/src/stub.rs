//! The ledger and identity interfaces the contract consumes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ricechain_types::OrgId;
use serde::{Deserialize, Serialize};

use crate::{Cursor, LedgerResult, RichQuery};

/// Caller-supplied data visible only to the invocation that carries it.
pub type TransientMap = BTreeMap<String, Vec<u8>>;

/// One entry of a range scan or selector query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One committed change to a key, as kept in the key's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModification {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
    /// The written value; empty for deletes.
    pub value: Vec<u8>,
}

/// Source of the caller's verified organization.
///
/// The host has already authenticated the caller; the contract trusts the
/// returned id completely.
pub trait ClientIdentity {
    fn org_id(&self) -> LedgerResult<OrgId>;
}

/// A fixed organization identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrgIdentity {
    org: OrgId,
}

impl OrgIdentity {
    #[must_use]
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            org: OrgId::new(org),
        }
    }
}

impl ClientIdentity for OrgIdentity {
    fn org_id(&self) -> LedgerResult<OrgId> {
        Ok(self.org.clone())
    }
}

/// Ledger access scoped to a single invocation.
///
/// Reads see the invocation's own pending writes. Writes are buffered and
/// become visible to others only when the host commits the invocation as a
/// whole. Range bounds are `[start, end)`; an empty bound is open.
pub trait Ledger {
    /// Identifier of the transaction this invocation will commit as.
    fn tx_id(&self) -> &str;

    /// Timestamp the transaction will be recorded with.
    fn tx_timestamp(&self) -> DateTime<Utc>;

    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()>;

    fn del_state(&mut self, key: &str) -> LedgerResult<()>;

    fn get_state_by_range(&self, start: &str, end: &str) -> LedgerResult<Cursor<KeyValue>>;

    fn get_query_result(&self, query: &RichQuery) -> LedgerResult<Cursor<KeyValue>>;

    /// Committed modifications of `key`, oldest first.
    fn get_history_for_key(&self, key: &str) -> LedgerResult<Cursor<KeyModification>>;

    /// Requires membership of `collection`.
    fn get_private_data(&self, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// SHA-256 of the private value; available to non-members.
    fn get_private_data_hash(&self, collection: &str, key: &str)
    -> LedgerResult<Option<[u8; 32]>>;

    fn put_private_data(&mut self, collection: &str, key: &str, value: Vec<u8>)
    -> LedgerResult<()>;

    fn del_private_data(&mut self, collection: &str, key: &str) -> LedgerResult<()>;

    /// Requires membership of `collection`.
    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> LedgerResult<Cursor<KeyValue>>;

    /// Requires membership of `collection`.
    fn get_private_data_query_result(
        &self,
        collection: &str,
        query: &RichQuery,
    ) -> LedgerResult<Cursor<KeyValue>>;

    fn transient(&self) -> &TransientMap;
}
