//! In-memory reference ledger.
//!
//! [`MemoryLedger`] keeps versioned world state, restricted collections and
//! per-key history in ordered maps. Work happens in an [`Invocation`]:
//!
//! 1. `begin` snapshots nothing; reads go to committed state and record the
//!    version they observed (the read-set)
//! 2. writes are buffered in the write-set; reads see them (read-your-writes)
//! 3. range scans record the range and the committed keys they saw
//! 4. `commit` re-checks every read version and re-runs every recorded range
//!    against committed state and, if nothing moved, applies all writes
//!    atomically and appends history
//!
//! A stale key fails the whole invocation with [`LedgerError::MvccConflict`],
//! a range that gained or lost keys with [`LedgerError::PhantomRead`];
//! nothing is applied either way.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
};

use chrono::{DateTime, Utc};
use ricechain_types::OrgId;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    ClientIdentity, Cursor, CursorTracker, KeyModification, KeyValue, Ledger, LedgerError,
    LedgerResult, RichQuery, TransientMap,
};

/// Namespaced key: `collection = None` is public world state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
struct StateKey {
    collection: Option<String>,
    key: String,
}

impl StateKey {
    fn public(key: &str) -> Self {
        Self {
            collection: None,
            key: key.to_string(),
        }
    }

    fn private(collection: &str, key: &str) -> Self {
        Self {
            collection: Some(collection.to_string()),
            key: key.to_string(),
        }
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.collection {
            Some(c) => write!(f, "{c}/{}", self.key),
            None => f.write_str(&self.key),
        }
    }
}

#[derive(Debug, Clone)]
struct Versioned {
    value: Vec<u8>,
    version: u64,
}

#[derive(Debug, Default)]
struct Collection {
    members: BTreeSet<OrgId>,
    data: BTreeMap<String, Versioned>,
}

/// A half-open range scanned by an invocation and the committed versions
/// it observed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RangeRead {
    collection: Option<String>,
    start: String,
    end: String,
    seen: BTreeMap<String, u64>,
}

fn in_range(key: &str, start: &str, end: &str) -> bool {
    (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}

/// Reads and buffered writes of a finished invocation, ready to commit.
#[derive(Debug, Clone)]
pub struct ReadWriteSet {
    tx_id: String,
    timestamp: DateTime<Utc>,
    reads: BTreeMap<StateKey, Option<u64>>,
    ranges: Vec<RangeRead>,
    /// `None` marks a delete.
    writes: BTreeMap<StateKey, Option<Vec<u8>>>,
}

impl ReadWriteSet {
    #[must_use]
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: String,
    /// Ledger height after this commit.
    pub height: u64,
    pub writes: usize,
}

/// Versioned in-memory host ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    world: BTreeMap<String, Versioned>,
    collections: BTreeMap<String, Collection>,
    history: HashMap<String, Vec<KeyModification>>,
    committed: HashSet<String>,
    height: u64,
}

impl MemoryLedger {
    /// Empty ledger with no restricted collections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_collection`](Self::add_collection).
    #[must_use]
    pub fn with_collection<I, O>(mut self, name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<String>,
    {
        self.add_collection(name, members);
        self
    }

    /// Define a restricted collection readable by `members`.
    pub fn add_collection<I, O>(&mut self, name: &str, members: I)
    where
        I: IntoIterator<Item = O>,
        O: Into<String>,
    {
        let entry = self.collections.entry(name.to_string()).or_default();
        entry.members.extend(members.into_iter().map(OrgId::new));
    }

    /// Number of committed transactions.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Committed public value, for inspection.
    #[must_use]
    pub fn state(&self, key: &str) -> Option<&[u8]> {
        self.world.get(key).map(|v| v.value.as_slice())
    }

    /// Committed private value, for inspection.
    #[must_use]
    pub fn private_state(&self, collection: &str, key: &str) -> Option<&[u8]> {
        self.collections
            .get(collection)?
            .data
            .get(key)
            .map(|v| v.value.as_slice())
    }

    /// Number of committed modifications of a public key.
    #[must_use]
    pub fn history_len(&self, key: &str) -> usize {
        self.history.get(key).map_or(0, Vec::len)
    }

    /// Start an invocation on behalf of `caller`.
    pub fn begin(
        &self,
        caller: &dyn ClientIdentity,
        transient: TransientMap,
    ) -> LedgerResult<Invocation<'_>> {
        let creator = caller.org_id()?;
        let timestamp = Utc::now();
        let mut hasher = Sha256::new();
        hasher.update(Uuid::now_v7().as_bytes());
        hasher.update(creator.as_str().as_bytes());
        let tx_id = hex::encode(hasher.finalize());
        Ok(Invocation {
            ledger: self,
            tx_id,
            timestamp,
            creator,
            transient,
            reads: RefCell::new(BTreeMap::new()),
            ranges: RefCell::new(Vec::new()),
            writes: BTreeMap::new(),
            cursors: CursorTracker::new(),
        })
    }

    /// Validate the read-set and apply the write-set atomically.
    pub fn commit(&mut self, rwset: ReadWriteSet) -> LedgerResult<CommitReceipt> {
        if self.committed.contains(&rwset.tx_id) {
            return Err(LedgerError::DuplicateTxId(rwset.tx_id));
        }
        for (key, observed) in &rwset.reads {
            if self.version_of(key) != *observed {
                tracing::warn!(tx_id = %rwset.tx_id, key = %key, "MVCC read conflict");
                return Err(LedgerError::MvccConflict {
                    key: key.to_string(),
                });
            }
        }
        for range in &rwset.ranges {
            let collection = range.collection.as_deref();
            if self.committed_versions(collection, &range.start, &range.end) != range.seen {
                tracing::warn!(
                    tx_id = %rwset.tx_id,
                    start = %range.start,
                    end = %range.end,
                    "Phantom read in range"
                );
                return Err(LedgerError::PhantomRead {
                    start: range.start.clone(),
                    end: range.end.clone(),
                });
            }
        }

        self.height += 1;
        let version = self.height;
        let writes = rwset.writes.len();
        for (key, value) in rwset.writes {
            match key.collection {
                None => {
                    let is_delete = value.is_none();
                    match &value {
                        Some(bytes) => {
                            self.world.insert(
                                key.key.clone(),
                                Versioned {
                                    value: bytes.clone(),
                                    version,
                                },
                            );
                        }
                        None => {
                            self.world.remove(&key.key);
                        }
                    }
                    self.history.entry(key.key).or_default().push(KeyModification {
                        tx_id: rwset.tx_id.clone(),
                        timestamp: rwset.timestamp,
                        is_delete,
                        value: value.unwrap_or_default(),
                    });
                }
                Some(name) => {
                    // Writes are only buffered for defined collections.
                    let collection = self.collections.entry(name).or_default();
                    match value {
                        Some(bytes) => {
                            collection.data.insert(key.key, Versioned { value: bytes, version });
                        }
                        None => {
                            collection.data.remove(&key.key);
                        }
                    }
                }
            }
        }
        self.committed.insert(rwset.tx_id.clone());

        tracing::info!(tx_id = %rwset.tx_id, height = self.height, writes, "Transaction committed");
        Ok(CommitReceipt {
            tx_id: rwset.tx_id,
            height: self.height,
            writes,
        })
    }

    /// Run `op` as one transaction: commit its writes if it succeeds,
    /// discard them if it fails.
    pub fn submit<T, E, F>(
        &mut self,
        caller: &dyn ClientIdentity,
        transient: TransientMap,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut Invocation<'_>) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut invocation = self.begin(caller, transient)?;
        let outcome = op(&mut invocation);
        let finished = invocation.finish();
        // The operation's own failure wins over a cursor leak.
        let value = outcome?;
        self.commit(finished?)?;
        Ok(value)
    }

    /// Run a read-only `op` without committing anything.
    pub fn evaluate<T, E, F>(&self, caller: &dyn ClientIdentity, op: F) -> Result<T, E>
    where
        F: FnOnce(&Invocation<'_>) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let invocation = self.begin(caller, TransientMap::new())?;
        let outcome = op(&invocation);
        let finished = invocation.finish();
        let value = outcome?;
        finished?;
        Ok(value)
    }

    fn version_of(&self, key: &StateKey) -> Option<u64> {
        match &key.collection {
            None => self.world.get(&key.key).map(|v| v.version),
            Some(name) => self
                .collections
                .get(name)
                .and_then(|c| c.data.get(&key.key))
                .map(|v| v.version),
        }
    }

    fn namespace(&self, collection: Option<&str>) -> Option<&BTreeMap<String, Versioned>> {
        match collection {
            None => Some(&self.world),
            Some(name) => self.collections.get(name).map(|c| &c.data),
        }
    }

    /// Committed key versions of a namespace within `[start, end)`.
    fn committed_versions(
        &self,
        collection: Option<&str>,
        start: &str,
        end: &str,
    ) -> BTreeMap<String, u64> {
        self.namespace(collection)
            .map(|ns| {
                ns.iter()
                    .filter(|(k, _)| in_range(k, start, end))
                    .map(|(k, v)| (k.clone(), v.version))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One contract invocation against a [`MemoryLedger`].
#[derive(Debug)]
pub struct Invocation<'a> {
    ledger: &'a MemoryLedger,
    tx_id: String,
    timestamp: DateTime<Utc>,
    creator: OrgId,
    transient: TransientMap,
    reads: RefCell<BTreeMap<StateKey, Option<u64>>>,
    ranges: RefCell<Vec<RangeRead>>,
    writes: BTreeMap<StateKey, Option<Vec<u8>>>,
    cursors: CursorTracker,
}

impl Invocation<'_> {
    /// Organization the invocation runs for.
    #[must_use]
    pub fn creator(&self) -> &OrgId {
        &self.creator
    }

    /// Cursors opened and not yet released.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.cursors.open_count()
    }

    /// End the invocation and hand back its read/write sets.
    ///
    /// # Errors
    /// Returns `CursorLeak` if any query cursor is still open.
    pub fn finish(self) -> LedgerResult<ReadWriteSet> {
        let open = self.cursors.open_count();
        if open > 0 {
            tracing::warn!(tx_id = %self.tx_id, open, "Invocation finished with open cursors");
            return Err(LedgerError::CursorLeak(open));
        }
        Ok(ReadWriteSet {
            tx_id: self.tx_id,
            timestamp: self.timestamp,
            reads: self.reads.into_inner(),
            ranges: self.ranges.into_inner(),
            writes: self.writes,
        })
    }

    fn read(&self, key: StateKey) -> Option<Vec<u8>> {
        if let Some(pending) = self.writes.get(&key) {
            return pending.clone();
        }
        let committed = self
            .ledger
            .namespace(key.collection.as_deref())
            .and_then(|ns| ns.get(&key.key));
        self.reads
            .borrow_mut()
            .insert(key, committed.map(|v| v.version));
        committed.map(|v| v.value.clone())
    }

    fn write(&mut self, key: StateKey, value: Option<Vec<u8>>) -> LedgerResult<()> {
        if key.key.is_empty() {
            return Err(LedgerError::EmptyKey);
        }
        if let Some(bytes) = &value {
            if bytes.is_empty() {
                return Err(LedgerError::EmptyValue(key.key));
            }
        }
        self.writes.insert(key, value);
        Ok(())
    }

    /// Range scan that is re-validated at commit.
    fn range_read(&self, collection: Option<&str>, start: &str, end: &str) -> Vec<KeyValue> {
        self.ranges.borrow_mut().push(RangeRead {
            collection: collection.map(str::to_string),
            start: start.to_string(),
            end: end.to_string(),
            seen: self.ledger.committed_versions(collection, start, end),
        });
        self.merged_range(collection, start, end)
    }

    /// Committed entries of a namespace overlaid with pending writes,
    /// restricted to `[start, end)`.
    fn merged_range(&self, collection: Option<&str>, start: &str, end: &str) -> Vec<KeyValue> {
        let mut view: BTreeMap<String, Option<Vec<u8>>> = BTreeMap::new();
        if let Some(ns) = self.ledger.namespace(collection) {
            for (k, v) in ns.iter().filter(|(k, _)| in_range(k, start, end)) {
                view.insert(k.clone(), Some(v.value.clone()));
            }
        }
        for (key, pending) in &self.writes {
            if key.collection.as_deref() == collection && in_range(&key.key, start, end) {
                view.insert(key.key.clone(), pending.clone());
            }
        }

        view.into_iter()
            .filter_map(|(key, value)| value.map(|value| KeyValue { key, value }))
            .collect()
    }

    /// Selector queries are not re-validated at commit.
    fn run_query(&self, collection: Option<&str>, query: &RichQuery) -> Vec<KeyValue> {
        let mut hits: Vec<(serde_json::Value, KeyValue)> = self
            .merged_range(collection, "", "")
            .into_iter()
            .filter_map(|kv| {
                let doc: serde_json::Value = serde_json::from_slice(&kv.value).ok()?;
                query.matches(&doc).then_some((doc, kv))
            })
            .collect();
        hits.sort_by(|(a, _), (b, _)| query.compare(a, b));
        hits.into_iter().map(|(_, kv)| kv).collect()
    }

    fn require_member(&self, collection: &str) -> LedgerResult<()> {
        let Some(c) = self.ledger.collections.get(collection) else {
            return Err(LedgerError::UnknownCollection(collection.to_string()));
        };
        if c.members.contains(&self.creator) {
            Ok(())
        } else {
            Err(LedgerError::AccessDenied {
                org: self.creator.to_string(),
                collection: collection.to_string(),
            })
        }
    }

    fn require_collection(&self, collection: &str) -> LedgerResult<()> {
        if self.ledger.collections.contains_key(collection) {
            Ok(())
        } else {
            Err(LedgerError::UnknownCollection(collection.to_string()))
        }
    }
}

impl Ledger for Invocation<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.read(StateKey::public(key)))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        self.write(StateKey::public(key), Some(value))
    }

    fn del_state(&mut self, key: &str) -> LedgerResult<()> {
        self.write(StateKey::public(key), None)
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> LedgerResult<Cursor<KeyValue>> {
        Ok(Cursor::new(self.range_read(None, start, end), &self.cursors))
    }

    fn get_query_result(&self, query: &RichQuery) -> LedgerResult<Cursor<KeyValue>> {
        Ok(Cursor::new(self.run_query(None, query), &self.cursors))
    }

    fn get_history_for_key(&self, key: &str) -> LedgerResult<Cursor<KeyModification>> {
        let entries = self.ledger.history.get(key).cloned().unwrap_or_default();
        Ok(Cursor::new(entries, &self.cursors))
    }

    fn get_private_data(&self, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        self.require_member(collection)?;
        Ok(self.read(StateKey::private(collection, key)))
    }

    fn get_private_data_hash(
        &self,
        collection: &str,
        key: &str,
    ) -> LedgerResult<Option<[u8; 32]>> {
        self.require_collection(collection)?;
        Ok(self
            .read(StateKey::private(collection, key))
            .map(|value| Sha256::digest(&value).into()))
    }

    fn put_private_data(
        &mut self,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> LedgerResult<()> {
        self.require_collection(collection)?;
        self.write(StateKey::private(collection, key), Some(value))
    }

    fn del_private_data(&mut self, collection: &str, key: &str) -> LedgerResult<()> {
        self.require_collection(collection)?;
        self.write(StateKey::private(collection, key), None)
    }

    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> LedgerResult<Cursor<KeyValue>> {
        self.require_member(collection)?;
        Ok(Cursor::new(
            self.range_read(Some(collection), start, end),
            &self.cursors,
        ))
    }

    fn get_private_data_query_result(
        &self,
        collection: &str,
        query: &RichQuery,
    ) -> LedgerResult<Cursor<KeyValue>> {
        self.require_member(collection)?;
        Ok(Cursor::new(
            self.run_query(Some(collection), query),
            &self.cursors,
        ))
    }

    fn transient(&self) -> &TransientMap {
        &self.transient
    }
}
