//! # ricechain-ledger
//!
//! **Host ledger interface** consumed by the RiceChain contract, plus an
//! in-memory reference host.
//!
//! The contract never talks to a concrete ledger. Every operation receives
//! two capability objects:
//!
//! - a [`ClientIdentity`] yielding the verified organization of the caller
//! - a [`Ledger`] scoped to one invocation: world state, restricted
//!   collections, per-key history, selector queries and the transient map
//!
//! [`MemoryLedger`] implements the host side faithfully enough to run the
//! contract end to end:
//!
//! ```text
//! begin(caller, transient) -> Invocation --(reads/writes)--> ReadWriteSet
//!     -> commit: MVCC read-set and range validation -> atomic apply + history
//! ```
//!
//! Query results come back as scoped [`Cursor`]s. An invocation that ends
//! with a cursor still open is rejected.

pub mod cursor;
pub mod error;
pub mod memory;
pub mod query;
pub mod stub;

pub use cursor::{Cursor, CursorTracker};
pub use error::{LedgerError, LedgerResult};
pub use memory::{CommitReceipt, Invocation, MemoryLedger, ReadWriteSet};
pub use query::{RichQuery, SortOrder};
pub use stub::{ClientIdentity, KeyModification, KeyValue, Ledger, OrgIdentity, TransientMap};
