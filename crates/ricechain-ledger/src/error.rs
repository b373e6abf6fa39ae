//! Host ledger errors.
//!
//! The contract cannot tell a retryable MVCC conflict from any other store
//! failure without host-specific signalling, so every variant except
//! [`LedgerError::AccessDenied`] surfaces as `StoreUnavailable`.

use ricechain_types::RiceError;
use thiserror::Error;

/// Failures reported by the host ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The caller's organization is not a member of the collection.
    #[error("organization {org} is not a member of collection {collection}")]
    AccessDenied { org: String, collection: String },

    /// No collection with this name is configured.
    #[error("collection {0} is not defined")]
    UnknownCollection(String),

    /// Keys must be non-empty.
    #[error("empty key")]
    EmptyKey,

    /// Values must be non-empty; use a delete instead.
    #[error("empty value for key {0}")]
    EmptyValue(String),

    /// A key read by the invocation was changed by a concurrent commit.
    #[error("MVCC read conflict on key {key}")]
    MvccConflict { key: String },

    /// The transaction id was already committed.
    #[error("duplicate transaction id {0}")]
    DuplicateTxId(String),

    /// The invocation finished with query cursors still open.
    #[error("{0} query cursor(s) left open")]
    CursorLeak(usize),

    /// A range read by the invocation gained or lost keys, or one of its
    /// keys changed, before commit.
    #[error("phantom read in range [{start}, {end})")]
    PhantomRead { start: String, end: String },

    /// The caller identity could not be established.
    #[error("caller identity unavailable: {0}")]
    Identity(String),

    /// The host is unreachable or failed internally.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Crate-wide `Result` alias.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl From<LedgerError> for RiceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccessDenied { org, collection } => Self::Unauthorized {
                org,
                action: format!("read collection {collection}"),
            },
            LedgerError::Identity(reason) => Self::Unauthorized {
                org: "<unknown>".to_string(),
                action: format!("invoke the contract ({reason})"),
            },
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}
