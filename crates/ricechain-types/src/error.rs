//! Error types for the RiceChain contract.
//!
//! All errors use the `RC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Existence errors (batches and orders)
//! - 3xx: Input errors (transient data, arguments)
//! - 4xx: Matching / lifecycle errors
//! - 5xx: Decoding errors
//! - 6xx: Store errors
//! - 9xx: Configuration / internal errors

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BatchId, BatchStatus, OrderId};

/// Central error enum for all RiceChain operations.
#[derive(Debug, Error)]
pub enum RiceError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller's organization may not perform this operation.
    #[error("RC_ERR_100: Organization {org} is not authorized to {action}")]
    Unauthorized { org: String, action: String },

    // =================================================================
    // Existence Errors (2xx)
    // =================================================================
    /// A rice batch with this key already exists.
    #[error("RC_ERR_200: The batch {0} already exists")]
    BatchAlreadyExists(BatchId),

    /// The rice batch does not exist in world state.
    #[error("RC_ERR_201: The rice batch {0} does not exist")]
    BatchNotFound(BatchId),

    /// A processing order with this key already exists.
    #[error("RC_ERR_202: Order {0} already exists")]
    OrderAlreadyExists(OrderId),

    /// The processing order does not exist in the restricted collection.
    #[error("RC_ERR_203: Order {0} does not exist")]
    OrderNotFound(OrderId),

    // =================================================================
    // Input Errors (3xx)
    // =================================================================
    /// No transient fields were supplied with the order.
    #[error("RC_ERR_300: Provide transient fields: variety, millerName, quantityInKg")]
    MissingTransientData,

    /// A quantity could not be parsed under the strict policy.
    #[error("RC_ERR_301: Invalid quantity {raw:?} for field {field}")]
    InvalidQuantity { field: String, raw: String },

    /// Malformed operation arguments.
    #[error("RC_ERR_302: Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // =================================================================
    // Matching / Lifecycle Errors (4xx)
    // =================================================================
    /// The order cannot be paired with the batch.
    #[error("RC_ERR_400: Variety or quantity mismatch for order pairing: {reason}")]
    VarietyOrQuantityMismatch { reason: String },

    /// The requested status change would move the batch backwards.
    #[error("RC_ERR_401: Invalid status transition from {from} to {to}")]
    InvalidTransition { from: BatchStatus, to: BatchStatus },

    // =================================================================
    // Decoding Errors (5xx)
    // =================================================================
    /// Stored bytes do not match the expected record shape.
    #[error("RC_ERR_500: Could not decode {key}: {reason}")]
    DecodeFailure { key: String, reason: String },

    // =================================================================
    // Store Errors (6xx)
    // =================================================================
    /// The underlying ledger failed; the message is passed through opaquely.
    #[error("RC_ERR_600: Store unavailable: {0}")]
    StoreUnavailable(String),

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    /// Invalid contract configuration.
    #[error("RC_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization of an outgoing record failed.
    #[error("RC_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of a [`RiceError`], returned to callers as the
/// structured failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Unauthorized,
    AlreadyExists,
    NotFound,
    MissingTransientData,
    InvalidQuantity,
    InvalidArgument,
    VarietyOrQuantityMismatch,
    InvalidTransition,
    DecodeFailure,
    Serialization,
    StoreUnavailable,
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::NotFound => "NOT_FOUND",
            Self::MissingTransientData => "MISSING_TRANSIENT_DATA",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::VarietyOrQuantityMismatch => "VARIETY_OR_QUANTITY_MISMATCH",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::DecodeFailure => "DECODE_FAILURE",
            Self::Serialization => "SERIALIZATION",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::Configuration => "CONFIGURATION",
        };
        f.write_str(name)
    }
}

impl RiceError {
    /// The structured kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::BatchAlreadyExists(_) | Self::OrderAlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::BatchNotFound(_) | Self::OrderNotFound(_) => ErrorKind::NotFound,
            Self::MissingTransientData => ErrorKind::MissingTransientData,
            Self::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::VarietyOrQuantityMismatch { .. } => ErrorKind::VarietyOrQuantityMismatch,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub(crate) fn decode(key: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::DecodeFailure {
            key: key.into(),
            reason: err.to_string(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RiceError>;

impl From<serde_json::Error> for RiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = RiceError::BatchNotFound(BatchId::from("B1"));
        let msg = format!("{err}");
        assert!(msg.starts_with("RC_ERR_201"), "Got: {msg}");
        assert!(msg.contains("B1"));
    }

    #[test]
    fn unauthorized_display_names_org_and_action() {
        let err = RiceError::Unauthorized {
            org: "Org2MSP".into(),
            action: "create a rice batch".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("RC_ERR_100"));
        assert!(msg.contains("Org2MSP"));
        assert!(msg.contains("create a rice batch"));
    }

    #[test]
    fn kinds_collapse_batch_and_order_variants() {
        assert_eq!(
            RiceError::BatchAlreadyExists(BatchId::from("B1")).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            RiceError::OrderAlreadyExists(OrderId::from("O1")).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            RiceError::OrderNotFound(OrderId::from("O1")).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn encoding_failures_are_not_decode_failures() {
        let err: RiceError = serde_json::from_str::<u64>("x").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert_eq!(err.kind().to_string(), "SERIALIZATION");

        let err = RiceError::DecodeFailure {
            key: "B1".into(),
            reason: "eof".into(),
        };
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn transition_error_uses_wire_status() {
        let err = RiceError::InvalidTransition {
            from: BatchStatus::Dispatched {
                retailer: "RetailerCo".into(),
            },
            to: BatchStatus::Assigned {
                miller: "Miller X".into(),
            },
        };
        let msg = format!("{err}");
        assert!(msg.contains("Dispatched to RetailerCo"));
        assert!(msg.contains("Assigned to Miller Miller X"));
    }

    #[test]
    fn all_errors_have_rc_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(RiceError::MissingTransientData),
            Box::new(RiceError::StoreUnavailable("down".into())),
            Box::new(RiceError::Configuration("bad".into())),
            Box::new(RiceError::VarietyOrQuantityMismatch {
                reason: "x".into(),
            }),
            Box::new(RiceError::DecodeFailure {
                key: "B1".into(),
                reason: "eof".into(),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("RC_ERR_"),
                "Error missing RC_ERR_ prefix: {msg}"
            );
        }
    }
}
