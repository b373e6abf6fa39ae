//! # ricechain-types
//!
//! Shared types, errors, and configuration for the **RiceChain** contract.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`BatchId`], [`OrderId`], [`OrgId`]
//! - **Batch model**: [`RiceBatch`], [`BatchStatus`], [`NewBatch`]
//! - **Order model**: [`ProcessingOrder`]
//! - **History model**: [`HistoryRecord`]
//! - **Roles**: [`Role`]
//! - **Configuration**: [`ContractConfig`], [`QuantityPolicy`]
//! - **Errors**: [`RiceError`] with `RC_ERR_` prefix codes, [`ErrorKind`]
//! - **Constants**: asset type tags, collection name, transient field names

pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod ids;
pub mod order;
pub mod role;

pub use batch::*;
pub use config::*;
pub use error::*;
pub use history::*;
pub use ids::*;
pub use order::*;
pub use role::*;

// Constants are accessed via `ricechain_types::constants::FOO`
// (not re-exported to avoid name collisions).
