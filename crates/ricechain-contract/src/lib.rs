//! # ricechain-contract
//!
//! **The RiceChain supply-chain contract.**
//!
//! Farmers register rice batches in public world state, millers place
//! processing orders in a restricted collection, a matching step pairs an
//! order with a compatible batch, and retailers take dispatch.
//!
//! ```text
//! caller ─► IdentityGuard ─► AssetLifecycle / MatchingEngine / QueryService
//!                                   │                 │
//!                               BatchStore        OrderStore
//!                                   └──── Ledger ─────┘
//! ```
//!
//! Every operation runs inside one host invocation: the writes it issues
//! are committed together or not at all.

pub mod batch_store;
pub mod contract;
pub mod guard;
pub mod lifecycle;
pub mod matching;
pub mod order_store;
pub mod query;
pub mod router;

#[cfg(test)]
mod testing;

pub use batch_store::BatchStore;
pub use contract::RiceContract;
pub use guard::IdentityGuard;
pub use lifecycle::AssetLifecycle;
pub use matching::MatchingEngine;
pub use order_store::OrderStore;
pub use query::QueryService;
pub use router::Operation;
