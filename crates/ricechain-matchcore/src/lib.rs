//! # ricechain-matchcore
//!
//! **Pure pairing rules for RiceChain.**
//!
//! MatchCore decides whether a processing order may be fulfilled by a rice
//! batch and computes the batch as it looks after the pairing. It has:
//!
//! - **Zero side effects**: no ledger access, no identity checks
//! - **No mutation on refusal**: a rejected pairing leaves both inputs as
//!   they were
//! - **Forward-only status**: a dispatched batch is never re-assigned

pub mod eligibility;
pub mod pairing;

pub use eligibility::{Eligibility, check_eligibility};
pub use pairing::{Pairing, pair};
