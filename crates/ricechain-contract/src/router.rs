//! Name-based operation router.
//!
//! Hosts that dispatch by function name call [`RiceContract::invoke`] with
//! string arguments and get the JSON-encoded result back. Messages encode
//! as JSON strings, existence checks as booleans, records as objects and
//! lists as arrays.

use std::fmt;
use std::str::FromStr;

use ricechain_ledger::{ClientIdentity, Ledger};
use ricechain_types::{BatchId, NewBatch, OrderId, Result, RiceError};
use serde::Serialize;

use crate::RiceContract;

/// Every operation the contract exposes by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateRiceBatch,
    ReadRiceBatch,
    DeleteRiceBatch,
    RiceBatchExists,
    GetAllRiceBatches,
    GetRiceBatchHistory,
    GetRiceBatchByRange,
    DispatchToRetailer,
    CreateProcessingOrder,
    ReadProcessingOrder,
    ProcessingOrderExists,
    MatchProcessingOrder,
    GetMatchingOrders,
    GetAllProcessingOrders,
    GetProcessingOrdersByRange,
}

impl Operation {
    pub const ALL: [Self; 15] = [
        Self::CreateRiceBatch,
        Self::ReadRiceBatch,
        Self::DeleteRiceBatch,
        Self::RiceBatchExists,
        Self::GetAllRiceBatches,
        Self::GetRiceBatchHistory,
        Self::GetRiceBatchByRange,
        Self::DispatchToRetailer,
        Self::CreateProcessingOrder,
        Self::ReadProcessingOrder,
        Self::ProcessingOrderExists,
        Self::MatchProcessingOrder,
        Self::GetMatchingOrders,
        Self::GetAllProcessingOrders,
        Self::GetProcessingOrdersByRange,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateRiceBatch => "CreateRiceBatch",
            Self::ReadRiceBatch => "ReadRiceBatch",
            Self::DeleteRiceBatch => "DeleteRiceBatch",
            Self::RiceBatchExists => "RiceBatchExists",
            Self::GetAllRiceBatches => "GetAllRiceBatches",
            Self::GetRiceBatchHistory => "GetRiceBatchHistory",
            Self::GetRiceBatchByRange => "GetRiceBatchByRange",
            Self::DispatchToRetailer => "DispatchToRetailer",
            Self::CreateProcessingOrder => "CreateProcessingOrder",
            Self::ReadProcessingOrder => "ReadProcessingOrder",
            Self::ProcessingOrderExists => "ProcessingOrderExists",
            Self::MatchProcessingOrder => "MatchProcessingOrder",
            Self::GetMatchingOrders => "GetMatchingOrders",
            Self::GetAllProcessingOrders => "GetAllProcessingOrders",
            Self::GetProcessingOrdersByRange => "GetProcessingOrdersByRange",
        }
    }

    /// Number of string arguments the operation takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::GetAllRiceBatches | Self::GetAllProcessingOrders => 0,
            Self::ReadRiceBatch
            | Self::DeleteRiceBatch
            | Self::RiceBatchExists
            | Self::GetRiceBatchHistory
            | Self::CreateProcessingOrder
            | Self::ReadProcessingOrder
            | Self::ProcessingOrderExists
            | Self::GetMatchingOrders => 1,
            Self::GetRiceBatchByRange
            | Self::DispatchToRetailer
            | Self::MatchProcessingOrder
            | Self::GetProcessingOrdersByRange => 2,
            Self::CreateRiceBatch => 5,
        }
    }

    /// Whether the operation may write to the ledger.
    #[must_use]
    pub fn is_submit(self) -> bool {
        matches!(
            self,
            Self::CreateRiceBatch
                | Self::DeleteRiceBatch
                | Self::DispatchToRetailer
                | Self::CreateProcessingOrder
                | Self::MatchProcessingOrder
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = RiceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| RiceError::InvalidArgument {
                reason: format!("unknown function {s}"),
            })
    }
}

impl RiceContract {
    /// Run the operation named `function` and JSON-encode its result.
    ///
    /// # Errors
    /// `InvalidArgument` for an unknown function, a wrong argument count or
    /// a quantity that is not a non-negative integer; otherwise whatever
    /// the operation returns.
    pub fn invoke(
        &self,
        caller: &dyn ClientIdentity,
        ledger: &mut dyn Ledger,
        function: &str,
        args: &[&str],
    ) -> Result<Vec<u8>> {
        let op = resolve(function, args)?;
        tracing::debug!(function = %op, tx_id = ledger.tx_id(), "Invoking");

        match op {
            Operation::CreateRiceBatch => {
                let quantity = args[3]
                    .parse::<u64>()
                    .map_err(|_| RiceError::InvalidArgument {
                        reason: format!(
                            "quantityInKg must be a non-negative integer, got {:?}",
                            args[3]
                        ),
                    })?;
                let new = NewBatch::new(args[0], args[1], args[2], quantity, args[4]);
                encode(&self.create_rice_batch(caller, ledger, new)?)
            }
            Operation::DeleteRiceBatch => {
                encode(&self.delete_rice_batch(caller, ledger, &BatchId::from(args[0]))?)
            }
            Operation::DispatchToRetailer => encode(&self.dispatch_to_retailer(
                caller,
                ledger,
                &BatchId::from(args[0]),
                args[1],
            )?),
            Operation::CreateProcessingOrder => {
                encode(&self.create_processing_order(caller, ledger, &OrderId::from(args[0]))?)
            }
            Operation::MatchProcessingOrder => encode(&self.match_processing_order(
                ledger,
                &BatchId::from(args[0]),
                &OrderId::from(args[1]),
            )?),
            read => self.read(read, ledger, args),
        }
    }

    /// Run a read-only operation by name.
    ///
    /// # Errors
    /// As [`invoke`](Self::invoke); naming a mutating operation is
    /// `InvalidArgument`.
    pub fn query(&self, ledger: &dyn Ledger, function: &str, args: &[&str]) -> Result<Vec<u8>> {
        let op = resolve(function, args)?;
        if op.is_submit() {
            return Err(RiceError::InvalidArgument {
                reason: format!("{op} modifies the ledger and must be submitted"),
            });
        }
        tracing::debug!(function = %op, tx_id = ledger.tx_id(), "Querying");
        self.read(op, ledger, args)
    }

    fn read(&self, op: Operation, ledger: &dyn Ledger, args: &[&str]) -> Result<Vec<u8>> {
        match op {
            Operation::ReadRiceBatch => {
                encode(&self.read_rice_batch(ledger, &BatchId::from(args[0]))?)
            }
            Operation::RiceBatchExists => {
                encode(&self.rice_batch_exists(ledger, &BatchId::from(args[0]))?)
            }
            Operation::GetAllRiceBatches => encode(&self.get_all_rice_batches(ledger)?),
            Operation::GetRiceBatchHistory => {
                encode(&self.get_rice_batch_history(ledger, &BatchId::from(args[0]))?)
            }
            Operation::GetRiceBatchByRange => {
                encode(&self.get_rice_batch_by_range(ledger, args[0], args[1])?)
            }
            Operation::ReadProcessingOrder => {
                encode(&self.read_processing_order(ledger, &OrderId::from(args[0]))?)
            }
            Operation::ProcessingOrderExists => {
                encode(&self.processing_order_exists(ledger, &OrderId::from(args[0]))?)
            }
            Operation::GetMatchingOrders => {
                encode(&self.get_matching_orders(ledger, &BatchId::from(args[0]))?)
            }
            Operation::GetAllProcessingOrders => encode(&self.get_all_processing_orders(ledger)?),
            Operation::GetProcessingOrdersByRange => {
                encode(&self.get_processing_orders_by_range(ledger, args[0], args[1])?)
            }
            submit => Err(RiceError::InvalidArgument {
                reason: format!("{submit} is not a read operation"),
            }),
        }
    }
}

fn resolve(function: &str, args: &[&str]) -> Result<Operation> {
    let op: Operation = function.parse()?;
    if args.len() != op.arity() {
        return Err(RiceError::InvalidArgument {
            reason: format!("{op} takes {} argument(s), got {}", op.arity(), args.len()),
        });
    }
    Ok(op)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}
