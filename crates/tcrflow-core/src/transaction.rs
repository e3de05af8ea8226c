//! Submitted transactions and the watcher contract.

use crate::error::{FailureCause, FlowError};
use alloy_primitives::TxHash;
use async_trait::async_trait;
use std::fmt;

/// Reference to a submitted, not yet settled transaction.
///
/// Returned by every chain write and consumed exactly once by a
/// [`TransactionWatcher`]. Deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct TransactionHandle {
    tx_hash: TxHash,
}

impl TransactionHandle {
    /// Wraps the hash of a submitted transaction.
    pub fn new(tx_hash: TxHash) -> Self {
        Self { tx_hash }
    }

    /// Returns the transaction hash.
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }
}

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tx_hash)
    }
}

/// Confirmation of a settled transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the confirmed transaction.
    pub tx_hash: TxHash,
    /// Block that included it.
    pub block_number: u64,
    /// Blocks observed on top of (and including) the inclusion block.
    pub confirmations: u64,
}

/// Status of a transaction as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Known to the node but not yet included.
    Pending,
    /// Included successfully in the given block.
    Mined {
        /// Inclusion block.
        block_number: u64,
    },
    /// Settled unsuccessfully.
    Failed(FailureCause),
}

/// Turns a fired transaction into a settled one.
///
/// Implementations suspend until the ledger reports the transaction as
/// confirmed or failed. They never resubmit.
#[async_trait]
pub trait TransactionWatcher: Send + Sync {
    /// Waits for `handle` to settle.
    ///
    /// # Errors
    ///
    /// - [`FlowError::TransactionFailed`] if the transaction reverted, was
    ///   dropped or was replaced
    /// - [`FlowError::WatchTimeout`] if a bounded watcher ran out of time
    async fn watch(&self, handle: TransactionHandle) -> Result<Receipt, FlowError>;
}
