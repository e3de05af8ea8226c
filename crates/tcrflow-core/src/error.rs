//! Workflow error types.

use alloy_primitives::TxHash;
use std::time::Duration;
use thiserror::Error;

/// Why a submitted transaction did not settle successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// Mined, but execution reverted.
    Reverted(String),
    /// Evicted from the mempool without being mined.
    Dropped,
    /// Superseded by another transaction with the same nonce.
    Replaced(TxHash),
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Reverted(reason) => write!(f, "reverted: {}", reason),
            FailureCause::Dropped => write!(f, "dropped"),
            FailureCause::Replaced(by) => write!(f, "replaced by {}", by),
        }
    }
}

/// Errors raised by chain collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChainError {
    /// The node or contract binding could not be reached.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The account or node refused to submit the transaction.
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// No entity with the given identifier exists.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `listing`.
        kind: &'static str,
        /// The identifier that was looked up.
        id: String,
    },
}

/// Errors that can occur while building or running a workflow.
///
/// Marked `#[non_exhaustive]`; include a wildcard arm when matching.
///
/// ```
/// use tcrflow_core::FlowError;
///
/// fn describe(error: &FlowError) -> String {
///     match error {
///         FlowError::StepFailed { index, label, source } => {
///             format!("step {} ({}) failed: {}", index, label, source)
///         }
///         FlowError::InvalidAmount { input, .. } => format!("bad amount {:?}", input),
///         other => other.to_string(),
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FlowError {
    /// A user-supplied amount was malformed or negative.
    #[error("Invalid amount {input:?}: {reason}")]
    InvalidAmount {
        /// The raw input.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Current allowance or voting rights could not be read.
    #[error("Allowance query failed: {0}")]
    AllowanceQueryFailed(#[source] ChainError),

    /// A submitted transaction reverted, was dropped or was replaced.
    #[error("Transaction {tx_hash} failed: {cause}")]
    TransactionFailed {
        /// Hash of the failed transaction.
        tx_hash: TxHash,
        /// Underlying cause.
        cause: FailureCause,
    },

    /// A transaction did not settle before the watch deadline.
    #[error("Transaction {tx_hash} not settled after {waited:?}")]
    WatchTimeout {
        /// Hash of the watched transaction.
        tx_hash: TxHash,
        /// How long the watcher waited.
        waited: Duration,
    },

    /// A queued step failed; wraps the step's own error.
    #[error("Step {index} ({label}) failed: {source}")]
    StepFailed {
        /// Zero-based position of the step in its queue.
        index: usize,
        /// The step's label.
        label: String,
        /// The error the step returned.
        #[source]
        source: Box<FlowError>,
    },

    /// A chain collaborator call failed.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Configuration is missing or invalid.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl FlowError {
    /// Shorthand for [`FlowError::InvalidAmount`].
    pub fn invalid_amount(input: impl Into<String>, reason: &'static str) -> Self {
        FlowError::InvalidAmount {
            input: input.into(),
            reason,
        }
    }

    /// Returns the innermost error, looking through [`FlowError::StepFailed`].
    pub fn root_cause(&self) -> &FlowError {
        match self {
            FlowError::StepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the failing step's index if this is a [`FlowError::StepFailed`].
    pub fn step_index(&self) -> Option<usize> {
        match self {
            FlowError::StepFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}
