//! Step trait and related types.

use crate::amount::Amount;
use crate::chain::AllowancePool;
use crate::error::FlowError;
use crate::transaction::Receipt;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::{self, Debug};

/// What a step does, in a form the UI layer can localize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// Approve a spender to transfer more tokens.
    Approve {
        /// The allowance pool being topped up.
        pool: AllowancePool,
        /// Exact additional allowance.
        amount: Amount,
    },
    /// Convert approved tokens into voting rights.
    RequestVotingRights {
        /// Voting rights to acquire.
        amount: Amount,
    },
    /// Apply a new listing to the registry.
    ApplyListing,
    /// Challenge an existing listing.
    ChallengeListing,
    /// Commit a sealed vote.
    CommitVote {
        /// Tokens staked on the vote.
        stake: Amount,
    },
    /// Reveal a previously committed vote.
    RevealVote,
    /// Refresh a listing's on-chain status.
    RefreshStatus,
    /// Process a parameter-change proposal.
    ProcessProposal,
    /// Claim a challenge reward.
    ClaimReward,
    /// Propose a new parameter value.
    ProposeParameter,
    /// Challenge a parameter-change proposal.
    ChallengeProposal,
    /// Add stake to a listing.
    Deposit {
        /// Tokens deposited.
        amount: Amount,
    },
    /// Remove unlocked stake from a listing.
    Withdraw {
        /// Tokens withdrawn.
        amount: Amount,
    },
    /// Remove a listing from the registry.
    ExitListing,
    /// Any other caller-supplied action.
    Custom,
}

/// Descriptive metadata for progress reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepMeta {
    /// Machine-readable description.
    pub kind: StepKind,
    /// Short heading.
    pub label: String,
    /// Longer explanation.
    pub content: String,
}

impl StepMeta {
    /// Creates step metadata.
    pub fn new(kind: StepKind, label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            content: content.into(),
        }
    }

    /// Metadata for a [`StepKind::Custom`] step.
    pub fn custom(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(StepKind::Custom, label, content)
    }
}

impl fmt::Display for StepMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Output from a settled step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    /// The step's transaction was confirmed.
    Settled(Receipt),
    /// The step finished without producing a transaction.
    Complete,
    /// A best-effort step failed and its failure was logged instead of
    /// stopping the queue.
    Skipped {
        /// The swallowed error, rendered.
        reason: String,
    },
}

impl StepOutput {
    /// Creates a Settled output.
    pub fn settled(receipt: Receipt) -> Self {
        Self::Settled(receipt)
    }

    /// Creates a Complete output.
    pub fn done() -> Self {
        Self::Complete
    }

    /// Returns the receipt of a settled step.
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            StepOutput::Settled(receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// A unit of work in a step queue.
///
/// A step is an asynchronous action plus its [`StepMeta`]. It holds no
/// queue logic; ordering belongs to the queue that owns it. A step that
/// submits a transaction must watch it to confirmation before returning.
///
/// # Examples
///
/// ```
/// use tcrflow_core::{FlowError, Step, StepMeta, StepOutput};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct Noop {
///     meta: StepMeta,
/// }
///
/// #[async_trait]
/// impl Step for Noop {
///     async fn execute(&self) -> Result<StepOutput, FlowError> {
///         Ok(StepOutput::done())
///     }
///
///     fn meta(&self) -> &StepMeta {
///         &self.meta
///     }
/// }
/// ```
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// Executes the step logic.
    ///
    /// # Returns
    ///
    /// - `Ok(StepOutput::Settled(receipt))` - the step's transaction was confirmed
    /// - `Ok(StepOutput::Complete)` - nothing to confirm
    /// - `Err(error)` - step failed; the queue stops
    async fn execute(&self) -> Result<StepOutput, FlowError>;

    /// Returns the step metadata.
    fn meta(&self) -> &StepMeta;
}
