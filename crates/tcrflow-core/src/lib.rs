//! Core traits and types for tcrflow transaction workflows.
//!
//! This crate provides the building blocks without a runtime.
//! Chain clients depend on it to implement the collaborator traits.
//!
//! # Core Types
//!
//! - [`Amount`] - Exact, non-negative token quantity
//! - [`resolve`] - Decides whether an allowance needs a top-up
//! - [`Step`] - An asynchronous action plus [`StepMeta`]
//! - [`TransactionWatcher`] - Suspends until a transaction settles
//! - [`FlowError`] - Error types for building and running workflows
//!
//! # Collaborators
//!
//! - [`Tcr`], [`Account`], [`Registry`], [`Listing`], [`Voting`], [`Poll`],
//!   [`Challenge`], [`Parameterizer`], [`Proposal`], [`Ledger`]

mod amount;
mod chain;
mod error;
mod step;
mod transaction;

pub use alloy_primitives::{Address, TxHash, U256};
pub use amount::{resolve, resolve_decimal, AllowanceState, Amount, Resolution};
pub use chain::{
    Account, AllowancePool, ApprovedAmounts, Challenge, Ledger, Listing, Parameterizer, Poll,
    Proposal, Registry, Tcr, Voting,
};
pub use error::{ChainError, FailureCause, FlowError};
pub use step::{Step, StepKind, StepMeta, StepOutput};
pub use transaction::{Receipt, TransactionHandle, TransactionWatcher, TxStatus};
