//! Chain collaborator capabilities.
//!
//! These traits are implemented by the blockchain client (contract
//! bindings, account management). Every write returns a
//! [`TransactionHandle`] that the caller must hand to a
//! [`TransactionWatcher`](crate::TransactionWatcher).

use crate::amount::Amount;
use crate::error::ChainError;
use crate::transaction::{TransactionHandle, TxStatus};
use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// An independent token allowance, one per spending contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowancePool {
    /// Allowance of the registry contract.
    Registry,
    /// Allowance of the PLCR voting contract.
    Voting,
    /// Allowance of the parameterizer contract.
    Parameterizer,
}

impl AllowancePool {
    /// All pools, in a fixed order.
    pub const ALL: [AllowancePool; 3] = [
        AllowancePool::Registry,
        AllowancePool::Voting,
        AllowancePool::Parameterizer,
    ];
}

impl fmt::Display for AllowancePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowancePool::Registry => write!(f, "Registry"),
            AllowancePool::Voting => write!(f, "PLCR"),
            AllowancePool::Parameterizer => write!(f, "Parameterizer"),
        }
    }
}

/// Currently approved allowance for each pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApprovedAmounts {
    /// Approved for the registry.
    pub registry: Amount,
    /// Approved for PLCR voting.
    pub voting: Amount,
    /// Approved for the parameterizer.
    pub parameterizer: Amount,
}

impl ApprovedAmounts {
    /// Returns the approved amount for `pool`.
    pub fn get(&self, pool: AllowancePool) -> Amount {
        match pool {
            AllowancePool::Registry => self.registry,
            AllowancePool::Voting => self.voting,
            AllowancePool::Parameterizer => self.parameterizer,
        }
    }
}

/// The authenticated account acting on the user's behalf.
#[async_trait]
pub trait Account: Send + Sync {
    /// The account address.
    fn address(&self) -> Address;

    /// Allows `spender` to transfer `amount` more tokens.
    async fn approve_tokens(
        &self,
        spender: Address,
        amount: Amount,
    ) -> Result<TransactionHandle, ChainError>;
}

/// Entry point to the registry and its satellite contracts.
#[async_trait]
pub trait Tcr: Send + Sync {
    /// The account used for writes.
    async fn default_account(&self) -> Result<Arc<dyn Account>, ChainError>;

    /// The registry contract.
    fn registry(&self) -> Arc<dyn Registry>;

    /// The PLCR voting contract.
    async fn voting(&self) -> Result<Arc<dyn Voting>, ChainError>;

    /// The parameterizer contract.
    async fn parameterizer(&self) -> Result<Arc<dyn Parameterizer>, ChainError>;

    /// Allowances the default account has granted to each pool.
    async fn approved_amounts(&self) -> Result<ApprovedAmounts, ChainError>;

    /// Voting rights the default account currently holds.
    async fn voting_rights(&self) -> Result<Amount, ChainError>;
}

/// The registry contract.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Contract address, the spender for registry allowance.
    fn address(&self) -> Address;

    /// Looks up a listing by name.
    async fn get_listing(&self, name: &str) -> Result<Arc<dyn Listing>, ChainError>;

    /// Looks up a challenge by id.
    async fn get_challenge(&self, id: u64) -> Result<Arc<dyn Challenge>, ChainError>;

    /// Applies a new listing with `amount` staked.
    async fn create_listing(
        &self,
        listing_hash: &str,
        amount: Amount,
        data: &str,
    ) -> Result<TransactionHandle, ChainError>;
}

/// A listing under curation.
#[async_trait]
pub trait Listing: Send + Sync {
    /// Listing name.
    fn name(&self) -> &str;

    /// Raises a challenge against this listing.
    async fn challenge(&self) -> Result<TransactionHandle, ChainError>;

    /// Adds stake.
    async fn deposit(&self, amount: Amount) -> Result<TransactionHandle, ChainError>;

    /// Removes unlocked stake.
    async fn withdraw(&self, amount: Amount) -> Result<TransactionHandle, ChainError>;

    /// Exits the registry.
    async fn remove(&self) -> Result<TransactionHandle, ChainError>;

    /// Resolves pending application or challenge state.
    async fn update_status(&self) -> Result<TransactionHandle, ChainError>;
}

/// The PLCR voting contract.
#[async_trait]
pub trait Voting: Send + Sync {
    /// Contract address, the spender for voting allowance.
    fn address(&self) -> Address;

    /// Looks up a poll by id.
    async fn get_poll(&self, id: u64) -> Result<Arc<dyn Poll>, ChainError>;

    /// Converts `amount` approved tokens into voting rights.
    async fn request_voting_rights(&self, amount: Amount)
        -> Result<TransactionHandle, ChainError>;
}

/// A poll deciding a challenge.
#[async_trait]
pub trait Poll: Send + Sync {
    /// Commits a sealed vote backed by `stake` voting rights.
    async fn commit_vote(
        &self,
        secret_hash: &str,
        stake: Amount,
    ) -> Result<TransactionHandle, ChainError>;

    /// Reveals a committed vote.
    async fn reveal_vote(&self, option: u64, salt: &str)
        -> Result<TransactionHandle, ChainError>;
}

/// A resolved or pending challenge.
#[async_trait]
pub trait Challenge: Send + Sync {
    /// Claims the voter reward for this challenge.
    async fn claim_reward(&self, salt: &str) -> Result<TransactionHandle, ChainError>;
}

/// The parameterizer contract.
#[async_trait]
pub trait Parameterizer: Send + Sync {
    /// Contract address, the spender for parameterizer allowance.
    fn address(&self) -> Address;

    /// Reads a parameter value, e.g. `pMinDeposit`.
    async fn get(&self, name: &str) -> Result<Amount, ChainError>;

    /// Looks up a proposal.
    async fn get_proposal(
        &self,
        contract_name: &str,
        proposal_id: &str,
    ) -> Result<Arc<dyn Proposal>, ChainError>;

    /// Proposes a new value for a parameter.
    async fn create_proposal(
        &self,
        name: &str,
        value: Amount,
    ) -> Result<TransactionHandle, ChainError>;
}

/// A parameter-change proposal.
#[async_trait]
pub trait Proposal: Send + Sync {
    /// Applies or rejects the proposal once its period is over.
    async fn process(&self) -> Result<TransactionHandle, ChainError>;

    /// Challenges the proposal.
    async fn challenge(&self) -> Result<TransactionHandle, ChainError>;
}

/// Read access to transaction status, used by polling watchers.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current status of a transaction.
    async fn transaction_status(&self, tx_hash: TxHash) -> Result<TxStatus, ChainError>;

    /// Current chain head.
    async fn block_number(&self) -> Result<u64, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approved_amounts_by_pool() {
        let approved = ApprovedAmounts {
            registry: Amount::from(1),
            voting: Amount::from(2),
            parameterizer: Amount::from(3),
        };
        let values: Vec<_> = AllowancePool::ALL
            .iter()
            .map(|pool| approved.get(*pool))
            .collect();
        assert_eq!(values, vec![Amount::from(1), Amount::from(2), Amount::from(3)]);
    }

    #[test]
    fn test_pool_display() {
        assert_eq!(AllowancePool::Registry.to_string(), "Registry");
        assert_eq!(AllowancePool::Voting.to_string(), "PLCR");
        assert_eq!(AllowancePool::Parameterizer.to_string(), "Parameterizer");
    }
}
