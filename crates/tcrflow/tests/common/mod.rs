//! In-memory chain used by the integration tests.
//!
//! Every write is appended to a shared journal as `action:arg...`; every
//! watched transaction is appended as `watch:action`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tcrflow::{
    Account, Address, AllowancePool, Amount, ApprovedAmounts, ChainError, Challenge,
    FailureCause, FlowError, Listing, Parameterizer, Poll, Proposal, Receipt, Registry, Tcr,
    TransactionHandle, TransactionWatcher, TxHash, Voting,
};

pub const REGISTRY: Address = Address::repeat_byte(0x01);
pub const VOTING: Address = Address::repeat_byte(0x02);
pub const PARAMETERIZER: Address = Address::repeat_byte(0x03);

#[derive(Default)]
struct State {
    journal: Vec<String>,
    approved: ApprovedAmounts,
    voting_rights: Amount,
    min_deposit: Amount,
    next_tx: u64,
    submitted: HashMap<TxHash, &'static str>,
    reject: HashSet<&'static str>,
    revert: HashSet<&'static str>,
    fail_allowance_query: bool,
    gates: HashMap<&'static str, Arc<Notify>>,
}

/// Shared mock chain state.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<State>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_approved(&self, pool: AllowancePool, amount: u64) {
        let mut state = self.state.lock().unwrap();
        match pool {
            AllowancePool::Registry => state.approved.registry = Amount::from(amount),
            AllowancePool::Voting => state.approved.voting = Amount::from(amount),
            AllowancePool::Parameterizer => state.approved.parameterizer = Amount::from(amount),
        }
    }

    pub fn set_voting_rights(&self, amount: u64) {
        self.state.lock().unwrap().voting_rights = Amount::from(amount);
    }

    pub fn set_min_deposit(&self, amount: u64) {
        self.state.lock().unwrap().min_deposit = Amount::from(amount);
    }

    /// Makes submissions of `action` fail before a transaction exists.
    pub fn reject(&self, action: &'static str) {
        self.state.lock().unwrap().reject.insert(action);
    }

    /// Makes transactions of `action` revert when watched.
    pub fn revert(&self, action: &'static str) {
        self.state.lock().unwrap().revert.insert(action);
    }

    /// Makes watching `action` wait until the returned gate is notified.
    pub fn gate(&self, action: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(action, Arc::clone(&gate));
        gate
    }

    pub fn fail_allowance_query(&self) {
        self.state.lock().unwrap().fail_allowance_query = true;
    }

    pub fn journal(&self) -> Vec<String> {
        self.state.lock().unwrap().journal.clone()
    }

    pub fn tcr(&self) -> Arc<dyn Tcr> {
        Arc::new(self.clone())
    }

    pub fn watcher(&self) -> Arc<dyn TransactionWatcher> {
        Arc::new(MockWatcher {
            chain: self.clone(),
        })
    }

    fn record(&self, entry: String) {
        self.state.lock().unwrap().journal.push(entry);
    }

    fn submit(&self, action: &'static str, args: &[String]) -> Result<TransactionHandle, ChainError> {
        let mut state = self.state.lock().unwrap();
        let mut entry = action.to_string();
        for arg in args {
            entry.push(':');
            entry.push_str(arg);
        }
        state.journal.push(entry);
        if state.reject.contains(action) {
            return Err(ChainError::Rejected(format!("{} denied", action)));
        }
        state.next_tx += 1;
        let tx_hash = TxHash::left_padding_from(&state.next_tx.to_be_bytes());
        state.submitted.insert(tx_hash, action);
        Ok(TransactionHandle::new(tx_hash))
    }

    fn pool_for(spender: Address) -> AllowancePool {
        if spender == VOTING {
            AllowancePool::Voting
        } else if spender == PARAMETERIZER {
            AllowancePool::Parameterizer
        } else {
            AllowancePool::Registry
        }
    }
}

struct MockWatcher {
    chain: MockChain,
}

#[async_trait]
impl TransactionWatcher for MockWatcher {
    async fn watch(&self, handle: TransactionHandle) -> Result<Receipt, FlowError> {
        let tx_hash = handle.tx_hash();
        let (action, reverts, gate) = {
            let state = self.chain.state.lock().unwrap();
            let action = state.submitted.get(&tx_hash).copied().unwrap_or("unknown");
            (
                action,
                state.revert.contains(action),
                state.gates.get(action).cloned(),
            )
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.chain.record(format!("watch:{}", action));
        if reverts {
            return Err(FlowError::TransactionFailed {
                tx_hash,
                cause: FailureCause::Reverted(format!("{} reverted", action)),
            });
        }
        Ok(Receipt {
            tx_hash,
            block_number: 100,
            confirmations: 1,
        })
    }
}

#[async_trait]
impl Tcr for MockChain {
    async fn default_account(&self) -> Result<Arc<dyn Account>, ChainError> {
        Ok(Arc::new(MockAccount {
            chain: self.clone(),
        }))
    }

    fn registry(&self) -> Arc<dyn Registry> {
        Arc::new(MockRegistry {
            chain: self.clone(),
        })
    }

    async fn voting(&self) -> Result<Arc<dyn Voting>, ChainError> {
        Ok(Arc::new(MockVoting {
            chain: self.clone(),
        }))
    }

    async fn parameterizer(&self) -> Result<Arc<dyn Parameterizer>, ChainError> {
        Ok(Arc::new(MockParameterizer {
            chain: self.clone(),
        }))
    }

    async fn approved_amounts(&self) -> Result<ApprovedAmounts, ChainError> {
        let state = self.state.lock().unwrap();
        if state.fail_allowance_query {
            return Err(ChainError::Rpc("allowance unavailable".to_string()));
        }
        Ok(state.approved)
    }

    async fn voting_rights(&self) -> Result<Amount, ChainError> {
        Ok(self.state.lock().unwrap().voting_rights)
    }
}

struct MockAccount {
    chain: MockChain,
}

#[async_trait]
impl Account for MockAccount {
    fn address(&self) -> Address {
        Address::repeat_byte(0xaa)
    }

    async fn approve_tokens(
        &self,
        spender: Address,
        amount: Amount,
    ) -> Result<TransactionHandle, ChainError> {
        let pool = MockChain::pool_for(spender);
        self.chain
            .submit("approve", &[pool.to_string(), amount.to_string()])
    }
}

struct MockRegistry {
    chain: MockChain,
}

#[async_trait]
impl Registry for MockRegistry {
    fn address(&self) -> Address {
        REGISTRY
    }

    async fn get_listing(&self, name: &str) -> Result<Arc<dyn Listing>, ChainError> {
        if name == "missing" {
            return Err(ChainError::NotFound {
                kind: "listing",
                id: name.to_string(),
            });
        }
        Ok(Arc::new(MockListing {
            chain: self.chain.clone(),
            name: name.to_string(),
        }))
    }

    async fn get_challenge(&self, id: u64) -> Result<Arc<dyn Challenge>, ChainError> {
        Ok(Arc::new(MockChallenge {
            chain: self.chain.clone(),
            id,
        }))
    }

    async fn create_listing(
        &self,
        listing_hash: &str,
        amount: Amount,
        data: &str,
    ) -> Result<TransactionHandle, ChainError> {
        self.chain.submit(
            "create_listing",
            &[listing_hash.to_string(), amount.to_string(), data.to_string()],
        )
    }
}

struct MockListing {
    chain: MockChain,
    name: String,
}

#[async_trait]
impl Listing for MockListing {
    fn name(&self) -> &str {
        &self.name
    }

    async fn challenge(&self) -> Result<TransactionHandle, ChainError> {
        self.chain.submit("challenge", &[self.name.clone()])
    }

    async fn deposit(&self, amount: Amount) -> Result<TransactionHandle, ChainError> {
        self.chain
            .submit("deposit", &[self.name.clone(), amount.to_string()])
    }

    async fn withdraw(&self, amount: Amount) -> Result<TransactionHandle, ChainError> {
        self.chain
            .submit("withdraw", &[self.name.clone(), amount.to_string()])
    }

    async fn remove(&self) -> Result<TransactionHandle, ChainError> {
        self.chain.submit("remove", &[self.name.clone()])
    }

    async fn update_status(&self) -> Result<TransactionHandle, ChainError> {
        self.chain.submit("update_status", &[self.name.clone()])
    }
}

struct MockChallenge {
    chain: MockChain,
    id: u64,
}

#[async_trait]
impl Challenge for MockChallenge {
    async fn claim_reward(&self, salt: &str) -> Result<TransactionHandle, ChainError> {
        self.chain
            .submit("claim_reward", &[self.id.to_string(), salt.to_string()])
    }
}

struct MockVoting {
    chain: MockChain,
}

#[async_trait]
impl Voting for MockVoting {
    fn address(&self) -> Address {
        VOTING
    }

    async fn get_poll(&self, id: u64) -> Result<Arc<dyn Poll>, ChainError> {
        Ok(Arc::new(MockPoll {
            chain: self.chain.clone(),
            id,
        }))
    }

    async fn request_voting_rights(
        &self,
        amount: Amount,
    ) -> Result<TransactionHandle, ChainError> {
        self.chain
            .submit("request_voting_rights", &[amount.to_string()])
    }
}

struct MockPoll {
    chain: MockChain,
    id: u64,
}

#[async_trait]
impl Poll for MockPoll {
    async fn commit_vote(
        &self,
        secret_hash: &str,
        stake: Amount,
    ) -> Result<TransactionHandle, ChainError> {
        self.chain.submit(
            "commit_vote",
            &[self.id.to_string(), secret_hash.to_string(), stake.to_string()],
        )
    }

    async fn reveal_vote(&self, option: u64, salt: &str) -> Result<TransactionHandle, ChainError> {
        self.chain.submit(
            "reveal_vote",
            &[self.id.to_string(), option.to_string(), salt.to_string()],
        )
    }
}

struct MockParameterizer {
    chain: MockChain,
}

#[async_trait]
impl Parameterizer for MockParameterizer {
    fn address(&self) -> Address {
        PARAMETERIZER
    }

    async fn get(&self, name: &str) -> Result<Amount, ChainError> {
        if name != "pMinDeposit" {
            return Err(ChainError::NotFound {
                kind: "parameter",
                id: name.to_string(),
            });
        }
        Ok(self.chain.state.lock().unwrap().min_deposit)
    }

    async fn get_proposal(
        &self,
        contract_name: &str,
        proposal_id: &str,
    ) -> Result<Arc<dyn Proposal>, ChainError> {
        Ok(Arc::new(MockProposal {
            chain: self.chain.clone(),
            key: format!("{}/{}", contract_name, proposal_id),
        }))
    }

    async fn create_proposal(
        &self,
        name: &str,
        value: Amount,
    ) -> Result<TransactionHandle, ChainError> {
        self.chain
            .submit("create_proposal", &[name.to_string(), value.to_string()])
    }
}

struct MockProposal {
    chain: MockChain,
    key: String,
}

#[async_trait]
impl Proposal for MockProposal {
    async fn process(&self) -> Result<TransactionHandle, ChainError> {
        self.chain.submit("process", &[self.key.clone()])
    }

    async fn challenge(&self) -> Result<TransactionHandle, ChainError> {
        self.chain.submit("challenge_proposal", &[self.key.clone()])
    }
}
