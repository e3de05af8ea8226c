//! Concrete steps used by the workflow builders.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tcrflow_core::{
    Account, Address, AllowancePool, Amount, ChainError, Challenge, FlowError, Listing,
    Parameterizer, Poll, Proposal, Registry, Step, StepKind, StepMeta, StepOutput,
    TransactionHandle, TransactionWatcher, Voting,
};
use tracing::{debug, warn};

/// Builds the display metadata for a step kind.
///
/// [`StepKind::Custom`] only gets a generic label; build custom steps
/// with [`StepMeta::custom`] to give them a real one.
pub fn describe(kind: StepKind) -> StepMeta {
    let (label, content) = match &kind {
        StepKind::Approve { pool, amount } => (
            format!("Approve transfer of {} tokens", amount),
            format!("Allow the {} contract to transfer your tokens", pool),
        ),
        StepKind::RequestVotingRights { amount } => (
            format!("Request {} voting rights", amount),
            "Convert approved tokens into voting rights".to_string(),
        ),
        StepKind::ApplyListing => (
            "Apply listing".to_string(),
            "Submit the application together with its deposit".to_string(),
        ),
        StepKind::ChallengeListing => (
            "Submit challenge".to_string(),
            "Challenge the listing in the registry".to_string(),
        ),
        StepKind::CommitVote { stake } => (
            "Commit vote".to_string(),
            format!("Commit a sealed vote backed by {} tokens", stake),
        ),
        StepKind::RevealVote => (
            "Reveal vote".to_string(),
            "Reveal your committed vote".to_string(),
        ),
        StepKind::RefreshStatus => (
            "Refresh listing status".to_string(),
            "Resolve the listing's pending application or challenge".to_string(),
        ),
        StepKind::ProcessProposal => (
            "Process proposal".to_string(),
            "Apply or reject the parameter proposal".to_string(),
        ),
        StepKind::ClaimReward => (
            "Claim reward".to_string(),
            "Claim your voter reward for the challenge".to_string(),
        ),
        StepKind::ProposeParameter => (
            "Submit reparameterization".to_string(),
            "Propose a new parameter value".to_string(),
        ),
        StepKind::ChallengeProposal => (
            "Submit challenge".to_string(),
            "Challenge the parameter proposal".to_string(),
        ),
        StepKind::Deposit { amount } => (
            "Deposit tokens".to_string(),
            format!("Add {} tokens to the listing's stake", amount),
        ),
        StepKind::Withdraw { amount } => (
            "Withdraw tokens".to_string(),
            format!("Remove {} unlocked tokens from the listing's stake", amount),
        ),
        StepKind::ExitListing => (
            "Exit listing".to_string(),
            "Remove the listing from the registry".to_string(),
        ),
        StepKind::Custom => ("Custom step".to_string(), String::new()),
    };
    StepMeta::new(kind, label, content)
}

/// A single chain write.
pub(crate) enum Submission {
    Approve {
        account: Arc<dyn Account>,
        spender: Address,
        amount: Amount,
    },
    RequestVotingRights {
        voting: Arc<dyn Voting>,
        amount: Amount,
    },
    CreateListing {
        registry: Arc<dyn Registry>,
        listing_hash: String,
        amount: Amount,
        data: String,
    },
    ChallengeListing {
        listing: Arc<dyn Listing>,
    },
    CommitVote {
        poll: Arc<dyn Poll>,
        secret_hash: String,
        stake: Amount,
    },
    RevealVote {
        poll: Arc<dyn Poll>,
        option: u64,
        salt: String,
    },
    UpdateStatus {
        listing: Arc<dyn Listing>,
    },
    ProcessProposal {
        proposal: Arc<dyn Proposal>,
    },
    ClaimReward {
        challenge: Arc<dyn Challenge>,
        salt: String,
    },
    CreateProposal {
        parameterizer: Arc<dyn Parameterizer>,
        name: String,
        value: Amount,
    },
    ChallengeProposal {
        proposal: Arc<dyn Proposal>,
    },
    Deposit {
        listing: Arc<dyn Listing>,
        amount: Amount,
    },
    Withdraw {
        listing: Arc<dyn Listing>,
        amount: Amount,
    },
    Remove {
        listing: Arc<dyn Listing>,
    },
}

impl Submission {
    fn action(&self) -> &'static str {
        match self {
            Submission::Approve { .. } => "approve_tokens",
            Submission::RequestVotingRights { .. } => "request_voting_rights",
            Submission::CreateListing { .. } => "create_listing",
            Submission::ChallengeListing { .. } => "challenge_listing",
            Submission::CommitVote { .. } => "commit_vote",
            Submission::RevealVote { .. } => "reveal_vote",
            Submission::UpdateStatus { .. } => "update_status",
            Submission::ProcessProposal { .. } => "process_proposal",
            Submission::ClaimReward { .. } => "claim_reward",
            Submission::CreateProposal { .. } => "create_proposal",
            Submission::ChallengeProposal { .. } => "challenge_proposal",
            Submission::Deposit { .. } => "deposit",
            Submission::Withdraw { .. } => "withdraw",
            Submission::Remove { .. } => "remove",
        }
    }

    async fn submit(&self) -> Result<TransactionHandle, ChainError> {
        match self {
            Submission::Approve {
                account,
                spender,
                amount,
            } => account.approve_tokens(*spender, *amount).await,
            Submission::RequestVotingRights { voting, amount } => {
                voting.request_voting_rights(*amount).await
            }
            Submission::CreateListing {
                registry,
                listing_hash,
                amount,
                data,
            } => registry.create_listing(listing_hash, *amount, data).await,
            Submission::ChallengeListing { listing } => listing.challenge().await,
            Submission::CommitVote {
                poll,
                secret_hash,
                stake,
            } => poll.commit_vote(secret_hash, *stake).await,
            Submission::RevealVote { poll, option, salt } => poll.reveal_vote(*option, salt).await,
            Submission::UpdateStatus { listing } => listing.update_status().await,
            Submission::ProcessProposal { proposal } => proposal.process().await,
            Submission::ClaimReward { challenge, salt } => challenge.claim_reward(salt).await,
            Submission::CreateProposal {
                parameterizer,
                name,
                value,
            } => parameterizer.create_proposal(name, *value).await,
            Submission::ChallengeProposal { proposal } => proposal.challenge().await,
            Submission::Deposit { listing, amount } => listing.deposit(*amount).await,
            Submission::Withdraw { listing, amount } => listing.withdraw(*amount).await,
            Submission::Remove { listing } => listing.remove().await,
        }
    }
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

/// Submits one transaction and waits for it to settle.
pub(crate) struct ChainStep {
    meta: StepMeta,
    submission: Submission,
    watcher: Arc<dyn TransactionWatcher>,
}

impl ChainStep {
    pub(crate) fn new(
        kind: StepKind,
        submission: Submission,
        watcher: Arc<dyn TransactionWatcher>,
    ) -> Self {
        Self {
            meta: describe(kind),
            submission,
            watcher,
        }
    }

    /// Top-up of `pool` by `amount`, spent by `spender`.
    pub(crate) fn approve(
        pool: AllowancePool,
        account: Arc<dyn Account>,
        spender: Address,
        amount: Amount,
        watcher: Arc<dyn TransactionWatcher>,
    ) -> Self {
        Self::new(
            StepKind::Approve { pool, amount },
            Submission::Approve {
                account,
                spender,
                amount,
            },
            watcher,
        )
    }
}

impl fmt::Debug for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainStep")
            .field("meta", &self.meta)
            .field("submission", &self.submission)
            .finish()
    }
}

#[async_trait]
impl Step for ChainStep {
    async fn execute(&self) -> Result<StepOutput, FlowError> {
        let handle = self.submission.submit().await?;
        debug!(
            action = self.submission.action(),
            tx_hash = %handle,
            "Transaction submitted"
        );
        let receipt = self.watcher.watch(handle).await?;
        Ok(StepOutput::settled(receipt))
    }

    fn meta(&self) -> &StepMeta {
        &self.meta
    }
}

/// Logs the inner step's failure and settles as [`StepOutput::Skipped`].
///
/// Only applied to intents configured as best-effort.
#[derive(Debug)]
pub struct BestEffort<S> {
    inner: S,
}

impl<S: Step> BestEffort<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: Step> Step for BestEffort<S> {
    async fn execute(&self) -> Result<StepOutput, FlowError> {
        match self.inner.execute().await {
            Ok(output) => Ok(output),
            Err(e) => {
                warn!(
                    label = %self.inner.meta().label,
                    error = %e,
                    "Best-effort step failed, continuing"
                );
                Ok(StepOutput::Skipped {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn meta(&self) -> &StepMeta {
        self.inner.meta()
    }
}

/// A step backed by an async closure.
pub struct FnStep<F> {
    meta: StepMeta,
    action: F,
}

impl<F> FnStep<F> {
    /// Creates a step that runs `action`.
    pub fn new(meta: StepMeta, action: F) -> Self {
        Self { meta, action }
    }
}

impl<F> fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep").field("meta", &self.meta).finish()
    }
}

#[async_trait]
impl<F, Fut> Step for FnStep<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StepOutput, FlowError>> + Send + 'static,
{
    async fn execute(&self) -> Result<StepOutput, FlowError> {
        (self.action)().await
    }

    fn meta(&self) -> &StepMeta {
        &self.meta
    }
}
