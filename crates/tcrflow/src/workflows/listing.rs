use tcrflow_core::{AllowancePool, Amount, FlowError, StepKind};

use super::{finish, Workflows};
use crate::config::Intent;
use crate::queue::StepQueue;
use crate::steps::Submission;

impl Workflows {
    /// Applies a new listing with `amount` tokens staked.
    ///
    /// Queue: `[approve registry deficit]?, apply listing`.
    pub async fn apply_listing(
        &self,
        listing_hash: &str,
        data: &str,
        amount: &str,
    ) -> Result<StepQueue, FlowError> {
        let amount = Amount::from_decimal(amount)?;
        let account = self.tcr.default_account().await?;
        let registry = self.tcr.registry();
        let approved = self.approved_amounts().await?;

        let mut queue = StepQueue::new();
        self.push_top_up(
            &mut queue,
            AllowancePool::Registry,
            &account,
            registry.address(),
            amount,
            approved.registry,
        );
        self.push_primary(
            &mut queue,
            Intent::ApplyListing,
            StepKind::ApplyListing,
            Submission::CreateListing {
                registry,
                listing_hash: listing_hash.to_string(),
                amount,
                data: data.to_string(),
            },
        );
        Ok(finish(Intent::ApplyListing, queue))
    }

    /// Challenges a listing, backing the challenge with `amount` tokens.
    ///
    /// Queue: `[approve registry deficit]?, submit challenge`.
    pub async fn challenge_listing(&self, name: &str, amount: &str) -> Result<StepQueue, FlowError> {
        let amount = Amount::from_decimal(amount)?;
        let registry = self.tcr.registry();
        let account = self.tcr.default_account().await?;
        let listing = registry.get_listing(name).await?;
        let approved = self.approved_amounts().await?;

        let mut queue = StepQueue::new();
        self.push_top_up(
            &mut queue,
            AllowancePool::Registry,
            &account,
            registry.address(),
            amount,
            approved.registry,
        );
        self.push_primary(
            &mut queue,
            Intent::ChallengeListing,
            StepKind::ChallengeListing,
            Submission::ChallengeListing { listing },
        );
        Ok(finish(Intent::ChallengeListing, queue))
    }

    /// Adds `amount` tokens to a listing's stake.
    ///
    /// Queue: `[approve registry deficit]?, deposit`.
    pub async fn deposit(&self, name: &str, amount: &str) -> Result<StepQueue, FlowError> {
        let amount = Amount::from_decimal(amount)?;
        let account = self.tcr.default_account().await?;
        let approved = self.approved_amounts().await?;
        let registry = self.tcr.registry();
        let listing = registry.get_listing(name).await?;

        let mut queue = StepQueue::new();
        self.push_top_up(
            &mut queue,
            AllowancePool::Registry,
            &account,
            registry.address(),
            amount,
            approved.registry,
        );
        self.push_primary(
            &mut queue,
            Intent::Deposit,
            StepKind::Deposit { amount },
            Submission::Deposit { listing, amount },
        );
        Ok(finish(Intent::Deposit, queue))
    }

    /// Withdraws `amount` unlocked tokens from a listing. Needs no allowance.
    pub async fn withdraw(&self, name: &str, amount: &str) -> Result<StepQueue, FlowError> {
        let amount = Amount::from_decimal(amount)?;
        let listing = self.tcr.registry().get_listing(name).await?;
        Ok(self.single(
            Intent::Withdraw,
            StepKind::Withdraw { amount },
            Submission::Withdraw { listing, amount },
        ))
    }

    /// Removes a listing from the registry.
    pub async fn exit_listing(&self, name: &str) -> Result<StepQueue, FlowError> {
        let listing = self.tcr.registry().get_listing(name).await?;
        Ok(self.single(
            Intent::ExitListing,
            StepKind::ExitListing,
            Submission::Remove { listing },
        ))
    }

    /// Resolves a listing's pending application or challenge.
    pub async fn refresh_listing_status(&self, name: &str) -> Result<StepQueue, FlowError> {
        let listing = self.tcr.registry().get_listing(name).await?;
        Ok(self.single(
            Intent::RefreshListingStatus,
            StepKind::RefreshStatus,
            Submission::UpdateStatus { listing },
        ))
    }

    /// Claims the voter reward of a challenge.
    pub async fn claim_reward(&self, challenge_id: u64, salt: &str) -> Result<StepQueue, FlowError> {
        let challenge = self.tcr.registry().get_challenge(challenge_id).await?;
        Ok(self.single(
            Intent::ClaimReward,
            StepKind::ClaimReward,
            Submission::ClaimReward {
                challenge,
                salt: salt.to_string(),
            },
        ))
    }
}
