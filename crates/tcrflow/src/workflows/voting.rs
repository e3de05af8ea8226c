use std::sync::Arc;

use tcrflow_core::{AllowancePool, AllowanceState, Amount, FlowError, StepKind};
use tracing::debug;

use super::{finish, Workflows};
use crate::config::Intent;
use crate::queue::StepQueue;
use crate::steps::{ChainStep, Submission};

impl Workflows {
    /// Commits a sealed vote backed by `stake` tokens.
    ///
    /// If the account's voting rights fall short of `stake`, the shortfall
    /// is requested first, preceded by a voting-pool approval when the
    /// approved allowance does not cover that shortfall.
    ///
    /// Queue: `[approve voting deficit]?, [request shortfall rights]?, commit vote`.
    pub async fn commit_vote(
        &self,
        poll_id: u64,
        secret_hash: &str,
        stake: &str,
    ) -> Result<StepQueue, FlowError> {
        let stake = Amount::from_decimal(stake)?;
        let account = self.tcr.default_account().await?;
        let voting = self.tcr.voting().await?;
        let poll = voting.get_poll(poll_id).await?;
        let approved = self.approved_amounts().await?;
        let rights = self
            .tcr
            .voting_rights()
            .await
            .map_err(FlowError::AllowanceQueryFailed)?;

        let mut queue = StepQueue::new();
        if let Some(shortfall) = AllowanceState::new(stake, rights).deficit() {
            debug!(%stake, %rights, %shortfall, "Voting rights short of stake");
            self.push_top_up(
                &mut queue,
                AllowancePool::Voting,
                &account,
                voting.address(),
                shortfall,
                approved.voting,
            );
            queue.add(ChainStep::new(
                StepKind::RequestVotingRights { amount: shortfall },
                Submission::RequestVotingRights {
                    voting: Arc::clone(&voting),
                    amount: shortfall,
                },
                self.watcher(),
            ));
        }
        self.push_primary(
            &mut queue,
            Intent::CommitVote,
            StepKind::CommitVote { stake },
            Submission::CommitVote {
                poll,
                secret_hash: secret_hash.to_string(),
                stake,
            },
        );
        Ok(finish(Intent::CommitVote, queue))
    }

    /// Reveals a committed vote. Needs no allowance.
    pub async fn reveal_vote(
        &self,
        poll_id: u64,
        option: u64,
        salt: &str,
    ) -> Result<StepQueue, FlowError> {
        let poll = self.tcr.voting().await?.get_poll(poll_id).await?;
        Ok(self.single(
            Intent::RevealVote,
            StepKind::RevealVote,
            Submission::RevealVote {
                poll,
                option,
                salt: salt.to_string(),
            },
        ))
    }
}
