use tcrflow_core::{AllowancePool, Amount, FlowError, StepKind};

use super::{finish, Workflows};
use crate::config::Intent;
use crate::queue::StepQueue;
use crate::steps::Submission;

/// Parameter holding the deposit required to propose or challenge.
const MIN_DEPOSIT_PARAM: &str = "pMinDeposit";

impl Workflows {
    /// Proposes `value` for parameter `name`, staking the minimum deposit.
    ///
    /// Queue: `[approve parameterizer deficit]?, submit reparameterization`.
    pub async fn propose_parameter(&self, name: &str, value: &str) -> Result<StepQueue, FlowError> {
        let value = Amount::from_decimal(value)?;
        let account = self.tcr.default_account().await?;
        let parameterizer = self.tcr.parameterizer().await?;
        let required = parameterizer.get(MIN_DEPOSIT_PARAM).await?;
        let approved = self.approved_amounts().await?;

        let mut queue = StepQueue::new();
        self.push_top_up(
            &mut queue,
            AllowancePool::Parameterizer,
            &account,
            parameterizer.address(),
            required,
            approved.parameterizer,
        );
        self.push_primary(
            &mut queue,
            Intent::ProposeParameter,
            StepKind::ProposeParameter,
            Submission::CreateProposal {
                parameterizer,
                name: name.to_string(),
                value,
            },
        );
        Ok(finish(Intent::ProposeParameter, queue))
    }

    /// Challenges a parameter proposal, staking the minimum deposit.
    ///
    /// Queue: `[approve parameterizer deficit]?, submit challenge`.
    pub async fn challenge_proposal(
        &self,
        contract_name: &str,
        proposal_id: &str,
    ) -> Result<StepQueue, FlowError> {
        let account = self.tcr.default_account().await?;
        let parameterizer = self.tcr.parameterizer().await?;
        let required = parameterizer.get(MIN_DEPOSIT_PARAM).await?;
        let proposal = parameterizer.get_proposal(contract_name, proposal_id).await?;
        let approved = self.approved_amounts().await?;

        let mut queue = StepQueue::new();
        self.push_top_up(
            &mut queue,
            AllowancePool::Parameterizer,
            &account,
            parameterizer.address(),
            required,
            approved.parameterizer,
        );
        self.push_primary(
            &mut queue,
            Intent::ChallengeProposal,
            StepKind::ChallengeProposal,
            Submission::ChallengeProposal { proposal },
        );
        Ok(finish(Intent::ChallengeProposal, queue))
    }

    /// Processes a proposal whose application or challenge period is over.
    pub async fn process_proposal(
        &self,
        contract_name: &str,
        proposal_id: &str,
    ) -> Result<StepQueue, FlowError> {
        let proposal = self
            .tcr
            .parameterizer()
            .await?
            .get_proposal(contract_name, proposal_id)
            .await?;
        Ok(self.single(
            Intent::ProcessProposal,
            StepKind::ProcessProposal,
            Submission::ProcessProposal { proposal },
        ))
    }
}
