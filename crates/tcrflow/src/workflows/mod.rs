//! Workflow builders, one per user intent.
//!
//! Every builder follows the same shape: parse the user's parameters,
//! look up the target entity, query current allowances, append an approval
//! step for each pool that needs a top-up, append the primary step, and
//! return the queue without running it. Building is a pure projection of
//! chain state; building twice against unchanged state yields the same
//! steps.

mod listing;
mod proposal;
mod voting;

use std::fmt;
use std::sync::Arc;

use tcrflow_core::{
    resolve, Account, Address, AllowancePool, Amount, ApprovedAmounts, FlowError, Ledger,
    Resolution, StepKind, Tcr, TransactionWatcher,
};
use tracing::debug;

use crate::config::{FlowConfig, Intent};
use crate::lease::PoolLeases;
use crate::queue::StepQueue;
use crate::steps::{BestEffort, ChainStep, Submission};
use crate::watcher::PollingWatcher;

/// Entry points for every supported intent.
pub struct Workflows {
    tcr: Arc<dyn Tcr>,
    watcher: Arc<dyn TransactionWatcher>,
    config: FlowConfig,
    leases: PoolLeases,
}

impl fmt::Debug for Workflows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflows")
            .field("config", &self.config)
            .finish()
    }
}

impl Workflows {
    /// Creates builders over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Configuration`] if `config` fails
    /// [`FlowConfig::validate`].
    pub fn new(
        tcr: Arc<dyn Tcr>,
        watcher: Arc<dyn TransactionWatcher>,
        config: FlowConfig,
    ) -> Result<Self, FlowError> {
        config.validate()?;
        Ok(Self {
            tcr,
            watcher,
            config,
            leases: PoolLeases::new(),
        })
    }

    /// Creates builders that watch transactions with a [`PollingWatcher`]
    /// configured from `config.watch`.
    ///
    /// # Errors
    ///
    /// Same as [`Workflows::new`].
    pub fn with_ledger(
        tcr: Arc<dyn Tcr>,
        ledger: Arc<dyn Ledger>,
        config: FlowConfig,
    ) -> Result<Self, FlowError> {
        let watcher = PollingWatcher::from_config(ledger, &config.watch);
        Self::new(tcr, Arc::new(watcher), config)
    }

    /// The configured network identifier.
    pub fn network(&self) -> u64 {
        self.config.network
    }

    /// The active configuration.
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Per-pool leases shared by everyone holding these builders.
    pub fn leases(&self) -> &PoolLeases {
        &self.leases
    }

    fn watcher(&self) -> Arc<dyn TransactionWatcher> {
        Arc::clone(&self.watcher)
    }

    async fn approved_amounts(&self) -> Result<ApprovedAmounts, FlowError> {
        self.tcr
            .approved_amounts()
            .await
            .map_err(FlowError::AllowanceQueryFailed)
    }

    /// Appends an approval for `pool` if `approved` does not cover `required`.
    fn push_top_up(
        &self,
        queue: &mut StepQueue,
        pool: AllowancePool,
        account: &Arc<dyn Account>,
        spender: Address,
        required: Amount,
        approved: Amount,
    ) {
        match resolve(required, approved) {
            Resolution::Sufficient => {
                debug!(%pool, %required, %approved, "Allowance sufficient");
            }
            Resolution::TopUp { deficit } => {
                debug!(%pool, %required, %approved, %deficit, "Allowance top-up needed");
                queue.add(ChainStep::approve(
                    pool,
                    Arc::clone(account),
                    spender,
                    deficit,
                    self.watcher(),
                ));
            }
        }
    }

    /// Appends the intent's primary step, wrapped if it is best-effort.
    fn push_primary(
        &self,
        queue: &mut StepQueue,
        intent: Intent,
        kind: StepKind,
        submission: Submission,
    ) {
        let step = ChainStep::new(kind, submission, self.watcher());
        if self.config.is_best_effort(intent) {
            queue.add(BestEffort::new(step));
        } else {
            queue.add(step);
        }
    }

    /// A queue holding only the primary step.
    fn single(&self, intent: Intent, kind: StepKind, submission: Submission) -> StepQueue {
        let mut queue = StepQueue::new();
        self.push_primary(&mut queue, intent, kind, submission);
        finish(intent, queue)
    }
}

fn finish(intent: Intent, queue: StepQueue) -> StepQueue {
    debug!(%intent, steps = queue.len(), labels = ?queue.labels(), "Workflow built");
    queue
}
