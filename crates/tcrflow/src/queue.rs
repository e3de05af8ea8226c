//! Sequential step queue.

use std::fmt;
use std::future::Future;

use tcrflow_core::{FlowError, Receipt, Step, StepMeta, StepOutput};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::lease::PoolLease;
use crate::steps::FnStep;

/// Execution progress published by a running [`StepQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The queue has not started.
    Pending,
    /// The step at `index` is executing.
    Running {
        /// Zero-based step position.
        index: usize,
        /// The step's label.
        label: String,
    },
    /// The step at `index` settled successfully.
    Settled {
        /// Zero-based step position.
        index: usize,
    },
    /// The step at `index` failed; the queue stopped.
    Failed {
        /// Zero-based step position.
        index: usize,
    },
    /// Every step settled.
    Finished,
}

/// A settled step and its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledStep {
    /// The step's metadata.
    pub meta: StepMeta,
    /// What the step produced.
    pub output: StepOutput,
}

/// Outcome of a successful [`StepQueue::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    steps: Vec<SettledStep>,
}

impl RunReport {
    /// Settled steps in execution order.
    pub fn steps(&self) -> &[SettledStep] {
        &self.steps
    }

    /// Receipts of every confirmed transaction, in execution order.
    pub fn receipts(&self) -> impl Iterator<Item = &Receipt> {
        self.steps.iter().filter_map(|s| s.output.receipt())
    }

    /// Number of settled steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the queue was empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// An ordered, append-only list of steps with a single sequential runner.
///
/// Insertion order is execution order. Step `i + 1` starts only after
/// step `i` settled successfully; the first failure stops the queue.
/// Nothing is retried.
///
/// # Examples
///
/// ```
/// use tcrflow::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), FlowError> {
/// let mut queue = StepQueue::new();
/// queue
///     .add_fn(StepMeta::custom("First", ""), || async { Ok(StepOutput::done()) })
///     .add_fn(StepMeta::custom("Second", ""), || async { Ok(StepOutput::done()) });
///
/// assert_eq!(queue.labels(), vec!["First", "Second"]);
/// let report = queue.run().await?;
/// assert_eq!(report.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct StepQueue {
    steps: Vec<Box<dyn Step>>,
    progress: watch::Sender<Progress>,
    leases: Vec<PoolLease>,
}

impl fmt::Debug for StepQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepQueue")
            .field("steps", &self.labels())
            .field("leases", &self.leases)
            .finish()
    }
}

impl Default for StepQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl StepQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (progress, _) = watch::channel(Progress::Pending);
        Self {
            steps: Vec::new(),
            progress,
            leases: Vec::new(),
        }
    }

    /// Appends a step.
    pub fn add<S: Step + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Appends a step backed by an async closure.
    pub fn add_fn<F, Fut>(&mut self, meta: StepMeta, action: F) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StepOutput, FlowError>> + Send + 'static,
    {
        self.add(FnStep::new(meta, action))
    }

    /// Keeps `lease` until the queue is dropped.
    pub fn hold(&mut self, lease: PoolLease) -> &mut Self {
        self.leases.push(lease);
        self
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no steps were added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns step metadata in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &StepMeta> {
        self.steps.iter().map(|s| s.meta())
    }

    /// Returns step labels in execution order.
    pub fn labels(&self) -> Vec<&str> {
        self.steps().map(|m| m.label.as_str()).collect()
    }

    /// Subscribes to progress updates.
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Runs every step in order.
    ///
    /// Dropping the returned future stops the queue between or during
    /// steps; transactions already submitted stay submitted.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::StepFailed`] wrapping the first step error,
    /// annotated with that step's index and label.
    pub async fn run(self) -> Result<RunReport, FlowError> {
        let total = self.steps.len();
        let mut settled = Vec::with_capacity(total);

        for (index, step) in self.steps.iter().enumerate() {
            let meta = step.meta();
            info!(index, total, label = %meta.label, "Starting step");
            self.progress.send_replace(Progress::Running {
                index,
                label: meta.label.clone(),
            });

            match step.execute().await {
                Ok(output) => {
                    info!(index, label = %meta.label, "Step settled");
                    self.progress.send_replace(Progress::Settled { index });
                    settled.push(SettledStep {
                        meta: meta.clone(),
                        output,
                    });
                    // Let subscribers see `Settled` before the next `Running`.
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    warn!(index, label = %meta.label, error = %e, "Step failed, stopping queue");
                    self.progress.send_replace(Progress::Failed { index });
                    return Err(FlowError::StepFailed {
                        index,
                        label: meta.label.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        self.progress.send_replace(Progress::Finished);
        Ok(RunReport { steps: settled })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tcrflow_core::{ChainError, FailureCause, TxHash};

    fn recorder(
        log: &Arc<Mutex<Vec<String>>>,
        name: &'static str,
        delay_ms: u64,
    ) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Result<StepOutput, FlowError>> + Send>>
           + Send
           + Sync
           + 'static {
        let log = Arc::clone(log);
        move || {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push(format!("start:{}", name));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                log.lock().unwrap().push(format!("end:{}", name));
                Ok(StepOutput::done())
            })
        }
    }

    #[tokio::test]
    async fn test_steps_run_in_order_without_overlap() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = StepQueue::new();
        // Earlier steps are slower; a concurrent runner would interleave.
        queue
            .add_fn(StepMeta::custom("a", ""), recorder(&log, "a", 30))
            .add_fn(StepMeta::custom("b", ""), recorder(&log, "b", 10))
            .add_fn(StepMeta::custom("c", ""), recorder(&log, "c", 0));

        let report = queue.run().await.unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start:a", "end:a", "start:b", "end:b", "start:c", "end:c"]
        );
    }

    #[tokio::test]
    async fn test_failure_stops_queue() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = StepQueue::new();
        queue
            .add_fn(StepMeta::custom("first", ""), recorder(&log, "first", 0))
            .add_fn(StepMeta::custom("second", ""), || async {
                Err(FlowError::TransactionFailed {
                    tx_hash: TxHash::ZERO,
                    cause: FailureCause::Reverted("nope".to_string()),
                })
            })
            .add_fn(StepMeta::custom("third", ""), recorder(&log, "third", 0));

        let err = queue.run().await.unwrap_err();
        match &err {
            FlowError::StepFailed { index, label, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(label, "second");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            err.root_cause(),
            FlowError::TransactionFailed { .. }
        ));
        assert_eq!(*log.lock().unwrap(), vec!["start:first", "end:first"]);
    }

    #[tokio::test]
    async fn test_first_step_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = StepQueue::new();
        queue
            .add_fn(StepMeta::custom("approve", ""), || async {
                Err(FlowError::Chain(ChainError::Rejected("user denied".to_string())))
            })
            .add_fn(StepMeta::custom("apply", ""), recorder(&log, "apply", 0));

        let err = queue.run().await.unwrap_err();
        assert_eq!(err.step_index(), Some(0));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let queue = StepQueue::new();
        assert!(queue.is_empty());
        let report = queue.run().await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_progress_updates() {
        let mut queue = StepQueue::new();
        queue.add_fn(StepMeta::custom("only", ""), || async { Ok(StepOutput::done()) });
        let rx = queue.progress();
        assert_eq!(*rx.borrow(), Progress::Pending);

        queue.run().await.unwrap();
        assert_eq!(*rx.borrow(), Progress::Finished);
    }

    #[tokio::test]
    async fn test_progress_reports_failure() {
        let mut queue = StepQueue::new();
        queue
            .add_fn(StepMeta::custom("ok", ""), || async { Ok(StepOutput::done()) })
            .add_fn(StepMeta::custom("bad", ""), || async {
                Err(FlowError::Configuration("broken".to_string()))
            });
        let rx = queue.progress();
        let _ = queue.run().await;
        assert_eq!(*rx.borrow(), Progress::Failed { index: 1 });
    }

    #[tokio::test]
    async fn test_receipts_in_order() {
        let mut queue = StepQueue::new();
        for block in [10u64, 11] {
            queue.add_fn(StepMeta::custom("tx", ""), move || async move {
                Ok(StepOutput::settled(Receipt {
                    tx_hash: TxHash::ZERO,
                    block_number: block,
                    confirmations: 1,
                }))
            });
        }
        queue.add_fn(StepMeta::custom("noop", ""), || async { Ok(StepOutput::done()) });

        let report = queue.run().await.unwrap();
        let blocks: Vec<u64> = report.receipts().map(|r| r.block_number).collect();
        assert_eq!(blocks, vec![10, 11]);
        assert_eq!(report.steps().len(), 3);
    }
}
