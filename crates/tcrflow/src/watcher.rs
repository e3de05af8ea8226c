//! Polling transaction watcher.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tcrflow_core::{
    FlowError, Ledger, Receipt, TransactionHandle, TransactionWatcher, TxHash, TxStatus,
};
use tokio::time::{interval, timeout};
use tracing::{debug, warn};

use crate::config::WatchConfig;

/// `interval` rejects a zero period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Watches transactions by polling a [`Ledger`].
///
/// Waits until the transaction is included and buried under the required
/// number of confirmations (the inclusion block counts as one). With a
/// deadline, gives up with [`FlowError::WatchTimeout`]; without one it
/// waits indefinitely.
pub struct PollingWatcher {
    ledger: Arc<dyn Ledger>,
    poll_interval: Duration,
    deadline: Option<Duration>,
    confirmations: u64,
}

impl fmt::Debug for PollingWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingWatcher")
            .field("poll_interval", &self.poll_interval)
            .field("deadline", &self.deadline)
            .field("confirmations", &self.confirmations)
            .finish()
    }
}

impl PollingWatcher {
    /// Creates a watcher with the default [`WatchConfig`].
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self::from_config(ledger, &WatchConfig::default())
    }

    /// Creates a watcher from configuration.
    pub fn from_config(ledger: Arc<dyn Ledger>, config: &WatchConfig) -> Self {
        Self {
            ledger,
            poll_interval: config.poll_interval().max(MIN_POLL_INTERVAL),
            deadline: config.deadline(),
            confirmations: config.confirmations.max(1),
        }
    }

    /// Sets the polling interval (at least one millisecond).
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Sets or clears the watch deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the required confirmation depth (at least one).
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    async fn poll_until_settled(&self, tx_hash: TxHash) -> Result<Receipt, FlowError> {
        let mut ticker = interval(self.poll_interval);

        loop {
            ticker.tick().await;

            let block_number = match self.ledger.transaction_status(tx_hash).await? {
                TxStatus::Pending => {
                    debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
                TxStatus::Failed(cause) => {
                    warn!(tx_hash = %tx_hash, cause = %cause, "Transaction failed");
                    return Err(FlowError::TransactionFailed { tx_hash, cause });
                }
                TxStatus::Mined { block_number } => block_number,
            };

            let confirmations = if self.confirmations == 1 {
                1
            } else {
                let head = self.ledger.block_number().await?;
                head.saturating_sub(block_number) + 1
            };

            if confirmations >= self.confirmations {
                debug!(tx_hash = %tx_hash, block_number, confirmations, "Transaction confirmed");
                return Ok(Receipt {
                    tx_hash,
                    block_number,
                    confirmations,
                });
            }

            debug!(
                tx_hash = %tx_hash,
                confirmations,
                required = self.confirmations,
                "Waiting for confirmations"
            );
        }
    }
}

#[async_trait]
impl TransactionWatcher for PollingWatcher {
    async fn watch(&self, handle: TransactionHandle) -> Result<Receipt, FlowError> {
        let tx_hash = handle.tx_hash();
        match self.deadline {
            None => self.poll_until_settled(tx_hash).await,
            Some(deadline) => match timeout(deadline, self.poll_until_settled(tx_hash)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(tx_hash = %tx_hash, waited = ?deadline, "Gave up watching transaction");
                    Err(FlowError::WatchTimeout {
                        tx_hash,
                        waited: deadline,
                    })
                }
            },
        }
    }
}
